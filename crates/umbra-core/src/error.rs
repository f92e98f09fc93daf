//! Errors raised while building registries or loading configuration.
//!
//! The simulation itself never fails: out-of-range input is a no-op.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown terrain tag '{0}'")]
    UnknownTerrainTag(String),

    #[error("unknown monster race tag '{0}'")]
    UnknownRaceTag(String),

    #[error("duplicate tag '{0}'")]
    DuplicateTag(String),

    #[error("terrain catalog is empty")]
    EmptyTerrainCatalog,

    #[error("trap catalog is empty")]
    EmptyTrapCatalog,

    #[error("no dungeon definitions")]
    NoDungeons,
}

pub type EngineResult<T> = Result<T, EngineError>;
