use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why the tile catalog could not be produced.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unable to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed catalog {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("catalog loader stopped before delivering a result")]
    Interrupted,
}
