use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing the spell-analysis core.
///
/// Analysis itself never fails: blank text, unknown words and stale
/// replacements all resolve to empty or unchanged results. Only getting a
/// dictionary into memory can go wrong.
#[derive(Debug, Error)]
pub enum Error {
    #[error("dictionary not found: {}", .0.display())]
    DictionaryNotFound(PathBuf),

    #[error("failed to read dictionary {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dictionary data: {0}")]
    Fst(#[from] fst::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
