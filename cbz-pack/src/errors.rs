use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("cbz error: {0}")]
    Cbz(#[from] cbz::Error),

    #[error("invalid output path {0}: {1}")]
    InvalidOutputPath(String, &'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
