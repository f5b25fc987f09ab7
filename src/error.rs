use thiserror::Error;

#[derive(Debug, Error)]
pub enum HangaError {
    #[error("Couldn't convert path to UTF-8.\n{0}")]
    PathFormat(#[from] camino::FromPathBufError),

    #[error("Couldn't read the current directory.\n{0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Failed to build the worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Errors raised while a filter runs on a worker thread.
///
/// These never reach the owner context, the worker logs them and reports the
/// task as aborted.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The source raster couldn't be opened.
    #[error("Couldn't open source image.\n{0}")]
    Open(#[from] std::io::Error),

    /// The source raster couldn't be decoded.
    #[error("Couldn't decode source image.\n{0}")]
    Decode(#[source] image::ImageError),

    /// The destination directory couldn't be created.
    #[error("Couldn't prepare destination directory.\n{0}")]
    Destination(#[source] std::io::Error),

    /// The destination raster couldn't be written.
    #[error("Couldn't encode destination image.\n{0}")]
    Encode(#[source] image::ImageError),

    #[error("Filter panicked: {0}")]
    Panicked(String),
}
