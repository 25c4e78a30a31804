//! Crate-wide error type.

use thiserror::Error;

/// Boxed source error coming out of a port implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the pipeline, controller, and frame loop.
///
/// Port failures are never retried; they are wrapped here and handed to
/// the caller, which decides whether to abort the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("detector failed")]
    Detector(#[source] BoxError),
    #[error("feature extractor failed")]
    Extractor(#[source] BoxError),
    #[error("tracker failed")]
    Tracker(#[source] BoxError),
    #[error("trolley hardware failed")]
    Hardware(#[source] BoxError),
    #[error("video stream failed")]
    Stream(#[source] BoxError),
    #[error("inference worker is gone")]
    WorkerGone,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn detector(err: impl Into<BoxError>) -> Self {
        Error::Detector(err.into())
    }

    pub(crate) fn extractor(err: impl Into<BoxError>) -> Self {
        Error::Extractor(err.into())
    }

    pub(crate) fn tracker(err: impl Into<BoxError>) -> Self {
        Error::Tracker(err.into())
    }

    pub(crate) fn hardware(err: impl Into<BoxError>) -> Self {
        Error::Hardware(err.into())
    }

    pub(crate) fn stream(err: impl Into<BoxError>) -> Self {
        Error::Stream(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
