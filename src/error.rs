use std::{io, path::PathBuf};

use _model::{LocationError, StoreError};
use thiserror::Error;

/// The payload as a whole couldn't be read. The current snapshot is kept.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("payload is not a valid store list: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single store entry was rejected. Never fatal: the entry is skipped.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("expected {{\"lat\": string, \"lon\": string}}: {0}")]
    Shape(serde_json::Error),
    #[error("latitude {0:?} is not a number")]
    Latitude(String),
    #[error("longitude {0:?} is not a number")]
    Longitude(String),
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("failed to read response body: {0}")]
    Body(#[from] io::Error),
    #[error("failed to read {}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },
    #[error("response body is empty")]
    EmptyBody,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Http(#[from] Box<ureq::Error>),
    #[error("failed to read response body: {0}")]
    Body(#[from] io::Error),
    #[error("no address found: {0}")]
    NotFound(String),
}
