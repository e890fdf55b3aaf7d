//! Error types for facility-geo

use thiserror::Error;

/// Main error type for facility-geo operations
///
/// Geometry decoding and geocoding do not use this type: they return
/// [`crate::geometry::DecodeFailure`] and [`crate::geocode::GeocodeResult`]
/// so that callers on the rendering path always get a value to branch on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] crate::geometry::DecodeFailure),

    #[error("Picker error: {0}")]
    Picker(String),
}

/// Result type alias for facility-geo operations
pub type Result<T> = std::result::Result<T, Error>;
