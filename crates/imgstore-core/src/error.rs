//! Error types for `imgstore`.
//!
//! This module provides a unified error type for all store operations.

use thiserror::Error;

/// Result type alias for `imgstore` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `imgstore` operations.
///
/// Error codes follow the pattern `IMGST-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// File open, seek, read, write, rename, or remove failed; or a short read/write (IMGST-001).
    #[error("[IMGST-001] I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Allocation of a buffer or the metadata array failed (IMGST-002).
    #[error("[IMGST-002] out of memory: {0}")]
    OutOfMemory(String),

    /// Front-end: too few positional arguments were supplied (IMGST-003).
    #[error("[IMGST-003] not enough arguments")]
    NotEnoughArguments,

    /// Store path is empty or exceeds the store-name limit (IMGST-004).
    #[error("[IMGST-004] invalid filename")]
    InvalidFilename,

    /// Front-end: unrecognized subcommand (IMGST-005).
    #[error("[IMGST-005] invalid command '{0}'")]
    InvalidCommand(String),

    /// Null where non-null required; out-of-range numeric; unknown option (IMGST-006).
    #[error("[IMGST-006] invalid argument: {0}")]
    InvalidArgument(String),

    /// `max_files` is 0 or exceeds 100,000 at create time (IMGST-007).
    #[error("[IMGST-007] max_files {0} out of range (must be 1..=100000)")]
    MaxFiles(u32),

    /// Thumb/small resolution cap exceeded at create time, or an unknown resolution token (IMGST-008).
    #[error("[IMGST-008] invalid resolution: {0}")]
    Resolutions(String),

    /// `img_id` is empty or exceeds 127 bytes (IMGST-009).
    #[error("[IMGST-009] invalid image id '{0}'")]
    InvalidImgId(String),

    /// Insert attempted with `num_valid == max_files` (IMGST-010).
    #[error("[IMGST-010] store is full (max_files = {0})")]
    FullImgStore(u32),

    /// `find_by_id` exhausted the valid set without a match (IMGST-011).
    #[error("[IMGST-011] image '{0}' not found")]
    NotFound(String),

    /// Insert attempted with an id already present among valid slots (IMGST-012).
    #[error("[IMGST-012] image id '{0}' already exists")]
    DuplicateId(String),

    /// The image codec failed to load, resize, encode, or probe an image (IMGST-013).
    #[error("[IMGST-013] image codec error: {0}")]
    ImgLib(String),
}

impl Error {
    /// Returns the stable error code (e.g., "IMGST-011").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IMGST-001",
            Self::OutOfMemory(_) => "IMGST-002",
            Self::NotEnoughArguments => "IMGST-003",
            Self::InvalidFilename => "IMGST-004",
            Self::InvalidCommand(_) => "IMGST-005",
            Self::InvalidArgument(_) => "IMGST-006",
            Self::MaxFiles(_) => "IMGST-007",
            Self::Resolutions(_) => "IMGST-008",
            Self::InvalidImgId(_) => "IMGST-009",
            Self::FullImgStore(_) => "IMGST-010",
            Self::NotFound(_) => "IMGST-011",
            Self::DuplicateId(_) => "IMGST-012",
            Self::ImgLib(_) => "IMGST-013",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_matches_variant() {
        assert_eq!(Error::NotFound("a".into()).code(), "IMGST-011");
        assert_eq!(Error::DuplicateId("a".into()).code(), "IMGST-012");
        assert_eq!(Error::FullImgStore(3).code(), "IMGST-010");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: Error = io_err.into();
        assert_eq!(err.code(), "IMGST-001");
    }
}
