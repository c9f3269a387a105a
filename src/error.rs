use thiserror::Error;

use crate::mask::Shape;
use crate::subset::{SubsetId, SubsetKind};

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, SubsetError>;

/// Everything that can go wrong while building, combining or exporting subsets.
#[derive(Debug, Error)]
pub enum SubsetError {
    /// The dataset lacks a collaborator the subset kind needs (e.g. a tree).
    #[error("dataset is missing required structure: {0}")]
    MissingStructure(&'static str),

    /// The operation was given a dataset that is not the subset's own.
    #[error("{kind} subsets cannot cross data sets")]
    DataIncompatible { kind: SubsetKind },

    /// The requested operation does not apply to this pairing of kinds.
    #[error("incompatible subset kinds: {left} vs {right}")]
    TypeIncompatible { left: SubsetKind, right: SubsetKind },

    /// A mask (or index map) does not match the dataset shape.
    #[error("mask has wrong shape: expected {expected}, got {got}")]
    ShapeMismatch { expected: Shape, got: Shape },

    #[error("format not supported: {0}")]
    UnsupportedFormat(String),

    /// Re-registration after `unregister()` is not supported.
    #[error("subset {0} has been unregistered")]
    Unregistered(SubsetId),

    #[error("malformed mask file: {0}")]
    MalformedMask(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}
