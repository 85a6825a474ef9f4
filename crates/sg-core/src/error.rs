//! Engine error taxonomy.
//!
//! Registry, clipboard, and config operations return `Result<_, EngineError>`.
//! Outcomes that report success without mutating (a restored element that
//! already exists, a move on a locked element) are `Ok` values, not errors.
//! Out-of-bounds geometry is never an error: it is clamped.

use crate::model::Variant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("slide {0} not found")]
    SlideNotFound(usize),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("nothing is selected")]
    NothingSelected,

    #[error("clipboard is empty")]
    ClipboardEmpty,

    #[error("{operation} is not supported for {variant} elements")]
    Unsupported {
        operation: &'static str,
        variant: Variant,
    },

    #[error("{payload} content cannot be applied to a {variant} element")]
    PayloadMismatch { variant: Variant, payload: Variant },

    #[error("unknown element type: {0}")]
    UnknownVariant(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("clipboard encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("clipboard decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Coarse classification, mirrored to hosts as an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unsupported,
    Invalid,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::Unsupported => "Unsupported",
            Self::Invalid => "Invalid",
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SlideNotFound(_)
            | Self::ElementNotFound(_)
            | Self::NothingSelected
            | Self::ClipboardEmpty => ErrorKind::NotFound,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::PayloadMismatch { .. }
            | Self::UnknownVariant(_)
            | Self::InvalidConfig(_)
            | Self::Json(_)
            | Self::Encode(_)
            | Self::Decode(_) => ErrorKind::Invalid,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
