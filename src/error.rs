use thiserror::Error;

use crate::models::records::ModelType;

/// Errors that can occur while decoding a PHY file.
///
/// Every variant aborts the whole decode. Nothing is recovered locally and no
/// partial solid list is ever handed back.
#[derive(Debug, Error)]
pub enum PhyError {
    #[error(
        "{what} at 0x{offset:X} extends beyond buffer (need 0x{needed:X}, have 0x{available:X})"
    )]
    OutOfBoundsAccess {
        what: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("checksum mismatch: expected {expected}, file has {actual}")]
    InvalidChecksum { expected: i64, actual: i64 },
    #[error("unsupported surface model type: {0}")]
    InvalidBody(ModelType),
    #[error("{0} decoding is not implemented")]
    NotImplemented(&'static str),
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("ledge tree visits more than {limit} nodes")]
    LedgeTreeTooLarge { limit: usize },
    #[error("text section parse error at byte {offset}: {detail}")]
    TextSection { offset: usize, detail: String },
}

pub type PhyResult<T> = Result<T, PhyError>;
