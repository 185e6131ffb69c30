use thiserror::Error;

use crate::oracle::OracleFault;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid pkcs7 padding")]
    InvalidPadding,

    #[error("could not find plaintext byte {position}{}", fmt_block(.block))]
    ByteNotFound {
        block: Option<usize>,
        position: usize,
    },

    #[error("ciphertext is not accepted by the oracle")]
    InvalidCiphertext,

    #[error("unable to find plaintext size")]
    SizeNotFound,

    #[error("length {len} is not a multiple of block size {block_size} of at least two blocks")]
    InvalidLength { len: usize, block_size: usize },

    #[error("block size must be between 1 and 255, got {0}")]
    InvalidBlockSize(usize),

    #[error("buffers are not of equal length ({left} != {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("oracle failed")]
    Oracle(#[from] OracleFault),
}

fn fmt_block(block: &Option<usize>) -> String {
    match block {
        Some(idx) => format!(" for block {idx}"),
        None => String::new(),
    }
}

impl Error {
    /// Attach the index of the ciphertext block being attacked.
    pub(crate) fn in_block(self, idx: usize) -> Self {
        match self {
            Error::ByteNotFound { position, .. } => Error::ByteNotFound {
                block: Some(idx),
                position,
            },
            other => other,
        }
    }
}
