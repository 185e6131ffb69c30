// PKCS#7 padding, and padding with an arbitrary fill byte.
use crate::{Error, Result};

/// Pad `bytes` to a multiple of `block_size` with copies of `fill`. Between 1
/// and `block_size` bytes are always appended.
///
/// # Panics
///
/// Panics if `block_size` is zero.
pub fn pad(bytes: &[u8], block_size: usize, fill: u8) -> Vec<u8> {
    let n_pad = block_size - (bytes.len() % block_size);
    let mut out = Vec::with_capacity(bytes.len() + n_pad);
    out.extend_from_slice(bytes);
    out.resize(bytes.len() + n_pad, fill);
    out
}

/// Apply PKCS#7 padding. A full block of padding is added to data that is
/// already a multiple of `block_size`.
///
/// # Panics
///
/// Panics if `block_size` is zero.
pub fn pkcs7_pad(bytes: &[u8], block_size: u8) -> Vec<u8> {
    let n_pad = block_size - (bytes.len() % block_size as usize) as u8;
    pad(bytes, block_size as usize, n_pad)
}

pub fn pkcs7_unpad(bytes: &[u8]) -> Result<Vec<u8>> {
    let n_pad = is_pkcs7_padded(bytes).ok_or(Error::InvalidPadding)?;
    Ok(bytes[..bytes.len() - n_pad as usize].to_vec())
}

pub fn pkcs7_unpad_in_place(bytes: &mut Vec<u8>) -> Result<()> {
    let n_pad = is_pkcs7_padded(bytes).ok_or(Error::InvalidPadding)?;
    bytes.truncate(bytes.len() - n_pad as usize);
    Ok(())
}

/// Return the number of padding bytes if `bytes` ends in valid PKCS#7
/// padding.
pub fn is_pkcs7_padded(bytes: &[u8]) -> Option<u8> {
    let n_pad = *bytes.last()?;
    if n_pad == 0 || n_pad as usize > bytes.len() {
        return None;
    }
    let padded = &bytes[(bytes.len() - n_pad as usize)..];
    if padded.iter().all(|el| *el == n_pad) {
        return Some(n_pad);
    }
    None
}
