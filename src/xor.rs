// XOR helpers and bit-flip enumeration.
use crate::{Error, Result};

pub fn xor_bytes(buf_a: &[u8], buf_b: &[u8]) -> Result<Vec<u8>> {
    if buf_a.len() != buf_b.len() {
        return Err(Error::LengthMismatch {
            left: buf_a.len(),
            right: buf_b.len(),
        });
    }
    Ok(buf_a.iter().zip(buf_b.iter()).map(|(a, b)| a ^ b).collect())
}

/// XOR `message` with `key`, repeating the key as often as needed.
pub fn repeating_xor(message: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return message.to_vec();
    }
    message
        .iter()
        .zip(key.iter().cycle())
        .map(|(m, k)| m ^ k)
        .collect()
}

pub fn bit_flips(bytes: &[u8]) -> BitFlips<'_> {
    BitFlips { bytes, bit_pos: 0 }
}

/// Iterator over copies of a byte string, each with a single bit flipped.
///
/// Bits are visited byte by byte, most significant bit first.
#[derive(Clone, Debug)]
pub struct BitFlips<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl Iterator for BitFlips<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let byte_idx = self.bit_pos / 8;
        if byte_idx >= self.bytes.len() {
            return None;
        }
        let bit_offset = self.bit_pos % 8;
        self.bit_pos += 1;

        let mut flipped = self.bytes.to_vec();
        flipped[byte_idx] ^= 0b10000000 >> bit_offset;
        Some(flipped)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.bytes.len() * 8).saturating_sub(self.bit_pos);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitFlips<'_> {}
