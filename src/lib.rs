//! Padding oracle attacks on CBC mode.
//!
//! Given only an oracle that reports whether a ciphertext decrypts to validly
//! PKCS#7 padded data, [`PaddingOracleAttack`] recovers the plaintext, or just
//! its length, without the key.
//!
//! ```
//! use padoracle::PaddingOracleAttack;
//!
//! // A toy "cipher", E(x) = x ^ 1, with a four byte block.
//! let oracle = |ciphertext: &[u8]| {
//!     let plaintext: Vec<u8> = ciphertext
//!         .chunks(4)
//!         .collect::<Vec<_>>()
//!         .windows(2)
//!         .flat_map(|pair| pair[1].iter().zip(pair[0]).map(|(c, iv)| c ^ 1 ^ iv).collect::<Vec<_>>())
//!         .collect();
//!     padoracle::is_pkcs7_padded(&plaintext).is_some_and(|n| n <= 4)
//! };
//! let mut attack = PaddingOracleAttack::new(oracle).with_block_size(4)?;
//!
//! let plaintext = attack.decrypt(&[0, 0, 0, 0, 0x40, 0x43, 0x03, 0x03])?;
//!
//! assert_eq!(plaintext, b"AB");
//! # Ok::<(), padoracle::Error>(())
//! ```
mod attack;
mod blocks;
mod command;
mod error;
mod oracle;
mod parallel;
mod pkcs7;
mod xor;

#[cfg(test)]
mod testing;

pub use attack::{PaddingOracleAttack, Verification, DEFAULT_BLOCK_SIZE};
pub use blocks::split;
pub use command::CommandOracle;
pub use error::{Error, Result};
pub use oracle::{Fallible, Oracle, OracleFault, SharedOracle};
pub use pkcs7::{is_pkcs7_padded, pad, pkcs7_pad, pkcs7_unpad, pkcs7_unpad_in_place};
pub use xor::{bit_flips, repeating_xor, xor_bytes, BitFlips};
