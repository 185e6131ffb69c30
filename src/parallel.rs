// Parallel decryption for oracles that can be queried from several threads.
//
// Blocks do not depend on each other, so they are attacked concurrently.
// Within a block the positions must still be solved last to first, but the
// 256 candidates for a position are tried in parallel. `find_map_first`
// keeps the lowest accepted candidate, so the result is the same as the
// sequential attack.
//
// Candidates above the winner may already be running when it is found. An
// oracle fault from any of them still wins over the accepted candidate, and
// once a fault is raised every worker stops querying.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::attack::{recover_block, PaddingOracleAttack};
use crate::oracle::SharedOracle;
use crate::{blocks, pkcs7_unpad_in_place, Error, Result};

/// The first oracle fault raised by any worker.
#[derive(Default)]
struct FaultSlot {
    raised: AtomicBool,
    fault: Mutex<Option<Error>>,
}

impl FaultSlot {
    fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    fn raise(&self, err: Error) {
        if let Ok(mut fault) = self.fault.lock() {
            if fault.is_none() {
                warn!(error = %err, "oracle fault, stopping attack");
                *fault = Some(err);
            }
        }
        self.raised.store(true, Ordering::Release);
    }

    fn into_fault(self) -> Option<Error> {
        self.fault.into_inner().ok().flatten()
    }
}

impl<O: SharedOracle> PaddingOracleAttack<O> {
    pub fn decrypt_par(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.check_ciphertext_len(ciphertext.len())?;
        let ciphertext_blocks = blocks::split(ciphertext, self.block_size);
        let faults = FaultSlot::default();
        let results: Vec<Result<Vec<u8>>> = ciphertext_blocks
            .par_windows(2)
            .enumerate()
            .map(|(idx, pair)| {
                let block_idx = idx + 1;
                debug!(block = block_idx, "attacking block");
                self.recover_block_par(pair[0], pair[1], &faults)
                    .map_err(|e| e.in_block(block_idx))
            })
            .collect();

        // A fault anywhere beats a failed search. Blocks cut short by it
        // report `ByteNotFound`, which is discarded here.
        if let Some(fault) = faults.into_fault() {
            return Err(fault);
        }
        // Otherwise report the first failing block, as the sequential attack
        // would.
        let mut plaintext = results.into_iter().collect::<Result<Vec<_>>>()?.concat();
        pkcs7_unpad_in_place(&mut plaintext)?;
        Ok(plaintext)
    }

    pub fn decrypt_block_par(&self, iv: &[u8], block: &[u8]) -> Result<Vec<u8>> {
        self.check_block_len(iv, block)?;
        let faults = FaultSlot::default();
        let plaintext = self.recover_block_par(iv, block, &faults);
        match faults.into_fault() {
            Some(fault) => Err(fault),
            None => plaintext,
        }
    }

    fn recover_block_par(&self, iv: &[u8], block: &[u8], faults: &FaultSlot) -> Result<Vec<u8>> {
        recover_block(iv, block, |state, position| {
            let found = (0..=255u8).into_par_iter().find_map_first(|candidate| {
                if faults.is_raised() {
                    return None;
                }
                let mut query = |c: &[u8]| self.oracle.query_shared(c);
                match state.check(position, candidate, self.verification, &mut query) {
                    Ok(accepted) => accepted.then_some(candidate),
                    Err(err) => {
                        faults.raise(err);
                        None
                    }
                }
            });
            if faults.is_raised() {
                return Ok(None);
            }
            Ok(found)
        })
    }
}
