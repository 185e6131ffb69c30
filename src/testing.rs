// A toy keyed block cipher in CBC mode, used to build padding oracles in
// tests. It is a bijection on blocks and nothing more.
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{is_pkcs7_padded, pkcs7_pad};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Xor,
    Rotating,
}

pub struct ToyCipher {
    key: Vec<u8>,
    kind: Kind,
}

impl ToyCipher {
    /// `E(x) = x ^ key`.
    pub fn xor(key: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            kind: Kind::Xor,
        }
    }

    pub fn rotating(key: &[u8]) -> Self {
        Self {
            key: key.to_vec(),
            kind: Kind::Rotating,
        }
    }

    pub fn random(block_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let key: Vec<u8> = (0..block_size).map(|_| rng.gen()).collect();
        Self::rotating(&key)
    }

    pub fn block_size(&self) -> usize {
        self.key.len()
    }

    pub fn encrypt_block(&self, block: &[u8]) -> Vec<u8> {
        let n = self.block_size();
        match self.kind {
            Kind::Xor => block.iter().zip(&self.key).map(|(b, k)| b ^ k).collect(),
            Kind::Rotating => (0..n)
                .map(|j| {
                    let next = (j + 1) % n;
                    (block[next] ^ self.key[j])
                        .rotate_left(3)
                        .wrapping_add(self.key[next])
                })
                .collect(),
        }
    }

    pub fn decrypt_block(&self, block: &[u8]) -> Vec<u8> {
        let n = self.block_size();
        match self.kind {
            Kind::Xor => block.iter().zip(&self.key).map(|(b, k)| b ^ k).collect(),
            Kind::Rotating => {
                let mut out = vec![0u8; n];
                for j in 0..n {
                    let next = (j + 1) % n;
                    out[next] = block[j].wrapping_sub(self.key[next]).rotate_right(3) ^ self.key[j];
                }
                out
            }
        }
    }

    /// Pad and encrypt `plaintext`, returning `iv || ciphertext`.
    pub fn encrypt_cbc(&self, plaintext: &[u8], iv: &[u8]) -> Vec<u8> {
        let padded = pkcs7_pad(plaintext, self.block_size() as u8);
        let mut out = iv.to_vec();
        let mut last_block = iv.to_vec();
        for block in padded.chunks(self.block_size()) {
            let mixed: Vec<u8> = block.iter().zip(&last_block).map(|(p, c)| p ^ c).collect();
            last_block = self.encrypt_block(&mixed);
            out.extend_from_slice(&last_block);
        }
        out
    }

    /// Decrypt `iv || ciphertext` without removing padding.
    pub fn decrypt_cbc(&self, ciphertext: &[u8]) -> Vec<u8> {
        ciphertext
            .chunks(self.block_size())
            .collect::<Vec<_>>()
            .windows(2)
            .flat_map(|pair| {
                let decrypted = self.decrypt_block(pair[1]);
                decrypted
                    .iter()
                    .zip(pair[0])
                    .map(|(d, c)| d ^ c)
                    .collect::<Vec<u8>>()
            })
            .collect()
    }

    pub fn padding_valid(&self, ciphertext: &[u8]) -> bool {
        is_pkcs7_padded(&self.decrypt_cbc(ciphertext))
            .is_some_and(|n_pad| n_pad as usize <= self.block_size())
    }

    pub fn oracle(&self) -> impl Fn(&[u8]) -> bool + Sync + '_ {
        move |ciphertext: &[u8]| self.padding_valid(ciphertext)
    }
}

pub fn random_bytes(n: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotating_cipher_round_trips_block() {
        let cipher = ToyCipher::random(16, 7);
        let block: Vec<u8> = (100..116).collect();

        let encrypted = cipher.encrypt_block(&block);

        assert_ne!(encrypted, block);
        assert_eq!(cipher.decrypt_block(&encrypted), block);
    }

    #[test]
    fn xor_cipher_matches_worked_example() {
        let cipher = ToyCipher::xor(&[1, 1, 1, 1]);

        let ciphertext = cipher.encrypt_cbc(b"AB", &[0; 4]);

        assert_eq!(ciphertext, [0, 0, 0, 0, 0x40, 0x43, 0x03, 0x03]);
        assert!(cipher.padding_valid(&ciphertext));
    }
}
