// Split a byte sequence into fixed-size blocks.

/// Split `data` into blocks of `block_size` bytes. The final block is shorter
/// if `data` is not a multiple of `block_size`.
///
/// # Panics
///
/// Panics if `block_size` is zero.
pub fn split(data: &[u8], block_size: usize) -> Vec<&[u8]> {
    data.chunks(block_size).collect()
}

/// Check `len` is a whole number of blocks, and at least two of them (an IV
/// and one ciphertext block).
pub(crate) fn is_attackable_len(len: usize, block_size: usize) -> bool {
    len % block_size == 0 && len >= 2 * block_size
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(b"", 4, vec![])]
    #[case(b"YELLOW", 3, vec![&b"YEL"[..], b"LOW"])]
    #[case(b"YELLOW SUB", 4, vec![&b"YELL"[..], b"OW S", b"UB"])]
    #[case(b"YELLOW", 16, vec![&b"YELLOW"[..]])]
    fn split_splits_into_blocks(
        #[case] data: &[u8],
        #[case] block_size: usize,
        #[case] expected: Vec<&[u8]>,
    ) {
        let blocks = split(data, block_size);

        assert_eq!(blocks, expected);
    }

    #[rstest]
    fn concatenating_blocks_returns_input(#[values(1, 2, 5, 16, 64)] block_size: usize) {
        let data: Vec<u8> = (0..=255).collect();

        let blocks = split(&data, block_size);

        assert_eq!(blocks.concat(), data);
        assert!(blocks[..blocks.len() - 1]
            .iter()
            .all(|b| b.len() == block_size));
    }

    #[rstest]
    #[case(32, 16, true)]
    #[case(16, 16, false)]
    #[case(33, 16, false)]
    #[case(0, 16, false)]
    #[case(8, 4, true)]
    fn attackable_len_requires_two_whole_blocks(
        #[case] len: usize,
        #[case] block_size: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(is_attackable_len(len, block_size), expected);
    }
}
