// src/shuffle_box.rs
//
// Permutation-box keystream core (RC4-style, stateless per call).
// - 256-entry byte permutation seeded by the caller's crypt key
// - swap-based key schedule, then a PRGA walk XORed over the input
// - index arithmetic modulo 256 throughout; fixed stack array, the only
//   allocation is the output buffer

use zeroize::Zeroize;

pub const BOX_SIZE: usize = 256;

/// Build the scrambled permutation box from `crypt_key`.
///
/// The key bytes cycle over the 256 schedule steps; the scramble is the
/// classic swap-based one: `j = (j + box[i] + key[i mod klen]) mod 256`.
pub fn box_schedule(crypt_key: &[u8]) -> [u8; BOX_SIZE] {
    debug_assert!(!crypt_key.is_empty());
    let mut sbox = [0u8; BOX_SIZE];
    for (i, slot) in sbox.iter_mut().enumerate() {
        *slot = i as u8;
    }
    let mut j = 0usize;
    for i in 0..BOX_SIZE {
        j = (j + sbox[i] as usize + crypt_key[i % crypt_key.len()] as usize) % BOX_SIZE;
        sbox.swap(i, j);
    }
    sbox
}

/// Walk the box PRGA-style and XOR the generated keystream over `input`.
///
/// XOR-symmetric: applying the transform twice with the same schedule
/// restores the input. The box is consumed and wiped before return.
pub fn box_xor(mut sbox: [u8; BOX_SIZE], input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut a = 0usize;
    let mut j = 0usize;
    for &byte in input {
        a = (a + 1) % BOX_SIZE;
        j = (j + sbox[a] as usize) % BOX_SIZE;
        sbox.swap(a, j);
        let k = sbox[(sbox[a] as usize + sbox[j] as usize) % BOX_SIZE];
        out.push(byte ^ k);
    }
    sbox.zeroize();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_a_permutation() {
        let sbox = box_schedule(b"0123456789abcdef");
        let mut seen = [false; BOX_SIZE];
        for &v in sbox.iter() {
            assert!(!seen[v as usize]);
            seen[v as usize] = true;
        }
    }

    #[test]
    fn xor_is_symmetric() {
        let key = b"a very pedestrian crypt key";
        let input = b"the quick brown fox jumps over the lazy dog";
        let once = box_xor(box_schedule(key), input);
        assert_ne!(&once[..], &input[..]);
        let twice = box_xor(box_schedule(key), &once);
        assert_eq!(&twice[..], &input[..]);
    }

    #[test]
    fn different_keys_diverge() {
        let input = [0u8; 64];
        let a = box_xor(box_schedule(b"key-a"), &input);
        let b = box_xor(box_schedule(b"key-b"), &input);
        assert_ne!(a, b);
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(box_xor(box_schedule(b"k"), &[]).is_empty());
    }
}
