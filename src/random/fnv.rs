//! 32-bit FNV hash over three words, used to derive per-cube seeds.

const OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Hashes three words into one using the FNV-1 multiply/xor chain.
///
/// Each word is folded in whole (not byte-by-byte), so the result is cheap enough to
/// compute 27 times per sample in the cube-hash cellular generator.
#[inline]
pub fn fnv_hash3(i: u32, j: u32, k: u32) -> u32 {
    let h = (OFFSET_BASIS ^ i).wrapping_mul(FNV_PRIME);
    let h = (h ^ j).wrapping_mul(FNV_PRIME);
    (h ^ k).wrapping_mul(FNV_PRIME)
}
