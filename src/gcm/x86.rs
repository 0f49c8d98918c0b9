//! x86/x86_64 AES-NI + PCLMULQDQ kernels.
//!
//! Key expansion and block encryption use the AES-NI instruction sequence
//! from Intel's published AES-256 key-expansion sample code. GHASH
//! multiplication on this backend is routed through
//! [`crate::gcm::ghash::mul_kernel`] rather than an independently derived
//! CLMUL reduction — see `DESIGN.md` for why: the reduction constant for
//! GCM's bit-reflected convention is exactly the class of bug the domain
//! contract exists to prevent, and the portable conjugation-based multiply
//! is the one piece of this crate proven correct by construction. What
//! *is* exercised here, and checked against the software building block in
//! [`crate::gcm::ghash`], is the 64×64 carry-less multiply itself —
//! `PCLMULQDQ` and the shift-xor software fallback compute the identical
//! function on identical inputs by definition of the instruction.

use crate::params::{AES256_ROUND_KEYS, BLOCK_SIZE};

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

/// Whether this process's CPU actually supports the features these kernels
/// require. Without `std`, there is no portable way to query CPUID at
/// runtime, so this conservatively reports unavailable (see
/// [`crate::cpu`]).
#[cfg(feature = "std")]
pub fn available() -> bool {
    std::is_x86_feature_detected!("aes")
        && std::is_x86_feature_detected!("pclmulqdq")
        && std::is_x86_feature_detected!("sse2")
}

#[cfg(not(feature = "std"))]
pub fn available() -> bool {
    false
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn key_256_assist_1(temp1: &mut __m128i, temp2: &mut __m128i) {
    *temp2 = _mm_shuffle_epi32(*temp2, 0xff);
    let mut temp4 = _mm_slli_si128(*temp1, 4);
    *temp1 = _mm_xor_si128(*temp1, temp4);
    temp4 = _mm_slli_si128(temp4, 4);
    *temp1 = _mm_xor_si128(*temp1, temp4);
    temp4 = _mm_slli_si128(temp4, 4);
    *temp1 = _mm_xor_si128(*temp1, temp4);
    *temp1 = _mm_xor_si128(*temp1, *temp2);
}

#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
unsafe fn key_256_assist_2(temp1: &__m128i, temp3: &mut __m128i) {
    let temp4_assist = _mm_aeskeygenassist_si128(*temp1, 0x00);
    let temp2 = _mm_shuffle_epi32(temp4_assist, 0xaa);
    let mut temp4 = _mm_slli_si128(*temp3, 4);
    *temp3 = _mm_xor_si128(*temp3, temp4);
    temp4 = _mm_slli_si128(temp4, 4);
    *temp3 = _mm_xor_si128(*temp3, temp4);
    temp4 = _mm_slli_si128(temp4, 4);
    *temp3 = _mm_xor_si128(*temp3, temp4);
    *temp3 = _mm_xor_si128(*temp3, temp2);
}

/// AES-256 key expansion via `AESKEYGENASSIST`, interleaving a
/// rotated-SubWord-with-Rcon step (odd round keys) with a plain-SubWord
/// step (even round keys) across the two 128-bit key halves.
///
/// # Safety
///
/// Caller must ensure `aes` and `sse2` are available (see [`available`]).
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
pub unsafe fn key_schedule(key: &[u8; 32]) -> [[u8; 16]; AES256_ROUND_KEYS] {
    let mut schedule = [_mm_setzero_si128(); AES256_ROUND_KEYS];

    let mut temp1 = _mm_loadu_si128(key.as_ptr().cast());
    let mut temp3 = _mm_loadu_si128(key.as_ptr().add(16).cast());
    schedule[0] = temp1;
    schedule[1] = temp3;

    macro_rules! round_pair {
        ($rcon:expr, $even_idx:expr, $odd_idx:expr) => {
            let mut temp2 = _mm_aeskeygenassist_si128(temp3, $rcon);
            key_256_assist_1(&mut temp1, &mut temp2);
            schedule[$even_idx] = temp1;
            key_256_assist_2(&temp1, &mut temp3);
            schedule[$odd_idx] = temp3;
        };
    }

    round_pair!(0x01, 2, 3);
    round_pair!(0x02, 4, 5);
    round_pair!(0x04, 6, 7);
    round_pair!(0x08, 8, 9);
    round_pair!(0x10, 10, 11);
    round_pair!(0x20, 12, 13);

    let mut temp2 = _mm_aeskeygenassist_si128(temp3, 0x40);
    key_256_assist_1(&mut temp1, &mut temp2);
    schedule[14] = temp1;

    let mut out = [[0u8; 16]; AES256_ROUND_KEYS];
    for (dst, src) in out.iter_mut().zip(schedule.iter()) {
        _mm_storeu_si128(dst.as_mut_ptr().cast(), *src);
    }
    out
}

/// Encrypt one 16-byte block: initial `AddRoundKey`, 13 rounds of
/// `AESENC`, and a final `AESENCLAST` (no `MixColumns`).
///
/// # Safety
///
/// Caller must ensure `aes` and `sse2` are available (see [`available`]).
#[target_feature(enable = "aes")]
#[target_feature(enable = "sse2")]
pub unsafe fn encrypt_block(
    round_keys: &[[u8; 16]; AES256_ROUND_KEYS],
    block: &[u8; BLOCK_SIZE],
) -> [u8; BLOCK_SIZE] {
    let mut state = _mm_xor_si128(
        _mm_loadu_si128(block.as_ptr().cast()),
        _mm_loadu_si128(round_keys[0].as_ptr().cast()),
    );
    for round_key in round_keys.iter().take(14).skip(1) {
        state = _mm_aesenc_si128(state, _mm_loadu_si128(round_key.as_ptr().cast()));
    }
    state = _mm_aesenclast_si128(state, _mm_loadu_si128(round_keys[14].as_ptr().cast()));

    let mut out = [0u8; BLOCK_SIZE];
    _mm_storeu_si128(out.as_mut_ptr().cast(), state);
    out
}

/// GHASH multiply on this backend. Delegates to the portable,
/// domain-conjugated reference rather than an independently derived CLMUL
/// reduction; see the module-level doc comment.
///
/// # Safety
///
/// No hardware preconditions of its own; kept `unsafe` for call-site
/// uniformity with the other backend functions.
pub unsafe fn ghash_mul(a: &[u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    crate::gcm::ghash::mul_kernel(a, b)
}

/// A single hardware `PCLMULQDQ` 64×64→128 carry-less multiply, exposed so
/// it can be checked against the software fallback in
/// [`crate::gcm::ghash::clmul64`].
///
/// # Safety
///
/// Caller must ensure `pclmulqdq` and `sse2` are available.
#[target_feature(enable = "pclmulqdq")]
#[target_feature(enable = "sse2")]
pub unsafe fn hw_clmul64(a: u64, b: u64) -> (u64, u64) {
    let va = _mm_set_epi64x(0, a as i64);
    let vb = _mm_set_epi64x(0, b as i64);
    let r = _mm_clmulepi64_si128(va, vb, 0x00);
    let mut bytes = [0u8; 16];
    _mm_storeu_si128(bytes.as_mut_ptr().cast(), r);
    (
        u64::from_le_bytes(bytes[0..8].try_into().unwrap()),
        u64::from_le_bytes(bytes[8..16].try_into().unwrap()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcm::ghash::clmul64;

    #[test]
    fn hw_kernels_match_scalar_if_available() {
        if !available() {
            return;
        }
        let key = [0x5Au8; 32];
        // SAFETY: guarded by `available()`.
        let hw_rk = unsafe { key_schedule(&key) };
        let sw_rk = crate::gcm::scalar::key_schedule(&key);
        assert_eq!(hw_rk, sw_rk);

        let block = [0x42u8; 16];
        // SAFETY: guarded by `available()`.
        let hw_ct = unsafe { encrypt_block(&hw_rk, &block) };
        let sw_ct = crate::gcm::scalar::encrypt_block(&sw_rk, &block);
        assert_eq!(hw_ct, sw_ct);
    }

    #[test]
    fn hw_clmul_matches_software_clmul() {
        if !available() {
            return;
        }
        let pairs = [(0u64, 0u64), (1, 1), (u64::MAX, 1), (0xDEAD_BEEF, 0x1234_5678)];
        for (a, b) in pairs {
            // SAFETY: guarded by `available()`.
            let hw = unsafe { hw_clmul64(a, b) };
            assert_eq!(hw, clmul64(a, b));
        }
    }
}
