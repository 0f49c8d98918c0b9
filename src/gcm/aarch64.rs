//! AArch64 ARMv8 Cryptography Extensions (AES, PMULL) kernels.
//!
//! The key schedule has no ARM crypto-instruction equivalent to
//! `AESKEYGENASSIST`, so it reuses [`crate::gcm::scalar::key_schedule`]
//! unchanged — this mirrors how production ARM AES-GCM implementations
//! (e.g. the `aesv8-armx` family) handle expansion in software and only
//! accelerate the per-block rounds. GHASH multiplication is routed through
//! [`crate::gcm::ghash::mul_kernel`] for the same reason as the x86 backend
//! (see that module's doc comment): only the 64×64 carry-less multiply
//! itself, `PMULL` versus the software fallback, is checked directly.

use crate::params::{AES256_ROUND_KEYS, BLOCK_SIZE};

use core::arch::aarch64::*;

/// Whether this process's CPU supports AES and PMULL. Without `std`, there
/// is no portable runtime feature query, so this conservatively reports
/// unavailable (see [`crate::cpu`]).
#[cfg(feature = "std")]
pub fn available() -> bool {
    std::arch::is_aarch64_feature_detected!("aes") && std::arch::is_aarch64_feature_detected!("neon")
}

#[cfg(not(feature = "std"))]
pub fn available() -> bool {
    false
}

/// Expand the key in software; see the module doc comment for why ARM
/// crypto has no accelerated path for this step.
pub fn key_schedule(key: &[u8; 32]) -> [[u8; 16]; AES256_ROUND_KEYS] {
    crate::gcm::scalar::key_schedule(key)
}

/// Encrypt one 16-byte block using `AESE`/`AESMC` for the first 13 rounds
/// and a final `AESE` + plain XOR for the last round (ARMv8's `AESE`
/// instruction fuses AddRoundKey, SubBytes, and ShiftRows; `AESMC` performs
/// MixColumns separately, and the final round omits it).
///
/// # Safety
///
/// Caller must ensure `aes` and `neon` are available (see [`available`]).
#[target_feature(enable = "aes")]
#[target_feature(enable = "neon")]
pub unsafe fn encrypt_block(
    round_keys: &[[u8; 16]; AES256_ROUND_KEYS],
    block: &[u8; BLOCK_SIZE],
) -> [u8; BLOCK_SIZE] {
    let mut data = vld1q_u8(block.as_ptr());
    for round_key in round_keys.iter().take(13) {
        let rk = vld1q_u8(round_key.as_ptr());
        data = vaeseq_u8(data, rk);
        data = vaesmcq_u8(data);
    }
    let rk13 = vld1q_u8(round_keys[13].as_ptr());
    data = vaeseq_u8(data, rk13);
    let rk14 = vld1q_u8(round_keys[14].as_ptr());
    data = veorq_u8(data, rk14);

    let mut out = [0u8; BLOCK_SIZE];
    vst1q_u8(out.as_mut_ptr(), data);
    out
}

/// GHASH multiply on this backend. Delegates to the portable,
/// domain-conjugated reference; see the module-level doc comment.
///
/// # Safety
///
/// No hardware preconditions of its own; kept `unsafe` for call-site
/// uniformity with the other backend functions.
pub unsafe fn ghash_mul(a: &[u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    crate::gcm::ghash::mul_kernel(a, b)
}

/// A single hardware `PMULL` 64×64→128 carry-less multiply, exposed so it
/// can be checked against the software fallback in
/// [`crate::gcm::ghash::clmul64`].
///
/// # Safety
///
/// Caller must ensure `aes` (which implies `PMULL` on ARMv8-A) is available.
#[target_feature(enable = "aes")]
#[target_feature(enable = "neon")]
pub unsafe fn hw_clmul64(a: u64, b: u64) -> (u64, u64) {
    let r: u128 = vmull_p64(a, b);
    let bytes = r.to_le_bytes();
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
        let rk = key_schedule(&key);
        let block = [0x42u8; 16];
        // SAFETY: guarded by `available()`.
        let hw_ct = unsafe { encrypt_block(&rk, &block) };
        let sw_ct = crate::gcm::scalar::encrypt_block(&rk, &block);
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
