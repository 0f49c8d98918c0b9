//! AES-CTR keystream generation and IV setup (J₀ derivation).

use crate::gcm::ghash::mul_spec;
use crate::params::BLOCK_SIZE;

/// Build the 16-byte counter block: `J0` with its last 4 bytes (the
/// big-endian counter field) replaced by `counter`.
#[inline]
pub fn counter_block(j0: &[u8; BLOCK_SIZE], counter: u32) -> [u8; BLOCK_SIZE] {
    let mut block = *j0;
    block[12..16].copy_from_slice(&counter.to_be_bytes());
    block
}

/// Derive `J0` from an IV, per §4.10.
///
/// **96-bit fast path:** `J0 = IV ‖ 0x00000001`, no GHASH required.
///
/// **Arbitrary-length IV:** `J0 = GHASH_H(IV ‖ pad ‖ len64(IV))`, where `pad`
/// is `s = 128⌈|IV|/128⌉ − |IV|` bits of zero following the IV, and
/// `len64(IV)` is the IV's bit length as a 64-bit big-endian integer. GHASH
/// here is the spec-domain multiply directly (`mul_spec`): `J0` is itself a
/// spec-domain value, derived before anything enters the kernel-domain
/// accumulator.
pub fn derive_j0(h_spec: &[u8; BLOCK_SIZE], iv: &[u8]) -> [u8; BLOCK_SIZE] {
    if iv.len() == 12 {
        let mut j0 = [0u8; BLOCK_SIZE];
        j0[..12].copy_from_slice(iv);
        j0[15] = 1;
        return j0;
    }

    let mut y = [0u8; BLOCK_SIZE];
    let mut chunks = iv.chunks_exact(BLOCK_SIZE);
    for chunk in &mut chunks {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        for k in 0..BLOCK_SIZE {
            y[k] ^= block[k];
        }
        y = mul_spec(&y, h_spec);
    }
    let rem = chunks.remainder();
    if !rem.is_empty() {
        let mut block = [0u8; BLOCK_SIZE];
        block[..rem.len()].copy_from_slice(rem);
        for k in 0..BLOCK_SIZE {
            y[k] ^= block[k];
        }
        y = mul_spec(&y, h_spec);
    }

    let mut len_block = [0u8; BLOCK_SIZE];
    let iv_bits = (iv.len() as u64) * 8;
    len_block[8..16].copy_from_slice(&iv_bits.to_be_bytes());
    for k in 0..BLOCK_SIZE {
        y[k] ^= len_block[k];
    }
    mul_spec(&y, h_spec)
}
