//! GHASH: universal hashing in GF(2^128), and the GCM domain contract.
//!
//! Two independent multiply implementations live here:
//!
//! - [`mul_spec`]: the bit-serial, MSB-first reference algorithm operating
//!   directly on GCM's big-endian "spec domain" bytes. This is the
//!   correctness oracle (§8's NIST known-vector test checks it directly)
//!   and is never optimized away.
//! - [`mul_kernel`]: the "kernel domain" multiply used internally by every
//!   backend, expressed as a conjugation of `mul_spec` through the
//!   byte-reversal domain transform (see [`crate::domain`]). This satisfies
//!   the domain-commute law *by construction*, which is the property the
//!   whole domain-contract discipline exists to guarantee.
//!
//! A third, independent code path — [`clmul64`] and the schoolbook/Karatsuba
//! accumulators below — models what a hardware PCLMULQDQ/PMULL-based kernel
//! actually computes before reduction. It backs the "Gate P0" property test
//! (schoolbook and Karatsuba must agree bit-for-bit *before* reduction,
//! isolating multiply bugs from reducer bugs) and is reused by the x86/
//! AArch64 backends for their batched GHASH step.

use crate::domain::{from_kernel, to_kernel};
use crate::params::{BLOCK_SIZE, MAX_H_POWERS};

/// Multiply two 128-bit polynomials in GCM **spec domain** (big-endian,
/// MSB-first bit convention) modulo R = x¹²⁸+x⁷+x²+x+1.
///
/// Bit-serial with conditional reduction driven by masked XORs rather than
/// a secret-dependent branch, so this remains safe to run on secret H or
/// secret state despite being the "slow path" reference.
pub fn mul_spec(x: &[u8; BLOCK_SIZE], y: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut z = [0u8; BLOCK_SIZE];
    let mut v = *y;

    for i in 0..128 {
        let bit = (x[i / 8] >> (7 - (i % 8))) & 1;
        let mask = 0u8.wrapping_sub(bit); // 0x00 or 0xFF, no branch
        for k in 0..BLOCK_SIZE {
            z[k] ^= v[k] & mask;
        }

        let lsb = v[BLOCK_SIZE - 1] & 1;
        let reduce_mask = 0u8.wrapping_sub(lsb);
        let mut carry = 0u8;
        for k in 0..BLOCK_SIZE {
            let new_carry = v[k] & 1;
            v[k] = (v[k] >> 1) | (carry << 7);
            carry = new_carry;
        }
        v[0] ^= 0xe1 & reduce_mask;
    }

    z
}

/// Multiply two 128-bit polynomials in **kernel domain**. Defined as
/// `to_kernel(mul_spec(from_kernel(x), from_kernel(y)))`, which makes the
/// domain-commute law (§8 property 3) hold unconditionally rather than as
/// something that must be separately verified against a hand-derived
/// reduction constant.
#[inline]
pub fn mul_kernel(x: &[u8; BLOCK_SIZE], y: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    to_kernel(mul_spec(&from_kernel(*x), &from_kernel(*y)))
}

/// Precompute H¹…H^k in kernel domain from H in spec domain (as produced by
/// `E_K(0^128)`).
///
/// `H_powers[i]` holds `H^(i+1)`; the table is built by repeated kernel-
/// domain multiplication by H¹, never by re-deriving from spec domain each
/// time (the whole point is to pay the domain conversion exactly once, at
/// i=0).
pub fn precompute_h_powers(h_spec: [u8; BLOCK_SIZE]) -> [[u8; BLOCK_SIZE]; MAX_H_POWERS] {
    let h1 = to_kernel(h_spec);
    let mut powers = [[0u8; BLOCK_SIZE]; MAX_H_POWERS];
    powers[0] = h1;
    for i in 1..MAX_H_POWERS {
        powers[i] = mul_kernel(&powers[i - 1], &h1);
    }
    powers
}

/// Debug-build tripwire: H² must equal H·H. A domain-contract violation
/// during H-power precomputation corrupts the entire table, and the bug
/// then only surfaces in final tag values — this check localizes it at the
/// point of corruption instead. Compiled out of release builds, per the
/// error-handling design's rule that no release tripwire may panic.
#[cfg(debug_assertions)]
pub fn debug_check_h_power_consistency(powers: &[[u8; BLOCK_SIZE]; MAX_H_POWERS]) {
    let h1 = powers[0];
    let h2 = mul_kernel(&h1, &h1);
    debug_assert_eq!(h2, powers[1], "H^2 != H*H: domain corruption in H-power precompute");
}

/// Absorb one 16-byte block (already in kernel domain) into a running GHASH
/// accumulator: `Xi = (Xi XOR block) * H`.
#[inline]
pub fn absorb_block(xi: &mut [u8; BLOCK_SIZE], block_kernel: &[u8; BLOCK_SIZE], h1_kernel: &[u8; BLOCK_SIZE]) {
    let mut xored = *xi;
    for k in 0..BLOCK_SIZE {
        xored[k] ^= block_kernel[k];
    }
    *xi = mul_kernel(&xored, h1_kernel);
}

/// Absorb an arbitrary-length byte stream into a running GHASH accumulator,
/// converting each spec-domain block to kernel domain at the ingress
/// boundary. The final partial block (if any) is zero-padded to 16 bytes
/// before absorption, per §4.9.
pub fn update_stream(xi: &mut [u8; BLOCK_SIZE], h1_kernel: &[u8; BLOCK_SIZE], data: &[u8]) {
    let mut chunks = data.chunks_exact(BLOCK_SIZE);
    for chunk in &mut chunks {
        let mut block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(chunk);
        absorb_block(xi, &to_kernel(block), h1_kernel);
    }
    let rem = chunks.remainder();
    if !rem.is_empty() {
        let mut block = [0u8; BLOCK_SIZE];
        block[..rem.len()].copy_from_slice(rem);
        absorb_block(xi, &to_kernel(block), h1_kernel);
    }
}

// ---------------------------------------------------------------------
// Hardware-kernel reference: 64x64 carry-less multiply, schoolbook and
// Karatsuba 128x128 accumulation (pre-reduction), and the Intel-whitepaper
// style 256->128 reduction. Used by the Gate P0 property test and by the
// x86/AArch64 backends' batched GHASH step (where the 64x64 multiply
// itself is replaced by `_mm_clmulepi64_si128` / `vmull_p64`, but the
// accumulation and reduction code is shared verbatim).
// ---------------------------------------------------------------------

/// Carry-less (polynomial) multiply of two 64-bit values, producing a
/// 128-bit result as `(low, high)` words. Pure shift-and-XOR; this is the
/// software stand-in for `PCLMULQDQ`/`PMULL` operating on one 64-bit lane
/// pair.
#[inline]
pub fn clmul64(a: u64, b: u64) -> (u64, u64) {
    let mut lo: u64 = 0;
    let mut hi: u64 = 0;
    for i in 0..64 {
        let bit = (b >> i) & 1;
        let mask = 0u64.wrapping_sub(bit);
        if i == 0 {
            lo ^= a & mask;
        } else {
            lo ^= (a << i) & mask;
            hi ^= (a >> (64 - i)) & mask;
        }
    }
    (lo, hi)
}

fn split(block: &[u8; BLOCK_SIZE]) -> (u64, u64) {
    let lo = u64::from_le_bytes(block[0..8].try_into().unwrap());
    let hi = u64::from_le_bytes(block[8..16].try_into().unwrap());
    (lo, hi)
}

fn join(lo: u64, hi: u64) -> [u8; BLOCK_SIZE] {
    let mut out = [0u8; BLOCK_SIZE];
    out[0..8].copy_from_slice(&lo.to_le_bytes());
    out[8..16].copy_from_slice(&hi.to_le_bytes());
    out
}

/// The 256-bit product of two 128-bit operands via four independent 64x64
/// carry-less multiplies (the "4-partial schoolbook" form), before
/// reduction. Returned as four little-endian words, word `i` holding bits
/// `[64i, 64i+64)`.
pub fn clmul_schoolbook_256(a: &[u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) -> [u64; 4] {
    let (a0, a1) = split(a);
    let (b0, b1) = split(b);
    let mut acc = [0u64; 4];

    let (lo, hi) = clmul64(a0, b0);
    acc[0] ^= lo;
    acc[1] ^= hi;

    let (lo, hi) = clmul64(a0, b1);
    acc[1] ^= lo;
    acc[2] ^= hi;

    let (lo, hi) = clmul64(a1, b0);
    acc[1] ^= lo;
    acc[2] ^= hi;

    let (lo, hi) = clmul64(a1, b1);
    acc[2] ^= lo;
    acc[3] ^= hi;

    acc
}

/// The same 256-bit product via the Karatsuba 3-multiply identity: compute
/// `a0*b0`, `a1*b1`, and `(a0^a1)*(b0^b1)`, then recover the cross term as
/// `mid = (a0^a1)*(b0^b1) ^ a0*b0 ^ a1*b1`. Trades one 64x64 multiply for a
/// handful of XORs.
pub fn clmul_karatsuba_256(a: &[u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) -> [u64; 4] {
    let (a0, a1) = split(a);
    let (b0, b1) = split(b);
    let mut acc = [0u64; 4];

    let (t00_lo, t00_hi) = clmul64(a0, b0);
    let (t11_lo, t11_hi) = clmul64(a1, b1);
    let (tm_lo, tm_hi) = clmul64(a0 ^ a1, b0 ^ b1);
    let mid_lo = tm_lo ^ t00_lo ^ t11_lo;
    let mid_hi = tm_hi ^ t00_hi ^ t11_hi;

    acc[0] ^= t00_lo;
    acc[1] ^= t00_hi;
    acc[1] ^= mid_lo;
    acc[2] ^= mid_hi;
    acc[2] ^= t11_lo;
    acc[3] ^= t11_hi;

    acc
}

/// x⁷+x²+x+1, the residue of x¹²⁸ modulo R = x¹²⁸+x⁷+x²+x+1, in this
/// module's little-endian-bit-per-word convention (bit *i* of the combined
/// `(lo, hi)` pair is the coefficient of x^i).
const RLOW: u64 = 0x87;

/// Reduce a 256-bit carry-less product (as produced by
/// [`clmul_schoolbook_256`] / [`clmul_karatsuba_256`]) modulo
/// R = x¹²⁸+x⁷+x²+x+1.
///
/// Since x¹²⁸ ≡ x⁷+x²+x+1 (mod R), the high 128 bits of the product are
/// folded back by multiplying them by the small constant [`RLOW`]; that
/// multiply can itself overflow by at most 6 bits, which is folded back a
/// second time. No branch depends on whether the overflow is actually
/// nonzero, so this runs in constant time with respect to the product.
pub fn reduce256(acc: [u64; 4]) -> (u64, u64) {
    let (t0_lo, t0_hi) = clmul64(acc[2], RLOW);
    let (t1_lo, t1_hi) = clmul64(acc[3], RLOW);
    let w0 = t0_lo;
    let w1 = t0_hi ^ t1_lo;
    let w2 = t1_hi;
    let (c_lo, _c_hi) = clmul64(w2, RLOW);
    (acc[0] ^ w0 ^ c_lo, acc[1] ^ w1)
}

/// Full hardware-style kernel-domain multiply: schoolbook accumulate then
/// reduce. Exposed for the x86/AArch64 backends and for tests that check it
/// against [`mul_kernel`].
pub fn clmul_mul_kernel(a: &[u8; BLOCK_SIZE], b: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    let acc = clmul_schoolbook_256(a, b);
    let (lo, hi) = reduce256(acc);
    join(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn nist_known_ghash_vector() {
        // mul_spec(cea7403d…, dc95c078…) = fd6ab7586e556dba06d69cfe6223b262
        let x = hex!("cea7403d4d606b6e074ec5d3baf39d18");
        let h = hex!("dc95c078a2408989ad48a21492842087");
        let expected = hex!("fd6ab7586e556dba06d69cfe6223b262");
        assert_eq!(mul_spec(&x, &h), expected);
    }

    #[test]
    fn domain_commute_law_holds_by_construction() {
        let x = [0x11u8; 16];
        let h = [0x22u8; 16];
        let lhs = from_kernel(mul_kernel(&to_kernel(x), &to_kernel(h)));
        let rhs = mul_spec(&x, &h);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn unit_vector_probes_agree_with_mul_spec_conjugate() {
        let bit_positions = [0usize, 1, 2, 7, 63, 64, 127];
        let h = [0x5Au8; 16];
        for &pos in &bit_positions {
            let mut x = [0u8; 16];
            x[pos / 8] = 1 << (7 - (pos % 8));
            let via_kernel = from_kernel(mul_kernel(&to_kernel(x), &to_kernel(h)));
            assert_eq!(via_kernel, mul_spec(&x, &h));
        }
    }

    #[test]
    fn h_power_consistency() {
        let h_spec = [0x01u8; 16];
        let powers = precompute_h_powers(h_spec);
        for i in 1..MAX_H_POWERS - 1 {
            let expected = mul_kernel(&powers[i - 1], &powers[0]);
            assert_eq!(powers[i], expected, "H^{} != H^{} * H", i + 1, i);
        }
    }

    #[test]
    fn gate_p0_schoolbook_matches_karatsuba_before_reduction() {
        // Deterministic pseudo-random pairs (no RNG dependency: xorshift64).
        let mut state: u64 = 0x9E3779B97F4A7C15;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        for _ in 0..256 {
            let a = join(next(), next());
            let b = join(next(), next());
            assert_eq!(clmul_schoolbook_256(&a, &b), clmul_karatsuba_256(&a, &b));
        }
    }

    #[test]
    fn clmul64_matches_naive_polynomial_multiply() {
        let a: u64 = 0xDEAD_BEEF_0000_0001;
        let b: u64 = 0x1234_5678_0000_0001;
        let (lo, hi) = clmul64(a, b);

        // Naive O(64^2) bit-by-bit reference for cross-check.
        let mut ref_lo = 0u64;
        let mut ref_hi = 0u64;
        for i in 0..64 {
            if (a >> i) & 1 == 1 {
                for j in 0..64 {
                    if (b >> j) & 1 == 1 {
                        let pos = i + j;
                        if pos < 64 {
                            ref_lo ^= 1u64 << pos;
                        } else {
                            ref_hi ^= 1u64 << (pos - 64);
                        }
                    }
                }
            }
        }
        assert_eq!((lo, hi), (ref_lo, ref_hi));
    }
}
