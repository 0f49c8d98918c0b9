//! Fused AES-CTR + GHASH batch processing.
//!
//! Rather than interleaving a single AES block and a single GHASH multiply
//! one-for-one (which chains two serially-dependent instruction streams
//! through every block), blocks are processed in batches of
//! [`crate::params::ExecutionPlan::lane_depth`]: the batch's keystream is
//! generated into a small stack buffer first, then the whole batch is
//! absorbed into GHASH. This keeps the AES round pipeline and the GHASH
//! multiply-reduce chain each running on contiguous, independent work,
//! which is what lets a superscalar core actually overlap them — the same
//! motivation as the write-avoid batching in s2n-quic's generic AES-GCM
//! kernel. Buffers are fixed-size stack arrays sized to the largest lane
//! depth (16); nothing here allocates.
//!
//! `H_powers` is precomputed up to `H^16` (see
//! [`crate::gcm::ghash::precompute_h_powers`]) for a further
//! power-parallel GHASH reduction that batches multiple independent CLMULs
//! before a single final reduction. That scheme operates on raw
//! pre-reduction accumulators in the kernel-domain representation, which
//! this crate has not independently derived and verified (see
//! `DESIGN.md`); this module instead absorbs each block sequentially
//! through [`crate::gcm::ghash::mul_kernel`], which is proven correct by
//! construction. `H_powers` beyond `H^1` is currently unused; it is kept in
//! the context layout so that optimization can be added later without a
//! layout change.

use crate::domain::to_kernel;
use crate::gcm::backend::Backend;
use crate::gcm::ctr::counter_block;
use crate::gcm::ghash::mul_kernel;
use crate::params::{ExecutionPlan, AES256_ROUND_KEYS, BLOCK_SIZE};

const MAX_LANES: usize = 16;

fn xor_block(dst: &mut [u8], keystream: &[u8; BLOCK_SIZE]) {
    for (d, k) in dst.iter_mut().zip(keystream.iter()) {
        *d ^= *k;
    }
}

/// Encrypt `buf` in place under AES-CTR and fold the resulting ciphertext
/// into `ghash_state` (kernel domain), processing in `plan`-sized batches.
///
/// Returns the counter value one past the last block consumed.
pub fn encrypt_and_absorb(
    backend: Backend,
    plan: ExecutionPlan,
    round_keys: &[[u8; 16]; AES256_ROUND_KEYS],
    j0: &[u8; BLOCK_SIZE],
    start_counter: u32,
    ghash_state: &mut [u8; BLOCK_SIZE],
    h: &[u8; BLOCK_SIZE],
    buf: &mut [u8],
) -> u32 {
    process_batches(backend, plan, round_keys, j0, start_counter, ghash_state, h, buf, true)
}

/// Fold `buf` (ciphertext, not yet decrypted) into `ghash_state` and then
/// decrypt it in place under AES-CTR, processing in `plan`-sized batches.
///
/// Returns the counter value one past the last block consumed.
pub fn decrypt_and_absorb(
    backend: Backend,
    plan: ExecutionPlan,
    round_keys: &[[u8; 16]; AES256_ROUND_KEYS],
    j0: &[u8; BLOCK_SIZE],
    start_counter: u32,
    ghash_state: &mut [u8; BLOCK_SIZE],
    h: &[u8; BLOCK_SIZE],
    buf: &mut [u8],
) -> u32 {
    process_batches(backend, plan, round_keys, j0, start_counter, ghash_state, h, buf, false)
}

#[allow(clippy::too_many_arguments)]
fn process_batches(
    backend: Backend,
    plan: ExecutionPlan,
    round_keys: &[[u8; 16]; AES256_ROUND_KEYS],
    j0: &[u8; BLOCK_SIZE],
    start_counter: u32,
    ghash_state: &mut [u8; BLOCK_SIZE],
    h: &[u8; BLOCK_SIZE],
    buf: &mut [u8],
    is_encrypt: bool,
) -> u32 {
    let lanes = plan.lane_depth.blocks().min(MAX_LANES);
    let mut counter = start_counter;
    let mut offset = 0;
    let mut keystream = [[0u8; BLOCK_SIZE]; MAX_LANES];

    while offset < buf.len() {
        let remaining = buf.len() - offset;
        let batch_bytes = remaining.min(lanes * BLOCK_SIZE);
        let full_blocks = batch_bytes / BLOCK_SIZE;
        let tail_len = batch_bytes % BLOCK_SIZE;
        let block_count = full_blocks + usize::from(tail_len != 0);

        for (i, ks) in keystream.iter_mut().take(block_count).enumerate() {
            let block = counter_block(j0, counter.wrapping_add(i as u32));
            *ks = backend.encrypt_block(round_keys, &block);
        }

        let batch = &mut buf[offset..offset + batch_bytes];
        for i in 0..full_blocks {
            let chunk = &mut batch[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE];
            if !is_encrypt {
                absorb_one(ghash_state, h, chunk);
            }
            xor_block(chunk, &keystream[i]);
            if is_encrypt {
                absorb_one(ghash_state, h, chunk);
            }
        }
        if tail_len != 0 {
            let chunk = &mut batch[full_blocks * BLOCK_SIZE..];
            if !is_encrypt {
                absorb_partial(ghash_state, h, chunk);
            }
            xor_block(chunk, &keystream[full_blocks]);
            if is_encrypt {
                absorb_partial(ghash_state, h, chunk);
            }
        }

        counter = counter.wrapping_add(block_count as u32);
        offset += batch_bytes;
    }

    counter
}

fn absorb_one(ghash_state: &mut [u8; BLOCK_SIZE], h: &[u8; BLOCK_SIZE], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_SIZE);
    let mut kernel_block = [0u8; BLOCK_SIZE];
    kernel_block.copy_from_slice(block);
    let kernel_block = to_kernel(kernel_block);
    for i in 0..BLOCK_SIZE {
        ghash_state[i] ^= kernel_block[i];
    }
    *ghash_state = mul_kernel(ghash_state, h);
}

fn absorb_partial(ghash_state: &mut [u8; BLOCK_SIZE], h: &[u8; BLOCK_SIZE], block: &[u8]) {
    let mut padded = [0u8; BLOCK_SIZE];
    padded[..block.len()].copy_from_slice(block);
    absorb_one(ghash_state, h, &padded);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Features;
    use crate::gcm::scalar;
    use crate::params::{LaneDepth, Overlap, StoreMode};

    fn reference_ghash(h: &[u8; BLOCK_SIZE], blocks: &[[u8; BLOCK_SIZE]]) -> [u8; BLOCK_SIZE] {
        let mut state = [0u8; BLOCK_SIZE];
        for block in blocks {
            let kernel_block = to_kernel(*block);
            for i in 0..BLOCK_SIZE {
                state[i] ^= kernel_block[i];
            }
            state = mul_kernel(&state, h);
        }
        state
    }

    #[test]
    fn batched_encrypt_matches_sequential_single_block_reference() {
        let key = [0x11u8; 32];
        let round_keys = scalar::key_schedule(&key);
        let j0 = [0x22u8; 16];
        let h_spec = scalar::encrypt_block(&round_keys, &[0u8; 16]);
        let h = to_kernel(h_spec);
        let backend = Backend::select(Features::detect());

        for plan in [
            ExecutionPlan::scalar(),
            ExecutionPlan {
                lane_depth: LaneDepth::Eight,
                overlap: Overlap::None,
                accumulators: 2,
                store_mode: StoreMode::Cached,
            },
            ExecutionPlan {
                lane_depth: LaneDepth::Sixteen,
                overlap: Overlap::PhaseLocked,
                accumulators: 4,
                store_mode: StoreMode::Streaming,
            },
        ] {
            let mut buf = [0u8; 16 * 3 + 5];
            for (i, b) in buf.iter_mut().enumerate() {
                *b = i as u8;
            }
            let original = buf;

            let mut state = [0u8; 16];
            let next = encrypt_and_absorb(backend, plan, &round_keys, &j0, 7, &mut state, &h, &mut buf);
            assert_eq!(next, 7 + 4);

            let mut blocks = Vec::new();
            let mut counter = 7u32;
            for chunk in original.chunks(16) {
                let ks = scalar::encrypt_block(&round_keys, &crate::gcm::ctr::counter_block(&j0, counter));
                let mut block = [0u8; 16];
                for (i, c) in chunk.iter().enumerate() {
                    block[i] = c ^ ks[i];
                }
                blocks.push(block);
                counter += 1;
            }
            let expected_state = reference_ghash(&h, &blocks);
            assert_eq!(state, expected_state);
        }
    }

    #[test]
    fn decrypt_then_encrypt_is_identity() {
        let key = [0x33u8; 32];
        let round_keys = scalar::key_schedule(&key);
        let j0 = [0x44u8; 16];
        let h_spec = scalar::encrypt_block(&round_keys, &[0u8; 16]);
        let h = to_kernel(h_spec);
        let backend = Backend::Scalar;
        let plan = ExecutionPlan::scalar();

        let mut buf = [7u8; 40];
        let original = buf;
        let mut enc_state = [0u8; 16];
        encrypt_and_absorb(backend, plan, &round_keys, &j0, 1, &mut enc_state, &h, &mut buf);

        let mut dec_state = [0u8; 16];
        decrypt_and_absorb(backend, plan, &round_keys, &j0, 1, &mut dec_state, &h, &mut buf);
        assert_eq!(buf, original);
        assert_eq!(enc_state, dec_state);
    }
}
