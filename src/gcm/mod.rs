//! AES-256-GCM: the streaming AEAD context, its lifecycle state machine,
//! and the algorithmic building blocks it is assembled from.
//!
//! The context (`Aes256GcmContext`) is a fixed-size, non-heap-allocating
//! record driven through `init -> (aad_update*) -> (encrypt_update* |
//! decrypt_update*) -> encrypt_final | decrypt_final`. Calls out of order
//! return [`Error::InvalidInput`] rather than panicking; nothing in this
//! module panics on attacker-controlled input.

pub mod backend;
pub mod ctr;
pub mod fused;
pub mod ghash;
pub mod scalar;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod x86;

#[cfg(target_arch = "aarch64")]
pub mod aarch64;

use core::fmt;

use zeroize::Zeroize;

use crate::constant_time::ct_tag_eq;
use crate::cpu::Features;
use crate::domain::{from_kernel, to_kernel};
use crate::error::{Error, Result};
use crate::gcm::backend::Backend;
use crate::gcm::ctr::{counter_block, derive_j0};
use crate::gcm::ghash::{absorb_block, precompute_h_powers};
#[cfg(debug_assertions)]
use crate::gcm::ghash::debug_check_h_power_consistency;
use crate::params::{
    ExecutionPlan, AES256_ROUND_KEYS, BLOCK_SIZE, IV_SIZE, KEY_SIZE, MAX_CT_BYTES, MAX_H_POWERS,
    ROUND_KEY_BYTES, TAG_SIZE,
};
use crate::secure_memory::{secure_scope, Aligned64, SecureArray};
use crate::traits::AeadEngine;

/// Lifecycle phase. `Aad` absorbs additional authenticated data;
/// `Encrypting`/`Decrypting` absorb/produce ciphertext (a context, once it
/// has started one direction, cannot switch to the other without a
/// `reset`); `Final` has emitted or checked a tag and accepts no further
/// `update` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GcmState {
    Init,
    Aad,
    Encrypting,
    Decrypting,
    Final,
}

fn flatten_round_keys(rk: &[[u8; BLOCK_SIZE]; AES256_ROUND_KEYS]) -> [u8; ROUND_KEY_BYTES] {
    let mut out = [0u8; ROUND_KEY_BYTES];
    for (i, block) in rk.iter().enumerate() {
        out[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE].copy_from_slice(block);
    }
    out
}

fn unflatten_round_keys(bytes: &[u8]) -> [[u8; BLOCK_SIZE]; AES256_ROUND_KEYS] {
    let mut out = [[0u8; BLOCK_SIZE]; AES256_ROUND_KEYS];
    for (i, block) in out.iter_mut().enumerate() {
        block.copy_from_slice(&bytes[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE]);
    }
    out
}

/// A streaming AES-256-GCM encryption/decryption context (NIST SP 800-38D).
///
/// Roughly 512 bytes, 64-byte aligned at `h_powers` (see
/// [`crate::params::CONTEXT_ALIGNMENT`]); holds no pointers and performs no
/// dynamic allocation, so it can be embedded directly in caller-owned
/// memory.
pub struct Aes256GcmContext {
    round_keys: SecureArray<ROUND_KEY_BYTES>,
    h_spec: [u8; BLOCK_SIZE],
    h_powers: Aligned64<[[u8; BLOCK_SIZE]; MAX_H_POWERS]>,
    j0: [u8; BLOCK_SIZE],
    ghash_state: [u8; BLOCK_SIZE],
    /// Ciphertext bytes seen but not yet folded into `ghash_state` because
    /// they don't yet complete a 16-byte block. Doubles as the AAD holding
    /// buffer during the `Aad` phase; by the time the first `encrypt_update`
    /// / `decrypt_update` runs, the AAD use has already been flushed and
    /// zeroed, so one buffer safely serves both purposes in sequence.
    partial: [u8; BLOCK_SIZE],
    partial_len: usize,
    /// The most recently generated keystream block, and how many of its
    /// bytes have already been consumed — lets `encrypt_update`/
    /// `decrypt_update` resume mid-block across calls whose boundaries
    /// don't land on a 16-byte multiple.
    keystream_cache: [u8; BLOCK_SIZE],
    keystream_pos: usize,
    aad_len: u64,
    ct_len: u64,
    /// CTR block counter. `J0` itself carries counter value 1 (used only to
    /// produce the tag mask in `finalize_tag`); body processing starts at 2
    /// and advances one per 16-byte block.
    counter: u32,
    state: GcmState,
    plan: ExecutionPlan,
    backend: Backend,
}

impl Aes256GcmContext {
    fn flush_partial_into_ghash(&mut self) {
        if self.partial_len > 0 {
            let mut block = [0u8; BLOCK_SIZE];
            block[..self.partial_len].copy_from_slice(&self.partial[..self.partial_len]);
            let h1 = self.h_powers[0];
            absorb_block(&mut self.ghash_state, &to_kernel(block), &h1);
            self.partial = [0u8; BLOCK_SIZE];
            self.partial_len = 0;
        }
    }

    fn absorb_aad(&mut self, data: &[u8]) {
        let h1 = self.h_powers[0];
        let mut offset = 0;

        if self.partial_len > 0 {
            let need = BLOCK_SIZE - self.partial_len;
            let take = need.min(data.len());
            self.partial[self.partial_len..self.partial_len + take]
                .copy_from_slice(&data[..take]);
            self.partial_len += take;
            offset += take;
            if self.partial_len == BLOCK_SIZE {
                absorb_block(&mut self.ghash_state, &to_kernel(self.partial), &h1);
                self.partial = [0u8; BLOCK_SIZE];
                self.partial_len = 0;
            }
        }

        let remaining = &data[offset..];
        let mut chunks = remaining.chunks_exact(BLOCK_SIZE);
        for chunk in &mut chunks {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            absorb_block(&mut self.ghash_state, &to_kernel(block), &h1);
        }
        let rem = chunks.remainder();
        if !rem.is_empty() {
            self.partial[..rem.len()].copy_from_slice(rem);
            self.partial_len = rem.len();
        }
    }

    fn enter_body(&mut self, encrypting: bool) -> Result<()> {
        match self.state {
            GcmState::Init | GcmState::Aad => {
                self.flush_partial_into_ghash();
                self.state = if encrypting { GcmState::Encrypting } else { GcmState::Decrypting };
                Ok(())
            }
            GcmState::Encrypting if encrypting => Ok(()),
            GcmState::Decrypting if !encrypting => Ok(()),
            _ => Err(Error::InvalidInput),
        }
    }

    fn process_body(&mut self, buf: &mut [u8], is_encrypt: bool) {
        let round_keys = unflatten_round_keys(self.round_keys.as_ref());
        let h1 = self.h_powers[0];
        let mut offset = 0;

        if self.keystream_pos == 0 && self.partial_len == 0 {
            let aligned_len = (buf.len() / BLOCK_SIZE) * BLOCK_SIZE;
            if aligned_len > 0 {
                let next_counter = if is_encrypt {
                    fused::encrypt_and_absorb(
                        self.backend,
                        self.plan,
                        &round_keys,
                        &self.j0,
                        self.counter,
                        &mut self.ghash_state,
                        &h1,
                        &mut buf[..aligned_len],
                    )
                } else {
                    fused::decrypt_and_absorb(
                        self.backend,
                        self.plan,
                        &round_keys,
                        &self.j0,
                        self.counter,
                        &mut self.ghash_state,
                        &h1,
                        &mut buf[..aligned_len],
                    )
                };
                self.counter = next_counter;
                offset = aligned_len;
            }
        }

        for i in offset..buf.len() {
            if self.keystream_pos == 0 {
                let block = counter_block(&self.j0, self.counter);
                self.keystream_cache = self.backend.encrypt_block(&round_keys, &block);
                self.counter = self.counter.wrapping_add(1);
            }
            let ks_byte = self.keystream_cache[self.keystream_pos];
            self.keystream_pos += 1;
            if self.keystream_pos == BLOCK_SIZE {
                self.keystream_pos = 0;
            }

            let ct_byte = if is_encrypt {
                let c = buf[i] ^ ks_byte;
                buf[i] = c;
                c
            } else {
                let c = buf[i];
                buf[i] ^= ks_byte;
                c
            };

            self.partial[self.partial_len] = ct_byte;
            self.partial_len += 1;
            if self.partial_len == BLOCK_SIZE {
                absorb_block(&mut self.ghash_state, &to_kernel(self.partial), &h1);
                self.partial = [0u8; BLOCK_SIZE];
                self.partial_len = 0;
            }
        }
    }

    fn finalize_tag(&mut self) -> [u8; TAG_SIZE] {
        self.flush_partial_into_ghash();

        let mut len_block = [0u8; BLOCK_SIZE];
        len_block[0..8].copy_from_slice(&(self.aad_len * 8).to_be_bytes());
        len_block[8..16].copy_from_slice(&(self.ct_len * 8).to_be_bytes());
        let h1 = self.h_powers[0];
        absorb_block(&mut self.ghash_state, &to_kernel(len_block), &h1);

        let round_keys = unflatten_round_keys(self.round_keys.as_ref());
        let ek_j0 = self.backend.encrypt_block(&round_keys, &self.j0);
        let ghash_spec = from_kernel(self.ghash_state);

        let mut tag = [0u8; TAG_SIZE];
        for i in 0..TAG_SIZE {
            tag[i] = ghash_spec[i] ^ ek_j0[i];
        }
        self.state = GcmState::Final;
        tag
    }
}

impl AeadEngine for Aes256GcmContext {
    const KEY_SIZE: usize = KEY_SIZE;
    const TAG_SIZE: usize = TAG_SIZE;
    const IV_RECOMMENDED_SIZE: usize = IV_SIZE;

    fn init(key: &[u8], iv: &[u8]) -> Result<Self> {
        if key.len() != KEY_SIZE || iv.is_empty() {
            return Err(Error::InvalidInput);
        }

        let features = Features::detect();
        let backend = Backend::select(features);
        let round_keys = secure_scope(|key_arr: &mut [u8; KEY_SIZE]| {
            key_arr.copy_from_slice(key);
            backend.key_schedule(key_arr)
        });

        let h_spec = backend.encrypt_block(&round_keys, &[0u8; BLOCK_SIZE]);
        let h_powers_arr = precompute_h_powers(h_spec);
        #[cfg(debug_assertions)]
        debug_check_h_power_consistency(&h_powers_arr);

        let j0 = derive_j0(&h_spec, iv);
        let plan = ExecutionPlan::select(&features, None);

        crate::observability::record_init("aes-256-gcm");

        Ok(Self {
            round_keys: SecureArray::new(flatten_round_keys(&round_keys)),
            h_spec,
            h_powers: Aligned64(h_powers_arr),
            j0,
            ghash_state: [0u8; BLOCK_SIZE],
            partial: [0u8; BLOCK_SIZE],
            partial_len: 0,
            keystream_cache: [0u8; BLOCK_SIZE],
            keystream_pos: 0,
            aad_len: 0,
            ct_len: 0,
            counter: 2,
            state: GcmState::Init,
            plan,
            backend,
        })
    }

    fn reset(&mut self, iv: &[u8]) -> Result<()> {
        if iv.is_empty() {
            return Err(Error::InvalidInput);
        }
        // The execution plan is chosen once at `init` and held fixed across
        // resets; re-running selection per-message was considered and
        // rejected, see `DESIGN.md`.
        self.j0 = derive_j0(&self.h_spec, iv);
        self.ghash_state = [0u8; BLOCK_SIZE];
        self.partial = [0u8; BLOCK_SIZE];
        self.partial_len = 0;
        self.keystream_cache = [0u8; BLOCK_SIZE];
        self.keystream_pos = 0;
        self.aad_len = 0;
        self.ct_len = 0;
        self.counter = 2;
        self.state = GcmState::Init;
        Ok(())
    }

    fn aad_update(&mut self, aad: &[u8]) -> Result<()> {
        match self.state {
            GcmState::Init | GcmState::Aad => {}
            _ => return Err(Error::InvalidInput),
        }
        self.state = GcmState::Aad;
        self.aad_len = self.aad_len.checked_add(aad.len() as u64).ok_or(Error::InvalidInput)?;
        self.absorb_aad(aad);
        crate::observability::record_aad_update(aad.len());
        Ok(())
    }

    fn encrypt_update(&mut self, buf: &mut [u8]) -> Result<()> {
        self.enter_body(true)?;
        self.ct_len = self.ct_len.checked_add(buf.len() as u64).ok_or(Error::InvalidInput)?;
        if self.ct_len > MAX_CT_BYTES {
            return Err(Error::InvalidInput);
        }
        self.process_body(buf, true);
        crate::observability::record_encrypt_update(buf.len());
        Ok(())
    }

    fn decrypt_update(&mut self, buf: &mut [u8]) -> Result<()> {
        self.enter_body(false)?;
        self.ct_len = self.ct_len.checked_add(buf.len() as u64).ok_or(Error::InvalidInput)?;
        if self.ct_len > MAX_CT_BYTES {
            return Err(Error::InvalidInput);
        }
        self.process_body(buf, false);
        crate::observability::record_decrypt_update(buf.len());
        Ok(())
    }

    fn encrypt_final(&mut self) -> Result<[u8; TAG_SIZE]> {
        match self.state {
            GcmState::Init | GcmState::Aad | GcmState::Encrypting => {}
            _ => return Err(Error::InvalidInput),
        }
        Ok(self.finalize_tag())
    }

    fn decrypt_final(&mut self, tag: &[u8]) -> Result<()> {
        match self.state {
            GcmState::Init | GcmState::Aad | GcmState::Decrypting => {}
            _ => return Err(Error::InvalidInput),
        }
        let computed = self.finalize_tag();
        if !ct_tag_eq(&computed, tag) {
            crate::observability::record_auth_failure("aes-256-gcm");
            return Err(Error::AuthenticationFailed);
        }
        Ok(())
    }

    fn context_wipe(&mut self) {
        self.round_keys.zeroize();
        self.h_spec.zeroize();
        self.h_powers.zeroize();
        self.j0.zeroize();
        self.ghash_state.zeroize();
        self.partial.zeroize();
        self.partial_len = 0;
        self.keystream_cache.zeroize();
        self.keystream_pos = 0;
        self.aad_len = 0;
        self.ct_len = 0;
        self.counter = 0;
        self.state = GcmState::Final;
    }
}

impl Drop for Aes256GcmContext {
    fn drop(&mut self) {
        self.context_wipe();
    }
}

impl fmt::Debug for Aes256GcmContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aes256GcmContext")
            .field("state", &self.state)
            .field("backend", &self.backend)
            .field("plan", &self.plan)
            .field("aad_len", &self.aad_len)
            .field("ct_len", &self.ct_len)
            .field("counter", &self.counter)
            .field("round_keys", &"[REDACTED]")
            .field("h_spec", &"[REDACTED]")
            .finish()
    }
}
