//! ChaCha20-Poly1305 AEAD (RFC 8439): the streaming context and the
//! ChaCha20 stream cipher / Poly1305 MAC it is built from.
//!
//! This is the simpler secondary cipher. Unlike [`crate::gcm`], there is no
//! hardware-backend dispatch or batched fused kernel here — ChaCha20's
//! ARX design has no AES-NI/PMULL-style instruction to target, and ordinary
//! autovectorization of the scalar quarter-round loop gets most of the
//! available throughput anyway, so the context just drives the block
//! function and the MAC directly.
//!
//! Construction follows RFC 8439 §2.8: a one-time Poly1305 key is the first
//! 32 keystream bytes at block counter 0; ciphertext is produced starting
//! at block counter 1; the tag authenticates `aad || pad16(aad) ||
//! ciphertext || pad16(ciphertext) || len(aad) || len(ciphertext)` (the two
//! lengths as 8-byte little-endian words).

pub mod chacha20;
pub mod poly1305;

use core::fmt;

use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::params::{CHACHA_MAX_CT_BYTES, IV_SIZE, KEY_SIZE, TAG_SIZE};
use crate::secure_memory::SecureArray;
use crate::traits::AeadEngine;

use poly1305::Poly1305;

const CHACHA_BLOCK_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChaChaState {
    Init,
    Aad,
    Encrypting,
    Decrypting,
    Final,
}

fn pad_len(total: u64) -> usize {
    ((16 - (total % 16)) % 16) as usize
}

/// A streaming ChaCha20-Poly1305 encryption/decryption context.
///
/// Holds no pointers and performs no dynamic allocation beyond what
/// [`Poly1305`]'s own fixed-size accumulator needs (none).
pub struct ChaCha20Poly1305Context {
    key: SecureArray<KEY_SIZE>,
    nonce: [u8; IV_SIZE],
    mac: Option<Poly1305>,
    keystream_cache: [u8; CHACHA_BLOCK_SIZE],
    keystream_pos: usize,
    counter: u32,
    aad_len: u64,
    ct_len: u64,
    state: ChaChaState,
}

impl ChaCha20Poly1305Context {
    fn key_array(&self) -> [u8; KEY_SIZE] {
        let mut out = [0u8; KEY_SIZE];
        out.copy_from_slice(self.key.as_ref());
        out
    }

    fn derive_mac(&self) -> Poly1305 {
        let mut key = self.key_array();
        let block0 = chacha20::block(&key, 0, &self.nonce);
        crate::constant_time::ct_wipe(&mut key);
        let mut poly_key = [0u8; 32];
        poly_key.copy_from_slice(&block0[0..32]);
        Poly1305::new(&poly_key)
    }

    fn flush_aad_padding(&mut self) {
        let pad = pad_len(self.aad_len);
        if pad > 0 {
            if let Some(mac) = self.mac.as_mut() {
                mac.update(&[0u8; 16][..pad]);
            }
        }
    }

    fn enter_body(&mut self, encrypting: bool) -> Result<()> {
        match self.state {
            ChaChaState::Init | ChaChaState::Aad => {
                self.flush_aad_padding();
                self.state = if encrypting { ChaChaState::Encrypting } else { ChaChaState::Decrypting };
                Ok(())
            }
            ChaChaState::Encrypting if encrypting => Ok(()),
            ChaChaState::Decrypting if !encrypting => Ok(()),
            _ => Err(Error::InvalidInput),
        }
    }

    fn xor_with_keystream(&mut self, buf: &mut [u8]) {
        let mut key = self.key_array();
        let mut offset = 0;
        if self.keystream_pos == 0 {
            let aligned_len = (buf.len() / CHACHA_BLOCK_SIZE) * CHACHA_BLOCK_SIZE;
            if aligned_len > 0 {
                self.counter =
                    chacha20::apply_keystream(&key, &self.nonce, self.counter, &mut buf[..aligned_len]);
                offset = aligned_len;
            }
        }
        for byte in buf[offset..].iter_mut() {
            if self.keystream_pos == 0 {
                self.keystream_cache = chacha20::block(&key, self.counter, &self.nonce);
                self.counter = self.counter.wrapping_add(1);
            }
            *byte ^= self.keystream_cache[self.keystream_pos];
            self.keystream_pos += 1;
            if self.keystream_pos == CHACHA_BLOCK_SIZE {
                self.keystream_pos = 0;
            }
        }
        crate::constant_time::ct_wipe(&mut key);
    }

    fn process_body(&mut self, buf: &mut [u8], is_encrypt: bool) {
        if !is_encrypt {
            if let Some(mac) = self.mac.as_mut() {
                mac.update(buf);
            }
        }
        self.xor_with_keystream(buf);
        if is_encrypt {
            if let Some(mac) = self.mac.as_mut() {
                mac.update(buf);
            }
        }
    }

    fn finalize_tag(&mut self) -> [u8; TAG_SIZE] {
        let ct_pad = pad_len(self.ct_len);
        let mut mac = self.mac.take().expect("mac present until finalized");
        if ct_pad > 0 {
            mac.update(&[0u8; 16][..ct_pad]);
        }
        let mut len_block = [0u8; 16];
        len_block[0..8].copy_from_slice(&self.aad_len.to_le_bytes());
        len_block[8..16].copy_from_slice(&self.ct_len.to_le_bytes());
        mac.update(&len_block);
        self.state = ChaChaState::Final;
        mac.finish()
    }
}

impl AeadEngine for ChaCha20Poly1305Context {
    const KEY_SIZE: usize = KEY_SIZE;
    const TAG_SIZE: usize = TAG_SIZE;
    const IV_RECOMMENDED_SIZE: usize = IV_SIZE;

    fn init(key: &[u8], iv: &[u8]) -> Result<Self> {
        if key.len() != KEY_SIZE || iv.len() != IV_SIZE {
            return Err(Error::InvalidInput);
        }
        let mut key_arr = [0u8; KEY_SIZE];
        key_arr.copy_from_slice(key);
        let mut nonce = [0u8; IV_SIZE];
        nonce.copy_from_slice(iv);

        let mut ctx = ChaCha20Poly1305Context {
            key: SecureArray::new(key_arr),
            nonce,
            mac: None,
            keystream_cache: [0u8; CHACHA_BLOCK_SIZE],
            keystream_pos: 0,
            counter: 1,
            aad_len: 0,
            ct_len: 0,
            state: ChaChaState::Init,
        };
        ctx.mac = Some(ctx.derive_mac());
        crate::observability::record_init("chacha20-poly1305");
        Ok(ctx)
    }

    fn reset(&mut self, iv: &[u8]) -> Result<()> {
        if iv.len() != IV_SIZE {
            return Err(Error::InvalidInput);
        }
        self.nonce.copy_from_slice(iv);
        self.keystream_cache = [0u8; CHACHA_BLOCK_SIZE];
        self.keystream_pos = 0;
        self.counter = 1;
        self.aad_len = 0;
        self.ct_len = 0;
        self.state = ChaChaState::Init;
        self.mac = Some(self.derive_mac());
        Ok(())
    }

    fn aad_update(&mut self, aad: &[u8]) -> Result<()> {
        match self.state {
            ChaChaState::Init | ChaChaState::Aad => {}
            _ => return Err(Error::InvalidInput),
        }
        self.state = ChaChaState::Aad;
        self.aad_len = self.aad_len.checked_add(aad.len() as u64).ok_or(Error::InvalidInput)?;
        if let Some(mac) = self.mac.as_mut() {
            mac.update(aad);
        }
        crate::observability::record_aad_update(aad.len());
        Ok(())
    }

    fn encrypt_update(&mut self, buf: &mut [u8]) -> Result<()> {
        self.enter_body(true)?;
        self.ct_len = self.ct_len.checked_add(buf.len() as u64).ok_or(Error::InvalidInput)?;
        if self.ct_len > CHACHA_MAX_CT_BYTES {
            return Err(Error::InvalidInput);
        }
        self.process_body(buf, true);
        crate::observability::record_encrypt_update(buf.len());
        Ok(())
    }

    fn decrypt_update(&mut self, buf: &mut [u8]) -> Result<()> {
        self.enter_body(false)?;
        self.ct_len = self.ct_len.checked_add(buf.len() as u64).ok_or(Error::InvalidInput)?;
        if self.ct_len > CHACHA_MAX_CT_BYTES {
            return Err(Error::InvalidInput);
        }
        self.process_body(buf, false);
        crate::observability::record_decrypt_update(buf.len());
        Ok(())
    }

    fn encrypt_final(&mut self) -> Result<[u8; TAG_SIZE]> {
        match self.state {
            ChaChaState::Init | ChaChaState::Aad | ChaChaState::Encrypting => {}
            _ => return Err(Error::InvalidInput),
        }
        Ok(self.finalize_tag())
    }

    fn decrypt_final(&mut self, tag: &[u8]) -> Result<()> {
        match self.state {
            ChaChaState::Init | ChaChaState::Aad | ChaChaState::Decrypting => {}
            _ => return Err(Error::InvalidInput),
        }
        let computed = self.finalize_tag();
        if !crate::constant_time::ct_tag_eq(&computed, tag) {
            crate::observability::record_auth_failure("chacha20-poly1305");
            return Err(Error::AuthenticationFailed);
        }
        Ok(())
    }

    fn context_wipe(&mut self) {
        self.key.zeroize();
        self.nonce = [0u8; IV_SIZE];
        self.mac = None;
        self.keystream_cache = [0u8; CHACHA_BLOCK_SIZE];
        self.keystream_pos = 0;
        self.aad_len = 0;
        self.ct_len = 0;
        self.counter = 0;
        self.state = ChaChaState::Final;
    }
}

impl Drop for ChaCha20Poly1305Context {
    fn drop(&mut self) {
        self.context_wipe();
    }
}

impl fmt::Debug for ChaCha20Poly1305Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaCha20Poly1305Context")
            .field("state", &self.state)
            .field("aad_len", &self.aad_len)
            .field("ct_len", &self.ct_len)
            .field("counter", &self.counter)
            .field("key", &"[REDACTED]")
            .finish()
    }
}
