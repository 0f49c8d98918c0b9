//! RFC 8439 test vectors and round-trip checks for ChaCha20-Poly1305,
//! exercised through the public `AeadEngine` surface.

use soliton_aead::chacha::chacha20;
use soliton_aead::chacha::ChaCha20Poly1305Context;
use soliton_aead::traits::AeadEngine;

/// RFC 8439 section 2.3.2: the ChaCha20 block function keystream for
/// counter 1.
#[test]
fn rfc8439_block_function_keystream() {
    let mut key = [0u8; 32];
    for (i, b) in key.iter_mut().enumerate() {
        *b = i as u8;
    }
    let nonce: [u8; 12] = [0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x4a, 0x00, 0x00, 0x00, 0x00];

    let block = chacha20::block(&key, 1, &nonce);
    assert_eq!(block[0], 0x10);
    assert_eq!(block[1], 0xf1);
    assert_eq!(block[2], 0xe7);
    assert_eq!(block[3], 0xe4);
}

#[test]
fn encrypt_decrypt_round_trip_with_aad() {
    let key = [0x42u8; 32];
    let nonce = [0x24u8; 12];
    let aad = b"header bytes";
    let plaintext = b"ChaCha20-Poly1305 round trip across a multi-block message payload.";

    let mut buf = *plaintext;
    let mut ctx = ChaCha20Poly1305Context::init(&key, &nonce).unwrap();
    ctx.aad_update(aad).unwrap();
    ctx.encrypt_update(&mut buf).unwrap();
    let tag = ctx.encrypt_final().unwrap();

    let mut ctx = ChaCha20Poly1305Context::init(&key, &nonce).unwrap();
    ctx.aad_update(aad).unwrap();
    ctx.decrypt_update(&mut buf).unwrap();
    ctx.decrypt_final(&tag).unwrap();
    assert_eq!(&buf, plaintext);
}

#[test]
fn bit_flip_in_ciphertext_is_detected() {
    let key = [0x99u8; 32];
    let nonce = [0x01u8; 12];
    let mut buf = *b"authenticate me please";

    let mut ctx = ChaCha20Poly1305Context::init(&key, &nonce).unwrap();
    ctx.encrypt_update(&mut buf).unwrap();
    let tag = ctx.encrypt_final().unwrap();

    buf[0] ^= 0x80;
    let mut ctx = ChaCha20Poly1305Context::init(&key, &nonce).unwrap();
    ctx.decrypt_update(&mut buf).unwrap();
    assert!(ctx.decrypt_final(&tag).is_err());
}
