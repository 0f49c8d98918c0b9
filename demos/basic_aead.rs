//! Minimal end-to-end usage of both AEAD engines.
//!
//! Run with `cargo run --example basic_aead`.

use soliton_aead::chacha::ChaCha20Poly1305Context;
use soliton_aead::gcm::Aes256GcmContext;
use soliton_aead::traits::AeadEngine;

fn gcm_round_trip() {
    let key = [0x11u8; 32];
    let iv = [0x22u8; 12];
    let aad = b"session-id:42";

    let mut ctx = Aes256GcmContext::init(&key, &iv).expect("key/iv sizes are valid");
    ctx.aad_update(aad).unwrap();
    let mut buf = *b"the quick brown fox jumps over the lazy dog!!!!";
    ctx.encrypt_update(&mut buf).unwrap();
    let tag = ctx.encrypt_final().unwrap();
    println!("gcm ciphertext: {}", hex::encode(buf));
    println!("gcm tag:        {}", hex::encode(tag));

    let mut ctx = Aes256GcmContext::init(&key, &iv).unwrap();
    ctx.aad_update(aad).unwrap();
    ctx.decrypt_update(&mut buf).unwrap();
    ctx.decrypt_final(&tag).expect("tag must verify");
    println!("gcm recovered:  {}", String::from_utf8_lossy(&buf));
}

fn chacha_round_trip() {
    let key = [0x33u8; 32];
    let nonce = [0x44u8; 12];
    let aad = b"session-id:43";

    let mut ctx = ChaCha20Poly1305Context::init(&key, &nonce).expect("key/nonce sizes are valid");
    ctx.aad_update(aad).unwrap();
    let mut buf = *b"the quick brown fox jumps over the lazy dog!!!!";
    ctx.encrypt_update(&mut buf).unwrap();
    let tag = ctx.encrypt_final().unwrap();
    println!("chacha ciphertext: {}", hex::encode(buf));
    println!("chacha tag:        {}", hex::encode(tag));

    let mut ctx = ChaCha20Poly1305Context::init(&key, &nonce).unwrap();
    ctx.aad_update(aad).unwrap();
    ctx.decrypt_update(&mut buf).unwrap();
    ctx.decrypt_final(&tag).expect("tag must verify");
    println!("chacha recovered:  {}", String::from_utf8_lossy(&buf));
}

fn main() {
    gcm_round_trip();
    chacha_round_trip();
}
