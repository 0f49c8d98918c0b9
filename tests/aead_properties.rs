//! Properties that both AEAD engines must satisfy identically, checked
//! generically against the `AeadEngine` trait so the two ciphers can't
//! silently drift apart in behavior.

use proptest::prelude::*;
use soliton_aead::chacha::ChaCha20Poly1305Context;
use soliton_aead::gcm::Aes256GcmContext;
use soliton_aead::traits::AeadEngine;

fn round_trip_identity<E: AeadEngine>(key: &[u8], iv: &[u8], aad: &[u8], plaintext: &[u8]) {
    let mut buf = plaintext.to_vec();
    let mut ctx = E::init(key, iv).unwrap();
    ctx.aad_update(aad).unwrap();
    ctx.encrypt_update(&mut buf).unwrap();
    let tag = ctx.encrypt_final().unwrap();
    assert_ne!(buf, plaintext, "ciphertext must differ from plaintext for non-empty input");

    let mut ctx = E::init(key, iv).unwrap();
    ctx.aad_update(aad).unwrap();
    ctx.decrypt_update(&mut buf).unwrap();
    ctx.decrypt_final(&tag).unwrap();
    assert_eq!(buf, plaintext);
}

fn streaming_matches_one_shot<E: AeadEngine>(key: &[u8], iv: &[u8], plaintext: &[u8]) {
    let mut one_shot = plaintext.to_vec();
    let mut ctx = E::init(key, iv).unwrap();
    ctx.encrypt_update(&mut one_shot).unwrap();
    let one_shot_tag = ctx.encrypt_final().unwrap();

    let mut streamed = plaintext.to_vec();
    let mut ctx = E::init(key, iv).unwrap();
    for chunk in streamed.chunks_mut(7) {
        ctx.encrypt_update(chunk).unwrap();
    }
    let streamed_tag = ctx.encrypt_final().unwrap();

    assert_eq!(one_shot, streamed, "ciphertext must not depend on call chunking");
    assert_eq!(one_shot_tag, streamed_tag, "tag must not depend on call chunking");
}

fn streaming_matches_one_shot_with_chunks<E: AeadEngine>(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    chunk_sizes: &[usize],
) {
    let mut one_shot = plaintext.to_vec();
    let mut ctx = E::init(key, iv).unwrap();
    ctx.encrypt_update(&mut one_shot).unwrap();
    let one_shot_tag = ctx.encrypt_final().unwrap();

    let mut streamed = plaintext.to_vec();
    let mut ctx = E::init(key, iv).unwrap();
    let mut offset = 0;
    for &size in chunk_sizes {
        if offset >= streamed.len() {
            break;
        }
        let end = (offset + size).min(streamed.len());
        ctx.encrypt_update(&mut streamed[offset..end]).unwrap();
        offset = end;
    }
    if offset < streamed.len() {
        ctx.encrypt_update(&mut streamed[offset..]).unwrap();
    }
    let streamed_tag = ctx.encrypt_final().unwrap();

    assert_eq!(one_shot, streamed, "ciphertext must not depend on call chunking");
    assert_eq!(one_shot_tag, streamed_tag, "tag must not depend on call chunking");
}

fn reset_reuses_key_schedule<E: AeadEngine>(key: &[u8], iv_a: &[u8], iv_b: &[u8]) {
    let mut buf_a = *b"first message....";
    let mut ctx = E::init(key, iv_a).unwrap();
    ctx.encrypt_update(&mut buf_a).unwrap();
    let tag_a = ctx.encrypt_final().unwrap();

    ctx.reset(iv_b).unwrap();
    let mut buf_b = *b"first message....";
    ctx.encrypt_update(&mut buf_b).unwrap();
    let tag_b = ctx.encrypt_final().unwrap();

    let mut fresh_ctx = E::init(key, iv_b).unwrap();
    let mut buf_fresh = *b"first message....";
    fresh_ctx.encrypt_update(&mut buf_fresh).unwrap();
    let tag_fresh = fresh_ctx.encrypt_final().unwrap();

    assert_eq!(buf_b, buf_fresh);
    assert_eq!(tag_b, tag_fresh);
    assert_ne!(tag_a, tag_b, "different IVs must produce different tags");
}

#[test]
fn gcm_satisfies_round_trip_identity() {
    round_trip_identity::<Aes256GcmContext>(&[0x07u8; 32], &[0x08u8; 12], b"aad", b"plaintext bytes!");
    round_trip_identity::<Aes256GcmContext>(&[0x07u8; 32], &[0x08u8; 12], b"", b"");
}

#[test]
fn chacha_satisfies_round_trip_identity() {
    round_trip_identity::<ChaCha20Poly1305Context>(&[0x07u8; 32], &[0x08u8; 12], b"aad", b"plaintext bytes!");
    round_trip_identity::<ChaCha20Poly1305Context>(&[0x07u8; 32], &[0x08u8; 12], b"", b"");
}

#[test]
fn gcm_streaming_matches_one_shot() {
    let plaintext: Vec<u8> = (0u8..200).collect();
    streaming_matches_one_shot::<Aes256GcmContext>(&[0x11u8; 32], &[0x22u8; 12], &plaintext);
}

#[test]
fn chacha_streaming_matches_one_shot() {
    let plaintext: Vec<u8> = (0u8..200).collect();
    streaming_matches_one_shot::<ChaCha20Poly1305Context>(&[0x11u8; 32], &[0x22u8; 12], &plaintext);
}

#[test]
fn gcm_reset_reuses_key_schedule() {
    reset_reuses_key_schedule::<Aes256GcmContext>(&[0x33u8; 32], &[0x01u8; 12], &[0x02u8; 12]);
}

#[test]
fn chacha_reset_reuses_key_schedule() {
    reset_reuses_key_schedule::<ChaCha20Poly1305Context>(&[0x33u8; 32], &[0x01u8; 12], &[0x02u8; 12]);
}

#[test]
fn both_engines_report_consistent_size_constants() {
    assert_eq!(Aes256GcmContext::KEY_SIZE, 32);
    assert_eq!(Aes256GcmContext::TAG_SIZE, 16);
    assert_eq!(ChaCha20Poly1305Context::KEY_SIZE, 32);
    assert_eq!(ChaCha20Poly1305Context::TAG_SIZE, 16);
}

proptest! {
    #[test]
    fn gcm_streaming_matches_one_shot_for_arbitrary_chunking(
        plaintext in proptest::collection::vec(any::<u8>(), 0..500),
        chunk_sizes in proptest::collection::vec(1usize..37, 1..25),
    ) {
        streaming_matches_one_shot_with_chunks::<Aes256GcmContext>(
            &[0x44u8; 32], &[0x55u8; 12], &plaintext, &chunk_sizes,
        );
    }

    #[test]
    fn chacha_streaming_matches_one_shot_for_arbitrary_chunking(
        plaintext in proptest::collection::vec(any::<u8>(), 0..500),
        chunk_sizes in proptest::collection::vec(1usize..37, 1..25),
    ) {
        streaming_matches_one_shot_with_chunks::<ChaCha20Poly1305Context>(
            &[0x44u8; 32], &[0x55u8; 12], &plaintext, &chunk_sizes,
        );
    }
}
