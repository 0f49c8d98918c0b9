use criterion::{black_box, criterion_group, criterion_main, Criterion};
use soliton_aead::chacha::ChaCha20Poly1305Context;
use soliton_aead::gcm::Aes256GcmContext;
use soliton_aead::traits::AeadEngine;

const KEY: [u8; 32] = [0x11; 32];
const IV: [u8; 12] = [0x22; 12];
const SIZES: [usize; 3] = [64, 1500, 16 * 1024];

fn gcm_encrypt_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("gcm_encrypt");
    for &size in &SIZES {
        group.throughput(criterion::Throughput::Bytes(size as u64));
        group.bench_function(format!("{size}B"), |b| {
            let mut buf = vec![0x42u8; size];
            b.iter(|| {
                let mut ctx = Aes256GcmContext::init(&KEY, &IV).unwrap();
                ctx.encrypt_update(black_box(&mut buf)).unwrap();
                black_box(ctx.encrypt_final().unwrap())
            })
        });
    }
    group.finish();
}

fn gcm_decrypt_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("gcm_decrypt");
    for &size in &SIZES {
        group.throughput(criterion::Throughput::Bytes(size as u64));
        group.bench_function(format!("{size}B"), |b| {
            let mut ct = vec![0x42u8; size];
            let mut ctx = Aes256GcmContext::init(&KEY, &IV).unwrap();
            ctx.encrypt_update(&mut ct).unwrap();
            let tag = ctx.encrypt_final().unwrap();
            b.iter(|| {
                let mut buf = ct.clone();
                let mut ctx = Aes256GcmContext::init(&KEY, &IV).unwrap();
                ctx.decrypt_update(black_box(&mut buf)).unwrap();
                ctx.decrypt_final(&tag).unwrap();
            })
        });
    }
    group.finish();
}

fn chacha_encrypt_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("chacha_encrypt");
    for &size in &SIZES {
        group.throughput(criterion::Throughput::Bytes(size as u64));
        group.bench_function(format!("{size}B"), |b| {
            let mut buf = vec![0x42u8; size];
            b.iter(|| {
                let mut ctx = ChaCha20Poly1305Context::init(&KEY, &IV).unwrap();
                ctx.encrypt_update(black_box(&mut buf)).unwrap();
                black_box(ctx.encrypt_final().unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    gcm_encrypt_throughput,
    gcm_decrypt_throughput,
    chacha_encrypt_throughput
);
criterion_main!(benches);
