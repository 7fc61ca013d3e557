// Signing & recovery benchmarks for the account library.
//
// Covers secp256k1 key generation, digest signing and recovery, the full
// JSON-to-wire signing path, decoding, and recovery over batches of signed
// transactions.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use cfx_account::crypto::{keccak, secp, PrivateKey};
use cfx_account::transaction::decode;
use cfx_account::Account;

const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

fn transfer(nonce: u64) -> serde_json::Value {
    json!({
        "nonce": nonce,
        "chainId": 1029,
        "to": "0x1c7536e3605d9c16a7a3d7b1898e529396a65c23",
        "value": "1000000000000000000",
        "gas": 21000,
        "gasPrice": 1000000000,
        "storageLimit": 0,
        "epochHeight": 100000,
    })
}

fn bench_key_generation(c: &mut Criterion) {
    c.bench_function("secp256k1/key_generate", |b| {
        b.iter(PrivateKey::random);
    });
}

fn bench_sign_digest(c: &mut Criterion) {
    let key = PrivateKey::from_hex(KEY).unwrap();
    let digest = keccak(b"transfer 1 CFX; nonce=42");

    c.bench_function("secp256k1/sign_digest", |b| {
        b.iter(|| secp::sign_digest(&digest, &key).unwrap());
    });
}

fn bench_recover_digest(c: &mut Criterion) {
    let key = PrivateKey::from_hex(KEY).unwrap();
    let digest = keccak(b"transfer 1 CFX; nonce=42");
    let signature = secp::sign_digest(&digest, &key).unwrap();

    c.bench_function("secp256k1/recover_address", |b| {
        b.iter(|| secp::recover_address(&digest, &signature).unwrap());
    });
}

fn bench_sign_transaction(c: &mut Criterion) {
    let account = Account::new().from_key(KEY, None).unwrap();
    let request = transfer(42);

    c.bench_function("transaction/sign_native", |b| {
        b.iter(|| account.sign_transaction(&request).unwrap());
    });
}

fn bench_decode(c: &mut Criterion) {
    let signed = Account::new().sign_transaction(&transfer(42), KEY).unwrap();

    c.bench_function("transaction/decode_native", |b| {
        b.iter(|| decode(&signed.raw_transaction).unwrap());
    });
}

fn bench_batch_recover(c: &mut Criterion) {
    let facade = Account::new();
    let account = facade.from_key(KEY, None).unwrap();
    let mut group = c.benchmark_group("transaction/batch_recover");

    for size in [10, 50, 100] {
        let raws: Vec<_> = (0..size)
            .map(|nonce| account.sign_transaction(&transfer(nonce)).unwrap().raw_transaction)
            .collect();

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raws, |b, raws| {
            b.iter(|| {
                for raw in raws {
                    facade.recover_transaction(raw).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_key_generation,
    bench_sign_digest,
    bench_recover_digest,
    bench_sign_transaction,
    bench_decode,
    bench_batch_recover,
);
criterion_main!(benches);
