use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use redsys_signer::crypto::{BlockCipher, Des, TripleDes};
use redsys_signer::services::FixedOrderId;
use redsys_signer::{
    BatchSigner, KeyDerivation, MerchantConfig, OrderId, PaymentRequest, PaymentSignatureService,
};

const CONFIG: &str = r#"
    merchant_code = "999008881"
    merchant_url = "https://shop.example.com/redsys/notification"
    url_ok = "https://shop.example.com/payment-success"
    url_ko = "https://shop.example.com/payment-cancelled"
    secret_key = "sq7HjrUOBfKmC576ILgskD5srU870gJ7"
"#;

fn request() -> PaymentRequest {
    PaymentRequest {
        service: "Web Development".into(),
        price: "750€".into(),
        name: "Juan Pérez".into(),
        email: "juan@test.com".into(),
        phone: None,
    }
}

fn service(mode: KeyDerivation) -> PaymentSignatureService {
    let mut config = MerchantConfig::from_toml_str(CONFIG).unwrap();
    config.key_derivation = mode;
    PaymentSignatureService::new(config, Arc::new(FixedOrderId(OrderId::from_sequence(1))))
}

fn bench_ciphers(c: &mut Criterion) {
    let des = Des::new(&[0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1]);
    let tdes = TripleDes::new(&[0x5a; 24]);
    let block = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];

    let mut group = c.benchmark_group("block");
    group.throughput(Throughput::Bytes(8));
    group.bench_function("des", |b| b.iter(|| des.encrypt_block(black_box(block))));
    group.bench_function("3des", |b| b.iter(|| tdes.encrypt_block(black_box(block))));
    group.finish();

    c.bench_function("des_key_schedule", |b| {
        b.iter(|| Des::new(black_box(&[0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1])))
    });
}

fn bench_sign(c: &mut Criterion) {
    let req = request();
    let mut group = c.benchmark_group("sign");
    for mode in [KeyDerivation::SingleBlock, KeyDerivation::FullOrder] {
        let svc = service(mode);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{mode:?}")), &req, |b, req| {
            b.iter(|| svc.sign(black_box(req)).unwrap())
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let signer = BatchSigner::new(Arc::new(service(KeyDerivation::SingleBlock)));
    let mut group = c.benchmark_group("batch");
    for size in [16usize, 256] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| signer.sign_all(vec![request(); size]).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ciphers, bench_sign, bench_batch);
criterion_main!(benches);
