use criterion::{criterion_group, criterion_main, Criterion};
use dice_keygen::expansion::{ExpansionParams, ExpansionStream, ExpansionVariant};
use std::hint::black_box;

fn bench_build(c: &mut Criterion) {
    let seed = b"5eaa19f3f53987a5d3527bf5d77039571e3a866cfb4f168d638201feee068074";

    c.bench_function("xof_build_default", |b| {
        b.iter(|| ExpansionStream::build(black_box(seed), ExpansionVariant::Xof))
    });

    let kdf = ExpansionParams {
        variant: ExpansionVariant::Kdf,
        buffer_len: 64 * 1024,
        ..Default::default()
    };
    let mut group = c.benchmark_group("kdf");
    group.sample_size(10);
    group.bench_function("kdf_build_64k", |b| {
        b.iter(|| ExpansionStream::with_params(black_box(seed), &kdf))
    });
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    c.bench_function("read_4096_in_32_byte_chunks", |b| {
        b.iter_batched(
            || {
                ExpansionStream::with_params(
                    b"seed",
                    &ExpansionParams {
                        buffer_len: 4096,
                        ..Default::default()
                    },
                )
                .unwrap()
            },
            |mut stream| {
                while stream.remaining() >= 32 {
                    black_box(stream.read(32usize).unwrap());
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_build, bench_read);
criterion_main!(benches);
