use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use structstream::prelude::*;

const N: usize = 100_000;

fn gen_fields() -> Vec<(usize, u64)> {
    let mut r = SmallRng::seed_from_u64(0);
    (0..N)
        .map(|_| {
            let n = r.random_range(1..=32);
            (n, r.random::<u64>() & ((1 << n) - 1))
        })
        .collect()
}

fn bench_order<E: Endianness>(c: &mut Criterion, name: &str, fields: &[(usize, u64)]) {
    c.bench_function(&format!("write_bits<{}>", name), |b| {
        b.iter(|| {
            let mut io = Stream::with_size(N * 4);
            for &(n, value) in fields {
                io.write_bits_int::<E>(n, value).unwrap();
            }
            black_box(io.pos().unwrap())
        })
    });

    let mut io = Stream::with_size(N * 4);
    for &(n, value) in fields {
        io.write_bits_int::<E>(n, value).unwrap();
    }
    let data = io.to_byte_array().unwrap();

    c.bench_function(&format!("read_bits<{}>", name), |b| {
        b.iter(|| {
            let mut io = Stream::from_bytes(&data);
            for &(n, _) in fields {
                black_box(io.read_bits_int::<E>(n).unwrap());
            }
        })
    });
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let fields = gen_fields();
    bench_order::<LE>(c, "LE", &fields);
    bench_order::<BE>(c, "BE", &fields);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
