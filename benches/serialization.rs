use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_sheet::{header, sheet_record, to_grid, Decoder, Encoder, ScratchPool};

sheet_record! {
    #[derive(Serialize, Deserialize, Clone)]
    struct Product {
        sku: String => "SKU",
        name: String,
        price: f64,
        quantity: u32,
    }

    #[derive(Serialize, Deserialize, Clone)]
    struct Metadata {
        created: i64 => "datetime",
        version: u32,
    }

    #[derive(Serialize, Deserialize, Clone)]
    struct Catalog {
        id: u32 => "ID",
        metadata: Metadata,
        products: Vec<Product>,
        tags: Vec<String> => "csv",
    }
}

fn catalog(size: usize) -> Catalog {
    Catalog {
        id: 1,
        metadata: Metadata {
            created: 1_700_000_000,
            version: 3,
        },
        products: (0..size)
            .map(|i| Product {
                sku: format!("SKU-{:05}", i),
                name: format!("Product {}", i),
                price: 9.99 + i as f64,
                quantity: i as u32,
            })
            .collect(),
        tags: vec!["sale".to_string(), "new".to_string()],
    }
}

fn benchmark_encode_simple(c: &mut Criterion) {
    let value = catalog(1);
    c.bench_function("encode_simple_record", |b| {
        b.iter(|| to_grid(black_box(&value)))
    });
}

fn benchmark_encode_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_lists");
    let encoder = Encoder::new();
    for size in [10, 100, 1000].iter() {
        let value = catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            b.iter(|| encoder.encode(black_box(value)))
        });
    }
    group.finish();
}

fn benchmark_decode_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_lists");
    let format = header::<Catalog>(false).unwrap().format;
    let decoder = Decoder::from_format(format);
    for size in [10, 100, 1000].iter() {
        let text = to_grid(&catalog(*size)).unwrap().to_text_grid();
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| {
                let _decoded: Catalog = decoder.decode(black_box(text)).unwrap();
            })
        });
    }
    group.finish();
}

fn benchmark_header(c: &mut Criterion) {
    c.bench_function("project_header", |b| b.iter(|| header::<Catalog>(black_box(true))));
}

fn benchmark_roundtrip(c: &mut Criterion) {
    let pool = ScratchPool::new();
    let encoder = Encoder::new().with_pool(pool.clone());
    let decoder =
        Decoder::from_format(header::<Catalog>(false).unwrap().format).with_pool(pool);
    let value = catalog(20);

    c.bench_function("roundtrip_shared_pool", |b| {
        b.iter(|| {
            let text = encoder.encode(black_box(&value)).unwrap().to_text_grid();
            let _decoded: Catalog = decoder.decode(black_box(&text)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_encode_simple,
    benchmark_encode_lists,
    benchmark_decode_lists,
    benchmark_header,
    benchmark_roundtrip
);
criterion_main!(benches);
