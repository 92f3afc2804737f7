use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stylematch_core::{CatalogEntry, EmbeddingVector};
use stylematch_vecdb::{CatalogIndex, IndexedCatalog};

const DIMENSION: usize = 512;

/// Deterministic pseudo-random unit vector.
fn vector(seed: usize) -> EmbeddingVector {
    let mut state = (seed as u64)
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    let values = (0..DIMENSION)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32 / u32::MAX as f32) - 0.25
        })
        .collect();
    EmbeddingVector::normalized(values).unwrap()
}

fn catalog(size: usize) -> IndexedCatalog {
    let mut index = CatalogIndex::new(DIMENSION);
    let mut id_map = Vec::with_capacity(size);
    for i in 0..size {
        index.add(&vector(i)).unwrap();
        id_map.push(CatalogEntry::new(format!("P{}", i / 4), format!("{i}.jpg")));
    }
    IndexedCatalog::new(index, id_map, "bench").unwrap()
}

fn bench_nearest(c: &mut Criterion) {
    let query = vector(usize::MAX);
    let mut group = c.benchmark_group("nearest");
    for size in [100, 1_000, 10_000] {
        let catalog = catalog(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| catalog.index().nearest(black_box(&query)).unwrap());
        });
    }
    group.finish();
}

fn bench_search_top_k(c: &mut Criterion) {
    let catalog = catalog(1_000);
    let query = vector(usize::MAX);

    c.bench_function("search_top_10_of_1000", |b| {
        b.iter(|| catalog.index().search(black_box(&query), 10).unwrap());
    });
}

criterion_group!(benches, bench_nearest, bench_search_top_k);
criterion_main!(benches);
