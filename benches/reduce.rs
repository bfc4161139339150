//! Benchmarks for transitive reduction and cover relinking.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hasse_lexicon::engine::{Lexicon, MutationEngine};
use hasse_lexicon::entry::{CoverSide, Entry, WordId};
use hasse_lexicon::graph::reduce::reduce_all;
use hasse_lexicon::store::NodeStore;

/// `layers` layers of `width` entries. Each entry links to a few entries of
/// the next layer and, occasionally, to one two layers down, which leaves
/// shortcut edges for the reducer to find.
fn layered_dag(layers: u32, width: u32, seed: u64) -> NodeStore {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = NodeStore::new();
    for _ in 0..layers * width {
        let id = store.allocate().unwrap();
        store.put(Entry::blank(id)).unwrap();
    }
    let at = |layer: u32, i: u32| WordId::new(layer * width + i);

    for layer in 0..layers - 1 {
        for i in 0..width {
            for _ in 0..3 {
                let j = rng.gen_range(0..width);
                store.link(at(layer, i), at(layer + 1, j)).unwrap();
            }
            if layer + 2 < layers && rng.gen_bool(0.3) {
                let j = rng.gen_range(0..width);
                store.link(at(layer, i), at(layer + 2, j)).unwrap();
            }
        }
    }
    store
}

fn bench_reduce_all(c: &mut Criterion) {
    let store = layered_dag(20, 50, 0);

    c.bench_function("reduce_all_20x50", |bench| {
        bench.iter_batched(
            || store.clone(),
            |mut s| black_box(reduce_all(&mut s)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_relink(c: &mut Criterion) {
    let engine = MutationEngine::default();
    let mut store = layered_dag(20, 50, 1);
    reduce_all(&mut store);
    let lex = Lexicon::from_store(store);

    // Move a mid-layer entry under two entries near the top.
    let target = WordId::new(10 * 50 + 7);
    let parents = [WordId::new(50 + 3), WordId::new(2 * 50 + 9)];

    c.bench_function("relink_upper_20x50", |bench| {
        bench.iter(|| {
            black_box(
                engine
                    .relink_covers(&lex, target, CoverSide::Upper, parents)
                    .ok(),
            )
        })
    });
}

fn bench_add_word(c: &mut Criterion) {
    let engine = MutationEngine::default();
    let lex = Lexicon::from_store(layered_dag(20, 50, 2));

    c.bench_function("add_word_1k", |bench| {
        bench.iter(|| black_box(engine.add_word(&lex, WordId::new(500)).unwrap()))
    });
}

criterion_group!(benches, bench_reduce_all, bench_relink, bench_add_word);
criterion_main!(benches);
