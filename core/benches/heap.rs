use std::collections::{BTreeMap, BinaryHeap};

use criterion::{criterion_group, criterion_main, Criterion, ParameterizedBenchmark};
use lazy_static::lazy_static;
use rand::Rng;

use rbheap::datastruct::PriorityQueue;

fn make_data(size: usize) -> Vec<i64> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen_range(0, size as i64)).collect()
}

lazy_static! {
    static ref DATAS: BTreeMap<usize, Vec<i64>> = {
        let mut datas = BTreeMap::new();
        for i in &[10, 100, 1_000, 10_000] {
            datas.insert(*i, make_data(*i));
        }
        datas
    };
}

fn sizes() -> Vec<usize> {
    DATAS.keys().cloned().collect()
}

fn push_pop(c: &mut Criterion) {
    c.bench(
        "add then pop",
        ParameterizedBenchmark::new(
            "priority queue",
            |b, s| {
                b.iter(|| {
                    let mut pq = PriorityQueue::new();
                    for v in &DATAS[s] {
                        pq.add(*v);
                    }
                    while pq.pop().is_some() {}
                });
            },
            sizes(),
        )
        .with_function("binary heap", |b, s| {
            b.iter(|| {
                let mut bh = BinaryHeap::new();
                for v in &DATAS[s] {
                    bh.push(*v);
                }
                while bh.pop().is_some() {}
            });
        }),
    );
    c.bench(
        "heapify",
        ParameterizedBenchmark::new(
            "priority queue",
            |b, s| b.iter(|| PriorityQueue::from_vec(DATAS[s].clone())),
            sizes(),
        )
        .with_function("binary heap", |b, s| {
            b.iter(|| BinaryHeap::from(DATAS[s].clone()))
        }),
    );
}

criterion_group!(benches, push_pop);
criterion_main!(benches);
