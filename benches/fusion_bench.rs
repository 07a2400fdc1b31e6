use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use legisearch::search::{Candidate, reciprocal_rank_fusion};
use legisearch::vector::{DistanceMetric, FlatVectorIndex};
use rand::Rng;

fn generate_random_vector(dim: usize) -> Vec<f32> {
    let mut rng = rand::rng();
    (0..dim).map(|_| rng.random::<f32>()).collect()
}

fn generate_candidates(count: usize, id_space: u64) -> Vec<Candidate> {
    let mut rng = rand::rng();
    (0..count)
        .map(|idx| Candidate {
            doc_id: rng.random_range(0..id_space),
            rank: idx + 1,
            score: 0.0,
        })
        .collect()
}

fn bench_rrf(c: &mut Criterion) {
    let mut group = c.benchmark_group("RRF Fusion");

    for count in [100usize, 1000] {
        let semantic = generate_candidates(count, count as u64 * 2);
        let lexical = generate_candidates(count, count as u64 * 2);

        group.throughput(Throughput::Elements(count as u64 * 2));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| reciprocal_rank_fusion(&semantic, &lexical, 60.0))
        });
    }
    group.finish();
}

fn bench_flat_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("Flat KNN");
    group.sample_size(20);
    let dim = 384;

    for count in [1000usize, 10000] {
        let mut index = FlatVectorIndex::new(dim, DistanceMetric::Cosine);
        for id in 0..count as u64 {
            index.insert(id, generate_random_vector(dim)).unwrap();
        }
        let query = generate_random_vector(dim);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| index.knn(&query, 100).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rrf, bench_flat_knn);
criterion_main!(benches);
