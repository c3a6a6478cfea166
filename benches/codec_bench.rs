/// Codec benchmarks
/// Measures bit packing, full encode and local artifact creation
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use infilename::application::dto::CodecSettings;
use infilename::application::pipeline::EncodePipeline;
use infilename::application::ports::ArtifactStore;
use infilename::domain::value_objects::ChunkBits;
use infilename::domain::{Alphabet, BitPacker};
use infilename::infrastructure::compression::ZlibCompressor;
use infilename::infrastructure::storage::LocalFilesystemStore;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;

fn sample(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(42).fill_bytes(&mut data);
    data
}

fn bit_packer_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_packer");
    let data = sample(256 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for bits in [5u8, 8, 15, 16] {
        let alphabet = Alphabet::build(ChunkBits::new(bits).unwrap());
        let encoded = BitPacker::encode(&data, &alphabet);

        group.bench_with_input(BenchmarkId::new("encode", bits), &bits, |b, _| {
            b.iter(|| BitPacker::encode(&data, &alphabet))
        });
        group.bench_with_input(BenchmarkId::new("decode", bits), &bits, |b, _| {
            b.iter(|| BitPacker::decode(&encoded, &alphabet).unwrap())
        });
    }

    group.finish();
}

fn pipeline_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_pipeline");
    group.measurement_time(Duration::from_secs(10));

    for size in [64 * 1024, 1024 * 1024] {
        let data = sample(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("zlib_15", size), &size, |b, _| {
            b.iter(|| {
                let pipeline = EncodePipeline::new(
                    Cursor::new(&data[..]),
                    &CodecSettings::default(),
                    Arc::new(ZlibCompressor::default()),
                )
                .unwrap();
                pipeline.map(|s| s.unwrap().names.len()).sum::<usize>()
            })
        });
    }

    group.finish();
}

fn artifact_store_benchmarks(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("local_store");

    group.bench_function("create_1000_artifacts", |b| {
        b.to_async(&rt).iter(|| async {
            let dir = TempDir::new().unwrap();
            let store = LocalFilesystemStore::new(dir.path().to_path_buf());
            for index in 0..1000u64 {
                store
                    .create_artifact("bench", &format!("{index:08}_payload"))
                    .await
                    .unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bit_packer_benchmarks,
    pipeline_benchmarks,
    artifact_store_benchmarks
);
criterion_main!(benches);
