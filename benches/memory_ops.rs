use criterion::{black_box, criterion_group, criterion_main, Criterion};
use retro_search::core::types::{Address, DataType};
use retro_search::memory::MemorySnapshot;

fn benchmark_decode(c: &mut Criterion) {
    let memory: Vec<u8> = (0..4096u32).map(|i| i as u8).collect();

    for text in ["|u1", "<u2", ">i4", "<f8"] {
        let data_type: DataType = text.parse().unwrap();
        c.bench_function(&format!("decode_{}", text), |b| {
            b.iter(|| {
                let mut address = 0;
                while address + data_type.width() <= memory.len() {
                    black_box(memory.read_value(Address::new(address), data_type).unwrap());
                    address += data_type.width();
                }
            });
        });
    }
}

criterion_group!(benches, benchmark_decode);
criterion_main!(benches);
