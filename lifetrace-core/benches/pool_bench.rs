#[macro_use]
extern crate criterion;

use criterion::Criterion;

use lifetrace_core::alloc::pool::{PoolSettings, SlotPool};
use lifetrace_core::{Ledger, Resource};

fn bench_slot_pool_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_pool_cycle");

    for chunk_slots in [8, 64, 512] {
        group.throughput(criterion::Throughput::Elements(1));
        group.bench_function(format!("chunk_{}", chunk_slots), |b| {
            let ledger = Ledger::silent();
            let mut pool: SlotPool<Resource> = SlotPool::new(PoolSettings {
                chunk_slots,
                max_chunks: None,
            });
            b.iter(|| {
                let slot = pool.allocate_slot().unwrap();
                unsafe {
                    pool.construct_in_slot(slot, Resource::new(&ledger, 222, "pool"));
                    pool.destroy_in_slot(slot);
                }
            });
        });
    }
    group.finish();
}

fn bench_hooked_box_cycle(c: &mut Criterion) {
    let ledger = Ledger::silent();
    c.bench_function("hooked_box_cycle", |b| {
        b.iter(|| {
            let boxed = lifetrace_core::resource::ResourceBox::new(&ledger, 22, "heap").unwrap();
            criterion::black_box(boxed.value());
        });
    });
}

criterion_group!(benches, bench_slot_pool_cycle, bench_hooked_box_cycle);
criterion_main!(benches);
