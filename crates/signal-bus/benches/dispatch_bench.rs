use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use signal_bus::{BindingStyle, Receiver, SignalBus};

struct Sample(u64);

fn sync_bus(subscribers: usize, sum: Arc<AtomicU64>) -> SignalBus {
    let bus = SignalBus::new();
    bus.declare::<Sample>().unwrap();
    for i in 0..subscribers {
        let sum = sum.clone();
        bus.subscribe_with_priority(
            &Receiver::sync(move |sample: &Sample| {
                sum.fetch_add(sample.0, Ordering::Relaxed);
            }),
            (i % 4) as i32,
        )
        .unwrap();
    }
    bus
}

fn bench_sync_fire(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_fire");
    for subscribers in [1usize, 8, 64] {
        let sum = Arc::new(AtomicU64::new(0));
        let bus = sync_bus(subscribers, sum);
        group.bench_with_input(BenchmarkId::from_parameter(subscribers), &bus, |b, bus| {
            b.iter(|| bus.fire(black_box(&Sample(1))).unwrap())
        });
    }
    group.finish();
}

fn bench_lightweight_emit(c: &mut Criterion) {
    let bus = SignalBus::new();
    bus.declare_with_style::<Sample>(BindingStyle::AsyncLightweight).unwrap();
    for _ in 0..8 {
        bus.subscribe(&Receiver::lightweight(|sample: Arc<Sample>| async move {
            black_box(sample.0);
            Ok(())
        }))
        .unwrap();
    }

    c.bench_function("lightweight_emit_8", |b| {
        b.iter(|| futures::executor::block_on(bus.emit(Sample(black_box(1)))).unwrap())
    });
}

criterion_group!(benches, bench_sync_fire, bench_lightweight_emit);
criterion_main!(benches);
