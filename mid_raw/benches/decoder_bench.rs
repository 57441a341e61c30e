use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mid_raw::prelude::*;

// Every local board fires in every event, the worst case for the decoder
fn busy_orbits(config: &DecoderConfig, n_orbits: u32, events_per_orbit: u16) -> Vec<u8> {
    let mapper = CrateMapper::instance();
    let cols: Vec<ColumnData> = make_default_masks(mapper)
        .into_iter()
        .map(|mut col| {
            col.set_non_bend_pattern(0x0101);
            col
        })
        .collect();
    let mut encoder = Encoder::new(config, &FeeIdConfig::default(), CrateMasks::default());
    for orbit in 1..=n_orbits {
        for ievent in 0..events_per_orbit {
            encoder.process(&cols, InteractionRecord::new(10 + 30 * ievent, orbit), EventType::Standard);
        }
    }
    encoder.finalize()
}

pub fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let bare = DecoderConfig::default();
    let user_logic = DecoderConfig {
        user_logic: true,
        ..Default::default()
    };
    let concurrent = DecoderConfig {
        concurrent: true,
        ..Default::default()
    };
    for (name, config) in [("bare", &bare), ("user_logic", &user_logic), ("concurrent", &concurrent)] {
        let buffer = busy_orbits(config, 4, 20);
        group.bench_with_input(BenchmarkId::new(name, buffer.len()), &buffer, |b, buffer| {
            let mut decoder = Decoder::new(config, FeeIdConfig::default(), &CrateMasks::default());
            b.iter(|| {
                decoder.reset();
                decoder.process(black_box(buffer));
                black_box(decoder.data().len())
            })
        });
    }
    group.finish();
}

pub fn bench_aggregate(c: &mut Criterion) {
    let config = DecoderConfig::default();
    let buffer = busy_orbits(&config, 2, 20);
    let mut decoder = Decoder::new(&config, FeeIdConfig::default(), &CrateMasks::default());
    decoder.process(&buffer);
    let mut aggregator = DecodedDataAggregator::new();
    c.bench_function("aggregate", |b| {
        b.iter(|| {
            aggregator.process(black_box(decoder.data()), black_box(decoder.rof_records()));
            black_box(aggregator.data(EventType::Standard).len())
        })
    });
}

criterion_group!(benches, bench_decode, bench_aggregate);
criterion_main!(benches);
