#![allow(dead_code)]
//! Shared helpers of the integration tests: configurations, deterministic random events, and the encode-decode chain.

pub use mid_raw::config::crate_mapper::n_lines;
pub use mid_raw::prelude::*;
pub use mid_raw::words::column_data::make_column_key;
pub use std::collections::BTreeMap;

/// Configuration of the bare GBT format.
pub fn bare_config() -> DecoderConfig {
    DecoderConfig::default()
}

/// Configuration of the CRU user logic format.
pub fn user_logic_config() -> DecoderConfig {
    DecoderConfig {
        user_logic: true,
        ..Default::default()
    }
}

/// Configuration decoding the links in parallel.
pub fn concurrent_config() -> DecoderConfig {
    DecoderConfig {
        concurrent: true,
        ..Default::default()
    }
}

/// Configuration emitting the regional boards, needed by the checker.
pub fn debug_config() -> DecoderConfig {
    DecoderConfig {
        debug_mode: true,
        ..Default::default()
    }
}

/// Small xorshift generator, the tests must not depend on the seed of a random crate.
#[derive(Debug)]
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// A pattern with at least one strip fired.
    pub fn pattern(&mut self) -> u16 {
        (self.next_u64() & 0xFFFF).max(1) as u16
    }
}

/// A random event of `n_cols` distinct columns, only on lines read out by a local board.
pub fn random_event(rng: &mut XorShift, n_cols: usize) -> Vec<ColumnData> {
    let mapper = CrateMapper::instance();
    let boards: Vec<u8> = mapper.local_boards().collect();
    let mut cols: BTreeMap<u16, ColumnData> = BTreeMap::new();
    while cols.len() < n_cols {
        let board_id = boards[rng.below(boards.len() as u64) as usize];
        let de_board = mapper.ro_board_to_de(board_id).unwrap();
        let de_id = de_board.de_id(rng.below(4) as u8);
        let col = cols
            .entry(make_column_key(de_id, de_board.column_id))
            .or_insert_with(|| ColumnData::new(de_id, de_board.column_id));
        col.set_bend_pattern(rng.pattern(), usize::from(de_board.line_id));
        col.set_non_bend_pattern(rng.pattern());
    }
    cols.into_values().collect()
}

/// Events at increasing interaction records spread over `n_orbits` orbits.
pub fn random_events(seed: u64, n_orbits: u32, events_per_orbit: u16) -> Vec<(InteractionRecord, Vec<ColumnData>)> {
    let mut rng = XorShift::new(seed);
    let mut events = Vec::new();
    for orbit in 1..=n_orbits {
        for ievent in 0..events_per_orbit {
            let bc = 3 + ievent * 100 + rng.below(90) as u16;
            let n_cols = 1 + rng.below(10) as usize;
            events.push((InteractionRecord::new(bc, orbit), random_event(&mut rng, n_cols)));
        }
    }
    events
}

/// Encodes standard events with the default mapping and masks.
pub fn encode(config: &DecoderConfig, events: &[(InteractionRecord, Vec<ColumnData>)]) -> Vec<u8> {
    let mut encoder = Encoder::new(config, &FeeIdConfig::default(), CrateMasks::default());
    for (ir, cols) in events {
        encoder.process(cols, *ir, EventType::Standard);
    }
    encoder.finalize()
}

/// Decodes a buffer with the default mapping and masks.
pub fn decode(config: &DecoderConfig, buffer: &[u8]) -> Decoder {
    let mut decoder = Decoder::new(config, FeeIdConfig::default(), &CrateMasks::default());
    decoder.process(buffer);
    decoder
}

/// Decodes and aggregates a buffer.
pub fn decode_and_aggregate(config: &DecoderConfig, buffer: &[u8]) -> DecodedDataAggregator {
    let decoder = decode(config, buffer);
    let mut aggregator = DecodedDataAggregator::new();
    aggregator.process(decoder.data(), decoder.rof_records());
    aggregator
}

/// The events of one type as `(interaction record, columns sorted by key)`.
pub fn events_of(
    data: &[ColumnData],
    rofs: &[RofRecord],
    event_type: EventType,
) -> Vec<(InteractionRecord, Vec<ColumnData>)> {
    rofs.iter()
        .filter(|rof| rof.event_type == event_type)
        .map(|rof| {
            let mut cols = data[rof.range()].to_vec();
            cols.sort_by_key(ColumnData::column_key);
            (rof.ir, cols)
        })
        .collect()
}

/// The standard events of an aggregator.
pub fn standard_events(aggregator: &DecodedDataAggregator) -> Vec<(InteractionRecord, Vec<ColumnData>)> {
    events_of(
        aggregator.data(EventType::Standard),
        aggregator.rof_records(EventType::Standard),
        EventType::Standard,
    )
}
