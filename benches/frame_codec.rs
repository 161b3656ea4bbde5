//! Microbenchmarks for the hot ingest path: CRC folding and frame parsing.

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use sentinel::protocol::crc::crc32;
use sentinel::protocol::{
    parse_frame, FrameHeader, MsgType, TrackPayload, PROTOCOL_VERSION,
};
use std::hint::black_box;

fn track_frame(with_crc: bool) -> Vec<u8> {
    let header = FrameHeader {
        version: PROTOCOL_VERSION,
        msg_type: MsgType::Track as u8,
        src_id: 7,
        seq: 1234,
        ts_ns: 5_000_000_000,
        payload_len: TrackPayload::SIZE as u16,
    };
    let payload = TrackPayload { track_id: 42, update_count: 9, ..Default::default() };
    let mut frame = header.encode().to_vec();
    frame.extend_from_slice(&payload.encode());
    if with_crc {
        let sum = crc32(&frame);
        frame.extend_from_slice(&sum.to_le_bytes());
    }
    frame
}

fn bench_crc32(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");
    for size in [43usize, 1024, 65536] {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function(format!("{size}_bytes"), |b| {
            b.iter(|| crc32(black_box(&data)))
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let plain = track_frame(false);
    let checked = track_frame(true);

    let mut group = c.benchmark_group("parse_frame");
    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("track_no_crc", |b| {
        b.iter(|| parse_frame(black_box(&plain), false).unwrap())
    });
    group.bench_function("track_with_crc", |b| {
        b.iter(|| parse_frame(black_box(&checked), true).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_crc32, bench_parse);
criterion_main!(benches);
