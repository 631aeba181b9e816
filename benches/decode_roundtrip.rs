use bencode::{decode, to_flat_in_arena, Arena};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;

/// A list of random-length byte strings, shaped like a piece-hashes blob in
/// a real torrent's `info` dictionary rather than ASCII text, to keep the
/// benchmark from only ever exercising the short-string fast path.
fn random_string_list(count: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut out = Vec::new();
    out.push(b'l');
    for _ in 0..count {
        let len = rng.gen_range(0..64);
        let bytes: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        out.extend_from_slice(format!("{len}:").as_bytes());
        out.extend_from_slice(&bytes);
    }
    out.push(b'e');
    out
}

fn sample_payloads() -> Vec<(&'static str, Vec<u8>)> {
    let mut big = Vec::new();
    big.extend_from_slice(b"l");
    for i in 0..256 {
        big.extend_from_slice(format!("i{i}e").as_bytes());
    }
    big.extend_from_slice(b"e");

    vec![
        ("integer", b"i424242e".to_vec()),
        ("string", b"26:the quick brown fox jumps".to_vec()),
        (
            "dictionary",
            b"d3:cow3:moo4:spam4:eggse".to_vec(),
        ),
        ("list_256", big),
        ("random_byte_strings_64", random_string_list(64)),
    ]
}

fn bench_decode_then_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_then_serialize");
    for (name, payload) in sample_payloads() {
        group.bench_function(name, |b| {
            b.iter(|| {
                let arena = Arena::new();
                let root = decode(&arena, black_box(&payload)).unwrap();
                let flat = to_flat_in_arena(&arena, root).unwrap();
                black_box(flat);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode_then_serialize);
criterion_main!(benches);
