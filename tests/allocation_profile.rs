//! Confirms, under a heap profiler, that decoding borrows string payloads
//! from the input rather than copying them, and that only the host-owned
//! flat-serialization path (`to_flat_vec`) pays for a copy.
//!
//! Shaped after `examples/dwerner-defiant/prost/tests/allocation_comparison.rs`:
//! install `dhat::Alloc` as the global allocator, bracket the operation under
//! test with `dhat::HeapStats::get()` snapshots, and compare the deltas.

use bencode::{decode, to_flat_vec, Arena};

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn sample_payload() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"d8:announce33:http://tracker.example.com/announce");
    data.extend_from_slice(
        b"4:infod6:lengthi104857600e4:name9:movie.mp412:piece lengthi262144ee",
    );
    data.push(b'e');
    data
}

#[test]
fn decode_allocates_only_arena_chunks_not_payload_copies() {
    let _profiler = dhat::Profiler::new_heap();
    let data = sample_payload();

    // One decode pre-warms the allocator's first chunk outside the window
    // we measure, so the steady-state cost below isn't dominated by a
    // one-time growth.
    {
        let arena = Arena::new();
        let root = decode(&arena, &data).unwrap();
        std::hint::black_box(root);
    }

    let before = dhat::HeapStats::get();
    let arena = Arena::with_capacity(4096);
    let root = decode(&arena, &data).unwrap();
    std::hint::black_box(&root);
    let after_decode = dhat::HeapStats::get();

    let flat = to_flat_vec(root);
    let after_flatten = dhat::HeapStats::get();

    let decode_bytes = after_decode.total_bytes - before.total_bytes;
    let flatten_bytes = after_flatten.total_bytes - after_decode.total_bytes;

    println!("decode: {decode_bytes} bytes allocated (arena chunk, not payload copies)");
    println!("to_flat_vec: {flatten_bytes} bytes allocated (host-owned copy of {} bytes)", flat.len());

    // Decoding never copies string payloads: its allocation footprint must
    // stay well under the input size, since it only needs arena bookkeeping
    // (nodes, the dictionary index) rather than a duplicate of the input.
    assert!(
        decode_bytes < data.len() as u64,
        "decode allocated {decode_bytes} bytes for a {}-byte input; expected zero-copy string payloads",
        data.len()
    );

    // Flattening to a host-owned Vec<u8> must allocate at least the output
    // size, since that path is explicitly documented as copying.
    assert!(
        flatten_bytes >= flat.len() as u64,
        "to_flat_vec allocated only {flatten_bytes} bytes for a {}-byte output",
        flat.len()
    );
}

#[test]
fn repeated_decode_with_arena_reset_has_stable_allocation_cost() {
    let _profiler = dhat::Profiler::new_heap();
    let data = sample_payload();

    let mut arena = Arena::with_capacity(4096);
    {
        let root = decode(&arena, &data).unwrap();
        std::hint::black_box(root);
    }
    arena.reset();

    let before = dhat::HeapStats::get();
    for _ in 0..50 {
        arena.reset();
        let root = decode(&arena, &data).unwrap();
        std::hint::black_box(root);
    }
    let after = dhat::HeapStats::get();

    let blocks = after.total_blocks - before.total_blocks;
    println!("50 reset-and-decode cycles: {blocks} allocator calls");
    // A pre-sized, reused arena should not need a fresh heap block on every
    // cycle once its one chunk is large enough for this payload.
    assert!(
        blocks < 50,
        "expected arena reuse to avoid a heap allocation on every cycle, saw {blocks} calls for 50 cycles"
    );
}
