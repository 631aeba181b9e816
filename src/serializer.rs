//! Re-emitting a tree (built or decoded) back into bencode bytes.

use crate::arena::{Arena, BumpVec};
use crate::node::Node;

#[cfg(feature = "std")]
use std::io::IoSlice;

/// A destination that can receive raw byte runs during a pre-order walk.
/// Lets [`emit_into`] serve both the arena-backed and host-`Vec`-backed
/// flat serializers without duplicating the traversal.
trait Sink {
    fn push_bytes(&mut self, bytes: &[u8]);
}

impl Sink for BumpVec<'_, u8> {
    fn push_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

#[cfg(feature = "std")]
impl Sink for std::vec::Vec<u8> {
    fn push_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

fn emit_into<'arena, S: Sink>(node: &'arena Node<'arena>, out: &mut S) {
    out.push_bytes(node.head());
    for child in node.children() {
        emit_into(child, out);
    }
    if let Some(tail) = node.tail() {
        out.push_bytes(tail);
    }
}

/// Serializes `node`'s subtree into a single contiguous buffer allocated
/// from `arena`. The returned slice is NUL-terminated (the terminator
/// occupies the byte immediately past the returned length, not counted in
/// it), for callers that want to hand the result to a C-style API.
///
/// Returns `None` if `arena` has already entered its sticky
/// allocation-failure state.
pub fn to_flat_in_arena<'arena>(arena: &'arena Arena, node: &'arena Node<'arena>) -> Option<&'arena [u8]> {
    if arena.has_failed() {
        return None;
    }
    let mut buf = arena.new_vec_with_capacity::<u8>(node.byte_length() + 1);
    emit_into(node, &mut buf);
    debug_assert_eq!(buf.len(), node.byte_length());
    buf.push(0);
    let full = buf.into_bump_slice();
    Some(&full[..node.byte_length()])
}

/// Like [`to_flat_in_arena`], but allocates from the host allocator so the
/// returned buffer outlives `arena`.
#[cfg(feature = "std")]
pub fn to_flat_vec(node: &Node<'_>) -> std::vec::Vec<u8> {
    let mut buf = std::vec::Vec::with_capacity(node.byte_length());
    emit_into(node, &mut buf);
    debug_assert_eq!(buf.len(), node.byte_length());
    buf
}

fn emit_segments<'arena>(node: &'arena Node<'arena>, out: &mut BumpVec<'arena, IoSlice<'arena>>) {
    out.push(IoSlice::new(node.head()));
    for child in node.children() {
        emit_segments(child, out);
    }
    if let Some(tail) = node.tail() {
        out.push(IoSlice::new(tail));
    }
}

/// Serializes `node`'s subtree into a vector of scatter/gather segments
/// suitable for `Write::write_vectored`, reserving `head_pad` empty slots
/// before them and `tail_pad` empty slots after, for a caller composing this
/// output into a larger vectored write of its own.
///
/// Returns `None` if `arena` has already entered its sticky
/// allocation-failure state.
#[cfg(feature = "std")]
pub fn to_segments<'arena>(
    arena: &'arena Arena,
    node: &'arena Node<'arena>,
    head_pad: usize,
    tail_pad: usize,
) -> Option<&'arena mut [IoSlice<'arena>]> {
    if arena.has_failed() {
        return None;
    }
    let total = head_pad + node.segment_count() as usize + tail_pad;
    let mut segments = arena.new_vec_with_capacity::<IoSlice<'arena>>(total);
    for _ in 0..head_pad {
        segments.push(IoSlice::new(&[]));
    }
    emit_segments(node, &mut segments);
    for _ in 0..tail_pad {
        segments.push(IoSlice::new(&[]));
    }
    debug_assert_eq!(segments.len(), total);
    Some(segments.into_bump_slice_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{dict_put, new_dictionary, new_string_copied};

    #[test]
    fn flat_in_arena_matches_expected_bytes() {
        let arena = Arena::new();
        let dict = new_dictionary(&arena).unwrap();
        let cow = new_string_copied(&arena, b"moo").unwrap();
        let spam = new_string_copied(&arena, b"eggs").unwrap();
        dict_put(&arena, dict, b"cow", cow).unwrap();
        dict_put(&arena, dict, b"spam", spam).unwrap();
        let flat = to_flat_in_arena(&arena, dict).unwrap();
        assert_eq!(flat, b"d3:cow3:moo4:spam4:eggse");
    }

    #[cfg(feature = "std")]
    #[test]
    fn flat_vec_matches_flat_in_arena() {
        let arena = Arena::new();
        let dict = new_dictionary(&arena).unwrap();
        let cow = new_string_copied(&arena, b"moo").unwrap();
        dict_put(&arena, dict, b"cow", cow).unwrap();
        let in_arena = to_flat_in_arena(&arena, dict).unwrap();
        let vec = to_flat_vec(dict);
        assert_eq!(in_arena, vec.as_slice());
    }

    #[cfg(feature = "std")]
    #[test]
    fn segments_concatenate_to_flat_bytes() {
        let arena = Arena::new();
        let dict = new_dictionary(&arena).unwrap();
        let cow = new_string_copied(&arena, b"moo").unwrap();
        dict_put(&arena, dict, b"cow", cow).unwrap();
        let flat = to_flat_in_arena(&arena, dict).unwrap();
        let segments = to_segments(&arena, dict, 0, 0).unwrap();
        let mut joined = std::vec::Vec::new();
        for segment in segments.iter() {
            joined.extend_from_slice(segment);
        }
        assert_eq!(joined, flat);
    }

    #[cfg(feature = "std")]
    #[test]
    fn segments_respect_padding() {
        let arena = Arena::new();
        let cow = new_string_copied(&arena, b"moo").unwrap();
        let segments = to_segments(&arena, cow, 2, 1).unwrap();
        assert_eq!(segments.len(), cow.segment_count() as usize + 3);
        assert!(segments[0].is_empty());
        assert!(segments[1].is_empty());
        assert!(segments[segments.len() - 1].is_empty());
    }
}
