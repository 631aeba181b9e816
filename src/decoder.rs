//! Recursive-descent bencode decoder.

use bytes::Buf;

use crate::arena::Arena;
use crate::dict_index::DictIndex;
use crate::error::DecodeError;
use crate::node::Node;

/// Tracks how much of `input` has been consumed. Wraps a `&[u8]` cursor
/// driven through the `bytes::Buf` trait (the same cursor abstraction the
/// teacher lineage uses for its wire-format reader), while keeping the
/// original slice around so consumed ranges can be re-sliced with the
/// `'arena` lifetime intact — a `Buf` alone only ever hands back the
/// unconsumed remainder, not a borrow into what it already passed over.
struct Cursor<'arena> {
    input: &'arena [u8],
    rest: &'arena [u8],
}

impl<'arena> Cursor<'arena> {
    fn new(input: &'arena [u8]) -> Self {
        Cursor { input, rest: input }
    }

    fn offset(&self) -> usize {
        self.input.len() - Buf::remaining(&self.rest)
    }

    fn peek(&self) -> Option<u8> {
        self.rest.first().copied()
    }

    fn advance(&mut self, n: usize) {
        Buf::advance(&mut self.rest, n);
    }

    fn slice_from(&self, start: usize) -> &'arena [u8] {
        let input = self.input;
        &input[start..self.offset()]
    }

    fn take(&mut self, n: usize) -> Option<&'arena [u8]> {
        if Buf::remaining(&self.rest) < n {
            return None;
        }
        let start = self.offset();
        self.advance(n);
        Some(self.slice_from(start))
    }
}

/// Result of decoding one value at the current cursor position: either a
/// real node, or the end-of-container marker. Never exposed outside this
/// module.
enum Decoded<'arena> {
    Value(&'arena Node<'arena>),
    End(&'arena Node<'arena>),
}

/// Parses one complete bencoded value starting at offset 0 of `input` and
/// returns its root. Trailing bytes past the value are ignored; compare
/// `root.byte_length()` against `input.len()` to detect them.
///
/// Returns `None` on any malformed input, allocation failure, or nesting
/// beyond [`crate::RECURSION_LIMIT`]. No partial tree escapes; unreachable
/// allocations are simply reclaimed along with the rest of the arena.
pub fn decode<'arena>(arena: &'arena Arena, input: &'arena [u8]) -> Option<&'arena Node<'arena>> {
    let mut cursor = Cursor::new(input);
    match decode_value(&mut cursor, arena, 0) {
        Ok(Decoded::Value(node)) => Some(node),
        Ok(Decoded::End(_)) | Err(_) => None,
    }
}

fn decode_value<'arena>(
    cursor: &mut Cursor<'arena>,
    arena: &'arena Arena,
    depth: u32,
) -> Result<Decoded<'arena>, DecodeError> {
    if depth > crate::RECURSION_LIMIT {
        return Err(DecodeError::RecursionLimitReached);
    }
    match cursor.peek() {
        None => Err(DecodeError::UnexpectedEnd),
        Some(b'd') => decode_dictionary(cursor, arena, depth).map(Decoded::Value),
        Some(b'l') => decode_list(cursor, arena, depth).map(Decoded::Value),
        Some(b'i') => decode_integer(cursor, arena).map(Decoded::Value),
        Some(b'e') => {
            let start = cursor.offset();
            cursor.advance(1);
            let head = cursor.slice_from(start);
            let marker = arena
                .alloc(Node::new_end_marker(head))
                .ok_or(DecodeError::AllocationFailed)?;
            Ok(Decoded::End(marker))
        }
        Some(b'0'..=b'9') => decode_string(cursor, arena).map(Decoded::Value),
        Some(other) => Err(DecodeError::UnknownTag(other)),
    }
}

fn parse_integer_body(body: &[u8]) -> Result<i64, DecodeError> {
    let digits = match body.first() {
        Some(b'-') => &body[1..],
        _ => body,
    };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(DecodeError::InvalidInteger);
    }
    // "-0" is left to the Validator (§4.7) to reject; the decoder is lax
    // here, matching `__bencode_decode_integer`'s fall-through to `strtoll`.
    let text = core::str::from_utf8(body).map_err(|_| DecodeError::InvalidInteger)?;
    text.parse::<i64>().map_err(|_| DecodeError::IntegerOverflow)
}

fn decode_integer<'arena>(
    cursor: &mut Cursor<'arena>,
    arena: &'arena Arena,
) -> Result<&'arena Node<'arena>, DecodeError> {
    let start = cursor.offset();
    debug_assert_eq!(cursor.peek(), Some(b'i'));
    cursor.advance(1);
    let body_len = cursor
        .rest
        .iter()
        .position(|&b| b == b'e')
        .ok_or(DecodeError::UnexpectedEnd)?;
    let body = &cursor.rest[..body_len];
    let value = parse_integer_body(body)?;
    cursor.advance(body_len + 1);
    let head = cursor.slice_from(start);
    arena
        .alloc(Node::new_integer(head, value))
        .map(|n| &*n)
        .ok_or(DecodeError::AllocationFailed)
}

fn decode_string<'arena>(
    cursor: &mut Cursor<'arena>,
    arena: &'arena Arena,
) -> Result<&'arena Node<'arena>, DecodeError> {
    let start = cursor.offset();
    let len_digits = cursor
        .rest
        .iter()
        .position(|&b| b == b':')
        .ok_or(DecodeError::UnexpectedEnd)?;
    if len_digits == 0 {
        return Err(DecodeError::InvalidStringLength);
    }
    let digits = &cursor.rest[..len_digits];
    let text = core::str::from_utf8(digits).map_err(|_| DecodeError::InvalidStringLength)?;
    let length: usize = text.parse().map_err(|_| DecodeError::InvalidStringLength)?;
    cursor.advance(len_digits + 1);
    let head = cursor.slice_from(start);
    let payload = cursor.take(length).ok_or(DecodeError::TruncatedString)?;
    arena
        .alloc(Node::new_string(head, payload))
        .map(|n| &*n)
        .ok_or(DecodeError::AllocationFailed)
}

fn decode_list<'arena>(
    cursor: &mut Cursor<'arena>,
    arena: &'arena Arena,
    depth: u32,
) -> Result<&'arena Node<'arena>, DecodeError> {
    let start = cursor.offset();
    debug_assert_eq!(cursor.peek(), Some(b'l'));
    cursor.advance(1);
    let head = cursor.slice_from(start);
    let mut children = arena.new_vec::<&'arena Node<'arena>>();
    let tail = loop {
        match decode_value(cursor, arena, depth + 1)? {
            Decoded::Value(child) => children.push(child),
            Decoded::End(marker) => break marker.head(),
        }
    };
    let list = arena
        .alloc(Node::new_list(head, tail))
        .ok_or(DecodeError::AllocationFailed)?;
    for &child in children.iter() {
        list.attach_child(child);
    }
    Ok(list)
}

fn decode_dictionary<'arena>(
    cursor: &mut Cursor<'arena>,
    arena: &'arena Arena,
    depth: u32,
) -> Result<&'arena Node<'arena>, DecodeError> {
    let start = cursor.offset();
    debug_assert_eq!(cursor.peek(), Some(b'd'));
    cursor.advance(1);
    let head = cursor.slice_from(start);
    let mut pairs = arena.new_vec::<(&'arena Node<'arena>, &'arena Node<'arena>)>();
    let tail = loop {
        let key = match decode_value(cursor, arena, depth + 1)? {
            Decoded::Value(key) => key,
            Decoded::End(marker) => break marker.head(),
        };
        if key.as_str().is_none() {
            return Err(DecodeError::NonStringKey);
        }
        let value = match decode_value(cursor, arena, depth + 1)? {
            Decoded::Value(value) => value,
            Decoded::End(_) => return Err(DecodeError::DanglingKey),
        };
        pairs.push((key, value));
    };
    let dict = arena
        .alloc(Node::new_dictionary(head, tail))
        .ok_or(DecodeError::AllocationFailed)?;
    let index = arena
        .alloc(DictIndex::new())
        .ok_or(DecodeError::AllocationFailed)?;
    for &(key, value) in pairs.iter() {
        dict.attach_child(key);
        dict.attach_child(value);
        index.insert(key);
    }
    dict.set_dict_index(index);
    Ok(dict)
}
