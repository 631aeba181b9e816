//! Incremental construction of bencode trees, independent of decoding.
//!
//! Every function here takes the [`crate::Arena`] that will own the result
//! and returns `None` if that arena has entered (or enters, during this
//! call) its sticky allocation-failure state — mirroring the decoder's own
//! fallibility so callers can treat "out of memory" uniformly regardless of
//! which side of the crate produced a tree.
//!
//! Trees built this way carry no dictionary hash index (see
//! [`crate::dict_index`]); [`crate::Node::lookup`] always falls back to its
//! linear scan for them. Building one is rare enough, and dictionaries small
//! enough, that this is not worth complicating construction to avoid.

use alloc::format;

use crate::arena::Arena;
use crate::node::Node;

/// Builds a standalone `Integer` node.
pub fn new_integer(arena: &Arena, value: i64) -> Option<&Node<'_>> {
    let head = arena.alloc_bytes_copy(format!("i{value}e").as_bytes())?;
    arena.alloc(Node::new_integer(head, value)).map(|n| &*n)
}

/// Builds a standalone `String` node whose payload borrows `bytes` rather
/// than copying it. `bytes` must outlive the arena (`'b: 'arena`); use
/// [`new_string_copied`] when that isn't the case.
pub fn new_string_borrowed<'arena, 'b: 'arena>(
    arena: &'arena Arena,
    bytes: &'b [u8],
) -> Option<&'arena Node<'arena>> {
    let head = arena.alloc_bytes_copy(format!("{}:", bytes.len()).as_bytes())?;
    arena.alloc(Node::new_string(head, bytes)).map(|n| &*n)
}

/// Builds a standalone `String` node, copying `bytes` into the arena first.
pub fn new_string_copied<'arena>(arena: &'arena Arena, bytes: &[u8]) -> Option<&'arena Node<'arena>> {
    let copied = arena.alloc_bytes_copy(bytes)?;
    new_string_borrowed(arena, copied)
}

/// Builds an empty `List` node. Populate it with [`list_append`].
pub fn new_list(arena: &Arena) -> Option<&Node<'_>> {
    arena.alloc(Node::new_list(b"l", b"e")).map(|n| &*n)
}

/// Builds an empty `Dictionary` node. Populate it with [`dict_put`].
pub fn new_dictionary(arena: &Arena) -> Option<&Node<'_>> {
    arena.alloc(Node::new_dictionary(b"d", b"e")).map(|n| &*n)
}

/// Appends `item` to `list`, returning `item` back for chaining. Returns
/// `None` if `list` is not a `List` node.
pub fn list_append<'arena>(
    list: &'arena Node<'arena>,
    item: &'arena Node<'arena>,
) -> Option<&'arena Node<'arena>> {
    list.as_list()?;
    list.attach_child(item);
    Some(item)
}

/// Appends a (key, value) pair to `dict`, returning `value` back for
/// chaining. `key` is copied into a fresh `String` node borrowing `arena`'s
/// storage; it is not required to outlive `dict` on its own. Returns `None`
/// if `dict` is not a `Dictionary` node or if allocating the key node fails.
///
/// Does not check for a duplicate key against `dict`'s existing entries;
/// repeated `dict_put` calls with the same key append a second pair, exactly
/// as a decoded dictionary with a duplicate key would.
pub fn dict_put<'arena, 'b: 'arena>(
    arena: &'arena Arena,
    dict: &'arena Node<'arena>,
    key: &'b [u8],
    value: &'arena Node<'arena>,
) -> Option<&'arena Node<'arena>> {
    dict.as_dict()?;
    let key_node = new_string_borrowed(arena, key)?;
    dict.attach_child(key_node);
    dict.attach_child(value);
    Some(value)
}
