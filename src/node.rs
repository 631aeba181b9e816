//! The tagged tree element produced by both the builder and the decoder.

use core::cell::Cell;

use crate::dict_index::{DictIndex, Probe};

/// Which of the five bencode shapes a [`Node`] holds.
///
/// `EndMarker` is a decoder-internal sentinel and is never returned by this
/// accessor; a finished tree handed to a caller never contains one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A byte string of arbitrary length.
    String,
    /// A signed 64-bit integer.
    Integer,
    /// An ordered sequence of children.
    List,
    /// An ordered sequence of (string key, value) pairs.
    Dictionary,
}

pub(crate) enum Kind<'arena> {
    String,
    Integer(i64),
    List,
    Dictionary(Cell<Option<&'arena DictIndex<'arena>>>),
    /// Sentinel for the byte `e` terminating a container, produced only by
    /// the decoder's internal recursive descent and never attached to a
    /// tree or exposed to callers.
    EndMarker,
}

/// One node of a bencode tree: a string, integer, list, dictionary, or
/// (internally) the end-of-container marker.
///
/// Every `Node` lives in, and borrows from, an [`crate::Arena`]. Intrusive
/// tree links and the running `segment_count`/`byte_length` counters use
/// `Cell` for interior mutability, since nodes are only ever reachable
/// through shared references once allocated — the arena is the sole owner,
/// and attaching a child mutates both the child's back-edge and every
/// ancestor's counters in place.
pub struct Node<'arena> {
    kind: Kind<'arena>,
    parent: Cell<Option<&'arena Node<'arena>>>,
    first_child: Cell<Option<&'arena Node<'arena>>>,
    last_child: Cell<Option<&'arena Node<'arena>>>,
    next_sibling: Cell<Option<&'arena Node<'arena>>>,
    /// Bytes prefixing this node in serialized form (`d`, `l`, `i...e`, `NN:`).
    head: &'arena [u8],
    /// Bytes suffixing this node in serialized form: `e` for containers,
    /// the payload for strings, absent for integers and the end marker.
    tail: Option<&'arena [u8]>,
    segment_count: Cell<u32>,
    byte_length: Cell<usize>,
}

impl<'arena> Node<'arena> {
    fn new(kind: Kind<'arena>, head: &'arena [u8], tail: Option<&'arena [u8]>) -> Self {
        let segment_count = 1 + tail.is_some() as u32;
        let byte_length = head.len() + tail.map_or(0, <[u8]>::len);
        Node {
            kind,
            parent: Cell::new(None),
            first_child: Cell::new(None),
            last_child: Cell::new(None),
            next_sibling: Cell::new(None),
            head,
            tail,
            segment_count: Cell::new(segment_count),
            byte_length: Cell::new(byte_length),
        }
    }

    pub(crate) fn new_string(head: &'arena [u8], payload: &'arena [u8]) -> Self {
        Node::new(Kind::String, head, Some(payload))
    }

    pub(crate) fn new_integer(head: &'arena [u8], value: i64) -> Self {
        Node::new(Kind::Integer(value), head, None)
    }

    pub(crate) fn new_list(head: &'arena [u8], tail: &'arena [u8]) -> Self {
        Node::new(Kind::List, head, Some(tail))
    }

    pub(crate) fn new_dictionary(head: &'arena [u8], tail: &'arena [u8]) -> Self {
        Node::new(Kind::Dictionary(Cell::new(None)), head, Some(tail))
    }

    pub(crate) fn new_end_marker(head: &'arena [u8]) -> Self {
        Node::new(Kind::EndMarker, head, None)
    }

    pub(crate) fn is_end_marker(&self) -> bool {
        matches!(self.kind, Kind::EndMarker)
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.parent.get().is_some() || self.next_sibling.get().is_some()
    }

    pub(crate) fn first_child(&self) -> Option<&'arena Node<'arena>> {
        self.first_child.get()
    }

    pub(crate) fn next_sibling(&self) -> Option<&'arena Node<'arena>> {
        self.next_sibling.get()
    }

    /// Installs the hash index built by the decoder once a dictionary's
    /// children are all known. Builder-created dictionaries never call this,
    /// so their lookups always use the linear scan.
    pub(crate) fn set_dict_index(&self, index: &'arena DictIndex<'arena>) {
        match &self.kind {
            Kind::Dictionary(cell) => cell.set(Some(index)),
            _ => debug_assert!(false, "set_dict_index on a non-dictionary node"),
        }
    }

    /// Attaches `child` as the last child of `self`, then walks up the
    /// ancestor chain adding `child`'s `segment_count` and `byte_length` to
    /// every container above it. `child` must be freshly built or decoded:
    /// unparented and without a sibling already.
    pub(crate) fn attach_child(&'arena self, child: &'arena Node<'arena>) {
        debug_assert!(!child.is_attached(), "child is already part of a tree");
        child.parent.set(Some(self));
        match self.last_child.get() {
            Some(last) => last.next_sibling.set(Some(child)),
            None => self.first_child.set(Some(child)),
        }
        self.last_child.set(Some(child));

        let mut ancestor = Some(self);
        while let Some(node) = ancestor {
            node.segment_count
                .set(node.segment_count.get() + child.segment_count.get());
            node.byte_length
                .set(node.byte_length.get() + child.byte_length.get());
            ancestor = node.parent.get();
        }
    }

    /// Which of [`NodeKind`]'s variants this node is.
    ///
    /// # Panics
    ///
    /// Never panics on a node reachable from public API; only the decoder's
    /// private end-marker sentinel lacks a `NodeKind`, and it never escapes
    /// `decoder.rs`.
    pub fn kind(&self) -> NodeKind {
        match &self.kind {
            Kind::String => NodeKind::String,
            Kind::Integer(_) => NodeKind::Integer,
            Kind::List => NodeKind::List,
            Kind::Dictionary(_) => NodeKind::Dictionary,
            Kind::EndMarker => unreachable!("end marker never escapes the decoder"),
        }
    }

    /// The enclosing container, or `None` at the root.
    pub fn parent(&self) -> Option<&'arena Node<'arena>> {
        self.parent.get()
    }

    /// Children in insertion/decode order. For a `Dictionary`, this
    /// interleaves key then value: `[k0, v0, k1, v1, ...]`.
    pub fn children(&self) -> Children<'arena> {
        Children {
            next: self.first_child.get(),
        }
    }

    /// Total number of scatter/gather segments this subtree serializes to.
    pub fn segment_count(&self) -> u32 {
        self.segment_count.get()
    }

    /// Total number of bytes this subtree serializes to.
    pub fn byte_length(&self) -> usize {
        self.byte_length.get()
    }

    /// The bytes that prefix this node in serialized form.
    pub fn head(&self) -> &'arena [u8] {
        self.head
    }

    /// The bytes that suffix this node in serialized form, if any.
    pub fn tail(&self) -> Option<&'arena [u8]> {
        self.tail
    }

    /// This node's payload if it is a `String`, else `None`.
    pub fn as_str(&self) -> Option<&'arena [u8]> {
        match self.kind {
            Kind::String => self.tail,
            _ => None,
        }
    }

    /// This node's value if it is an `Integer`, else `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            Kind::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// `self` if it is a `List`, else `None`. `children()` is identical
    /// either way; this exists to assert the kind before iterating.
    pub fn as_list(&self) -> Option<&Node<'arena>> {
        matches!(self.kind, Kind::List).then_some(self)
    }

    /// `self` if it is a `Dictionary`, else `None`.
    pub fn as_dict(&self) -> Option<&Node<'arena>> {
        matches!(self.kind, Kind::Dictionary(_)).then_some(self)
    }

    /// Looks up `key` in a dictionary's children.
    ///
    /// Returns `None` immediately if `self` is not a `Dictionary`. On a
    /// decoded dictionary with a hash index, this is expected O(1); it
    /// transparently falls back to the O(n) linear scan if the index probe
    /// wraps without resolving (see [`crate`] dictionary index docs).
    /// Builder-created dictionaries have no index and always scan linearly.
    pub fn lookup(&self, key: &[u8]) -> Option<&'arena Node<'arena>> {
        let index = match &self.kind {
            Kind::Dictionary(cell) => cell.get(),
            _ => return None,
        };
        if let Some(index) = index {
            match index.probe(key) {
                Probe::Found(value) => return Some(value),
                Probe::Absent => return None,
                Probe::Fallback => {}
            }
        }
        self.lookup_linear(key)
    }

    fn lookup_linear(&self, key: &[u8]) -> Option<&'arena Node<'arena>> {
        let mut next_key = self.first_child.get();
        while let Some(k) = next_key {
            let v = k
                .next_sibling
                .get()
                .expect("dictionary key without a paired value");
            if k.as_str() == Some(key) {
                return Some(v);
            }
            next_key = v.next_sibling.get();
        }
        None
    }
}

/// Iterator over a container's children, in insertion/decode order.
pub struct Children<'arena> {
    next: Option<&'arena Node<'arena>>,
}

impl<'arena> Iterator for Children<'arena> {
    type Item = &'arena Node<'arena>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling.get();
        Some(current)
    }
}
