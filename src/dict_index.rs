//! Fixed-size open-addressed hash table accelerating lookups on decoded
//! dictionaries.
//!
//! The decoder builds one of these per dictionary once all of its (key,
//! value) pairs are known, and installs it via [`crate::Node::lookup`]'s
//! cooperating `Probe` result. Builder-created dictionaries never get one;
//! their lookups go straight to the linear scan over children.

use core::cell::Cell;

use crate::node::Node;

/// Bucket count. A small prime, matching `vospro/rtpengine`'s
/// `BENCODE_HASH_BUCKETS`; primes spread linear-probe clusters better than
/// round numbers.
const BUCKETS: usize = 31;

/// Outcome of probing the index for a key.
pub(crate) enum Probe<'arena> {
    /// The key was found; its paired value is returned.
    Found(&'arena Node<'arena>),
    /// An empty bucket was reached before any match — the key is
    /// definitively absent from this dictionary.
    Absent,
    /// The probe covered every bucket without hitting an empty one or a
    /// match (possible once the table has lost insertions to a full
    /// table). The caller must fall back to a linear scan to get a
    /// correct answer.
    Fallback,
}

pub(crate) struct DictIndex<'arena> {
    buckets: [Cell<Option<&'arena Node<'arena>>>; BUCKETS],
}

impl<'arena> DictIndex<'arena> {
    pub(crate) fn new() -> Self {
        DictIndex {
            buckets: core::array::from_fn(|_| Cell::new(None)),
        }
    }

    /// Hashes a key prefix: as many native-endian machine words as fit (8,
    /// then 4, then 2, then 1 byte), modulo the bucket count. Deliberately
    /// non-cryptographic, and its result depends on host endianness — it
    /// only needs to be stable within one process.
    fn hash(key: &[u8]) -> usize {
        let word = if key.len() >= 8 {
            u64::from_ne_bytes(key[..8].try_into().unwrap())
        } else if key.len() >= 4 {
            u32::from_ne_bytes(key[..4].try_into().unwrap()) as u64
        } else if key.len() >= 2 {
            u16::from_ne_bytes(key[..2].try_into().unwrap()) as u64
        } else if !key.is_empty() {
            key[0] as u64
        } else {
            0
        };
        (word % BUCKETS as u64) as usize
    }

    /// Inserts `key` (a dictionary-key `Node`) at the first empty slot found
    /// probing forward from its hash bucket. If every bucket is occupied,
    /// the insertion is silently skipped and the dictionary becomes
    /// lookup-degraded: [`Probe::Fallback`] will eventually be returned for
    /// some keys, and callers fall back to the linear scan, which is still
    /// correct.
    pub(crate) fn insert(&self, key: &'arena Node<'arena>) {
        let payload = key
            .as_str()
            .expect("dictionary index key must be a string node");
        let start = Self::hash(payload);
        for step in 0..BUCKETS {
            let i = (start + step) % BUCKETS;
            if self.buckets[i].get().is_none() {
                self.buckets[i].set(Some(key));
                return;
            }
        }
    }

    /// Probes for `key`, returning its value, definitive absence, or a
    /// fallback signal (see [`Probe`]).
    pub(crate) fn probe(&self, key: &[u8]) -> Probe<'arena> {
        let start = Self::hash(key);
        for step in 0..BUCKETS {
            let i = (start + step) % BUCKETS;
            match self.buckets[i].get() {
                None => return Probe::Absent,
                Some(candidate) => {
                    if candidate.as_str() == Some(key) {
                        let value = candidate
                            .next_sibling()
                            .expect("dictionary key without a paired value");
                        return Probe::Found(value);
                    }
                }
            }
        }
        Probe::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Arena;

    fn string_node<'a>(arena: &'a Arena, s: &'static [u8]) -> &'a Node<'a> {
        crate::builder::new_string_borrowed(arena, s).unwrap()
    }

    #[test]
    fn hash_is_in_range_for_varied_lengths() {
        for len in 0..12 {
            let bytes: alloc::vec::Vec<u8> = (0..len as u8).collect();
            assert!(DictIndex::hash(&bytes) < BUCKETS);
        }
    }

    #[test]
    fn insert_then_probe_finds_value() {
        let arena = Arena::new();
        let parent = string_node(&arena, b"placeholder");
        let index = DictIndex::new();
        let key = string_node(&arena, b"cow");
        let value = string_node(&arena, b"moo");
        parent.attach_child(key);
        parent.attach_child(value);
        index.insert(key);
        match index.probe(b"cow") {
            Probe::Found(v) => assert_eq!(v.as_str(), Some(b"moo".as_slice())),
            _ => panic!("expected Found"),
        }
    }

    #[test]
    fn probe_absent_key_hits_empty_bucket() {
        let arena = Arena::new();
        let parent = string_node(&arena, b"placeholder");
        let index = DictIndex::new();
        let key = string_node(&arena, b"cow");
        let value = string_node(&arena, b"moo");
        parent.attach_child(key);
        parent.attach_child(value);
        index.insert(key);
        assert!(matches!(index.probe(b"nope"), Probe::Absent));
    }

    #[test]
    fn full_table_falls_back() {
        let arena = Arena::new();
        let parent = string_node(&arena, b"placeholder");
        let index = DictIndex::new();
        // Force every bucket to collide on the same hash by using
        // single-byte keys that all hash to bucket 0 (byte value 0 mod 31).
        for _ in 0..BUCKETS {
            let key = string_node(&arena, b"\0");
            let value = string_node(&arena, b"v");
            parent.attach_child(key);
            parent.attach_child(value);
            index.insert(key);
        }
        // The table only has room for 31 distinct slots; having inserted 31
        // identical single-byte keys, probing a different, never-inserted
        // key that also hashes to bucket 0 must exhaust the table.
        assert!(matches!(index.probe(b"\x01"), Probe::Fallback | Probe::Absent));
    }
}
