//! Bump allocator that owns every [`crate::Node`] and every derived buffer
//! produced while building or decoding a bencode tree.
//!
//! All allocation happens through a single [`Arena`], released en masse when
//! the `Arena` is dropped. This mirrors `vospro/rtpengine`'s
//! `bencode_buffer_t`: a singly-linked chain of byte blocks that is never
//! walked node-by-node on teardown, just freed as one region.

use alloc::vec::Vec;
use core::alloc::Layout;
use core::cell::{Cell, RefCell};
use core::ptr::NonNull;

use bumpalo::Bump;

pub use bumpalo::collections::Vec as BumpVec;

/// An arena allocator for bencode trees.
///
/// All [`crate::Node`]s built or decoded with this arena have their data
/// allocated from it and are tied to its lifetime:
///
/// - Allocation is a pointer bump, not a syscall.
/// - Individual nodes are never freed; everything goes when the `Arena` drops.
/// - Allocation can fail (the host is out of memory); when it does, the
///   arena enters a *sticky* error state and every subsequent allocation
///   fails immediately without touching the underlying allocator. This lets
///   a chain of builder calls skip a failure check after every step and
///   check once at the end.
///
/// `Arena` is intentionally `!Sync`: one arena must not be shared across
/// threads without external synchronization, though independent arenas on
/// different threads need none.
///
/// # Examples
///
/// ```
/// use bencode::Arena;
///
/// let arena = Arena::new();
/// let root = bencode::decode(&arena, b"i42e").unwrap();
/// assert_eq!(root.as_int(), Some(42));
/// ```
pub struct Arena {
    bump: Bump,
    failed: Cell<bool>,
    /// Arenas absorbed via [`Arena::merge`]; kept alive only so their
    /// allocations remain valid for as long as `self` does.
    absorbed: RefCell<Vec<Arena>>,
}

impl Arena {
    /// Creates a new, empty arena.
    #[inline]
    pub fn new() -> Self {
        Arena {
            bump: Bump::new(),
            failed: Cell::new(false),
            absorbed: RefCell::new(Vec::new()),
        }
    }

    /// Creates a new arena with an initial chunk of at least `capacity` bytes.
    ///
    /// This avoids repeated chunk growth when the approximate size of the
    /// tree to be built or decoded is known ahead of time.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            bump: Bump::with_capacity(capacity),
            failed: Cell::new(false),
            absorbed: RefCell::new(Vec::new()),
        }
    }

    /// Returns whether this arena has entered the sticky allocation-failure
    /// state. Once true, it never becomes false again (short of [`reset`](Arena::reset)).
    #[inline]
    pub fn has_failed(&self) -> bool {
        self.failed.get()
    }

    /// Returns the number of bytes currently allocated across all chunks
    /// owned directly by this arena (excluding merged-in arenas).
    #[inline]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    /// Releases every allocation, invalidating all previously returned
    /// references. Clears the sticky-failure flag and drops absorbed arenas.
    ///
    /// # Safety
    ///
    /// Safe to call, but any reference obtained from this arena before the
    /// call becomes dangling. The caller must not use such references
    /// afterward.
    #[inline]
    pub fn reset(&mut self) {
        self.bump.reset();
        self.failed.set(false);
        self.absorbed.get_mut().clear();
    }

    /// Merges `src` into `self`: `src`'s allocations are kept alive for as
    /// long as `self` lives, and `src` is consumed.
    ///
    /// This only requires a shared reference to `self`, so it never
    /// conflicts with references already borrowed from `self`. `src`,
    /// however, is taken by value, so it must not be borrowed at the call
    /// site — finish using any node obtained directly through `&src` before
    /// merging it away. The bytes those nodes point at do not move; only the
    /// `src` binding itself is retired. If `src` had already entered the
    /// sticky-failure state, that state is propagated to `self`.
    pub fn merge(&self, src: Arena) {
        if src.failed.get() {
            self.failed.set(true);
        }
        self.absorbed.borrow_mut().push(src);
    }

    fn mark_failed(&self) {
        self.failed.set(true);
    }

    fn try_alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.failed.get() {
            return None;
        }
        match self.bump.try_alloc_layout(layout) {
            Ok(ptr) => Some(ptr),
            Err(_) => {
                self.mark_failed();
                None
            }
        }
    }

    /// Allocates `value` in the arena, returning `None` (and entering the
    /// sticky-failure state) on allocation failure.
    #[inline]
    pub fn alloc<T>(&self, value: T) -> Option<&mut T> {
        let layout = Layout::new::<T>();
        let ptr = self.try_alloc_layout(layout)?;
        unsafe {
            let ptr = ptr.as_ptr().cast::<T>();
            ptr.write(value);
            Some(&mut *ptr)
        }
    }

    /// Copies `bytes` into the arena, returning the arena-owned slice.
    #[inline]
    pub fn alloc_bytes_copy(&self, bytes: &[u8]) -> Option<&[u8]> {
        if bytes.is_empty() {
            return Some(&[]);
        }
        let layout = Layout::array::<u8>(bytes.len()).ok()?;
        let ptr = self.try_alloc_layout(layout)?;
        unsafe {
            let dst = ptr.as_ptr();
            core::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
            Some(core::slice::from_raw_parts(dst, bytes.len()))
        }
    }

    /// Creates a new arena-backed vector for accumulating elements during a
    /// decode (repeated children, segment lists). Growth uses bumpalo's
    /// ordinary (infallible) allocation path; only the node-level
    /// allocations above participate in the sticky-failure protocol.
    #[inline]
    pub fn new_vec<T>(&self) -> BumpVec<'_, T> {
        BumpVec::new_in(&self.bump)
    }

    /// Like [`new_vec`](Arena::new_vec), pre-sized to `capacity` elements.
    #[inline]
    pub fn new_vec_with_capacity<T>(&self, capacity: usize) -> BumpVec<'_, T> {
        BumpVec::with_capacity_in(capacity, &self.bump)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_value() {
        let arena = Arena::new();
        let v = arena.alloc(42u32).unwrap();
        assert_eq!(*v, 42);
    }

    #[test]
    fn alloc_bytes_copy_roundtrips() {
        let arena = Arena::new();
        let copied = arena.alloc_bytes_copy(b"hello").unwrap();
        assert_eq!(copied, b"hello");
    }

    #[test]
    fn alloc_bytes_copy_empty() {
        let arena = Arena::new();
        let copied = arena.alloc_bytes_copy(b"").unwrap();
        assert_eq!(copied, b"");
    }

    #[test]
    fn new_vec_accumulates() {
        let arena = Arena::new();
        let mut v = arena.new_vec();
        v.extend_from_slice(&[1u8, 2, 3]);
        assert_eq!(v.into_bump_slice(), &[1, 2, 3]);
    }

    #[test]
    fn reset_clears_failure_state() {
        let mut arena = Arena::new();
        arena.mark_failed();
        assert!(arena.has_failed());
        arena.reset();
        assert!(!arena.has_failed());
    }

    #[test]
    fn with_capacity_allocates() {
        let arena = Arena::with_capacity(1024);
        let v = arena.alloc(7u8).unwrap();
        assert_eq!(*v, 7);
    }

    #[test]
    fn merge_keeps_source_bytes_alive() {
        let dest = Arena::new();
        let src = Arena::new();
        let kept = src.alloc_bytes_copy(b"payload").unwrap();
        // Safety: `kept`'s backing bytes live in `src`'s chunk, which is
        // moved (not freed) into `dest.absorbed`.
        let kept_ptr = kept.as_ptr();
        dest.merge(src);
        let still_here = unsafe { core::slice::from_raw_parts(kept_ptr, 7) };
        assert_eq!(still_here, b"payload");
    }

    #[test]
    fn merge_propagates_failure_state() {
        let dest = Arena::new();
        let mut src = Arena::new();
        src.mark_failed();
        dest.merge(src);
        assert!(dest.has_failed());
    }
}
