//! Sorted, compact in-memory domain index.
//!
//! Two parallel arenas back the index: `storage` holds domain names appended
//! in arrival order, each terminated by a zero byte; `ptrs` holds offsets
//! into `storage` kept in lexicographic order of the pointed-to name. A
//! fixed-arena layout over a hash set, because this index is sized from a
//! fixed memory budget decided once at startup and never grows past it.
use tracing::warn;

/// Sentinel key occupying `ptrs[0]`; guarantees index 0 is never a valid
/// hit so callers can distinguish "not found" from "found at the first
/// slot" without a side channel.
const SENTINEL: &str = "!";

/// Result of a binary search. `search` never overloads a single return
/// value for both "duplicate" and "not found": those are different enum
/// variants, not the same 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    /// The name is present at this index into `ptrs`.
    Found(usize),
    /// The name is absent; inserting it should land at this index.
    InsertAt(usize),
}

#[derive(Debug)]
pub struct DomainIndex {
    storage: Vec<u8>,
    ptrs: Vec<usize>,
    /// Parallel to `ptrs`: true if that slot is tombstoned. Kept separate
    /// from `storage` so a delete never rewrites the bytes `search` sorts
    /// and compares on — corrupting the comparison key for a live entry
    /// would desync it from its neighbors and break binary search for the
    /// rest of the arena, not just the deleted name.
    deleted: Vec<bool>,
    max_domains: usize,
    storage_size: usize,
    items_loaded: usize,
    duplicates: u64,
}

impl DomainIndex {
    /// Allocate the arenas. `storage_size` is the byte budget for names
    /// (already reduced by the `minMemory` floor at the call site); the
    /// sentinel is inserted immediately so the index is never empty.
    pub fn new(max_domains: usize, storage_size: usize) -> Self {
        let mut storage = Vec::with_capacity(storage_size);
        storage.extend_from_slice(SENTINEL.as_bytes());
        storage.push(0);

        DomainIndex {
            storage,
            ptrs: vec![0],
            deleted: vec![false],
            max_domains,
            storage_size,
            items_loaded: 1,
            duplicates: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items_loaded - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    fn name_at(&self, ptr: usize) -> &[u8] {
        let end = self.storage[ptr..]
            .iter()
            .position(|&b| b == 0)
            .map(|p| ptr + p)
            .unwrap_or(self.storage.len());
        &self.storage[ptr..end]
    }

    /// Binary search over `ptrs`, comparing the normalized byte form of
    /// `name` against `storage[ptrs[mid]..]`.
    pub fn search(&self, name: &str) -> SearchResult {
        let key = name.as_bytes();
        let mut lo = 0usize;
        let mut hi = self.ptrs.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let candidate = self.name_at(self.ptrs[mid]);
            match key.cmp(candidate) {
                std::cmp::Ordering::Equal => return SearchResult::Found(mid),
                std::cmp::Ordering::Less => hi = mid,
                std::cmp::Ordering::Greater => lo = mid + 1,
            }
        }
        SearchResult::InsertAt(lo)
    }

    pub fn contains(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        // idx 0 is the sentinel's own slot, never a real entry, even if a
        // name byte-for-byte matches it.
        matches!(self.search(name), SearchResult::Found(idx) if idx != 0 && !self.deleted[idx])
    }

    /// Insert `name`, appending it to `storage` and shifting the `ptrs`
    /// tail to keep lexicographic order. A tombstoned slot for the same
    /// name is revived in place rather than re-appended. Silently drops
    /// the entry (with a warning) if either arena is full, matching the
    /// loader's non-fatal-truncation contract.
    pub fn insert(&mut self, name: &str) -> bool {
        let pos = match self.search(name) {
            SearchResult::Found(idx) => {
                if self.deleted[idx] {
                    self.deleted[idx] = false;
                    self.items_loaded += 1;
                    return true;
                }
                self.duplicates += 1;
                return false;
            }
            SearchResult::InsertAt(pos) => pos,
        };

        if self.items_loaded >= self.max_domains {
            warn!("domain index at capacity ({} entries), dropping {}", self.max_domains, name);
            return false;
        }
        let needed = name.len() + 1;
        if self.storage.len() + needed > self.storage_size {
            warn!("domain index storage exhausted, dropping {}", name);
            return false;
        }

        let offset = self.storage.len();
        self.storage.extend_from_slice(name.as_bytes());
        self.storage.push(0);

        self.ptrs.insert(pos, offset);
        self.deleted.insert(pos, false);
        self.items_loaded += 1;
        true
    }

    /// Mark the slot tombstoned without touching its stored bytes, so the
    /// rest of `ptrs` stays in the order `search` requires. The tombstoned
    /// offset lingers until the next full rebuild reclaims the arena.
    pub fn delete(&mut self, name: &str) -> bool {
        match self.search(name) {
            SearchResult::Found(idx) if idx != 0 && !self.deleted[idx] => {
                self.deleted[idx] = true;
                self.items_loaded -= 1;
                true
            }
            _ => false,
        }
    }

    /// Drop all entries and reset to just the sentinel, without
    /// reallocating the arenas. Used at the start of a full rebuild.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.storage.extend_from_slice(SENTINEL.as_bytes());
        self.storage.push(0);
        self.ptrs.clear();
        self.ptrs.push(0);
        self.deleted.clear();
        self.deleted.push(false);
        self.items_loaded = 1;
        self.duplicates = 0;
    }

    pub fn storage_bytes_used(&self) -> usize {
        self.storage.len()
    }

    /// Bytes left in the arena before the next insert would be rejected.
    pub fn remaining_capacity(&self) -> usize {
        self.storage_size.saturating_sub(self.storage.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_makes_zero_unambiguous() {
        let idx = DomainIndex::new(100, 4096);
        assert_eq!(idx.len(), 0);
        assert!(!idx.contains("anything.com"));
    }

    #[test]
    fn insert_keeps_ascending_order() {
        let mut idx = DomainIndex::new(100, 4096);
        for name in ["zeta.com", "alpha.com", "mid.com", "beta.com"] {
            idx.insert(name);
        }
        assert_eq!(idx.len(), 4);
        for name in ["zeta.com", "alpha.com", "mid.com", "beta.com"] {
            assert!(idx.contains(name));
        }
        assert!(!idx.contains("missing.com"));
    }

    #[test]
    fn duplicate_insert_increments_counter_without_growing() {
        let mut idx = DomainIndex::new(100, 4096);
        assert!(idx.insert("foo.com"));
        assert!(!idx.insert("foo.com"));
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.duplicates(), 1);
    }

    #[test]
    fn add_then_delete_then_check() {
        let mut idx = DomainIndex::new(100, 4096);
        idx.insert("ads.example.com");
        assert!(idx.delete("ads.example.com"));
        assert!(!idx.contains("ads.example.com"));
    }

    #[test]
    fn delete_then_add_then_check() {
        let mut idx = DomainIndex::new(100, 4096);
        idx.insert("ads.example.com");
        idx.delete("ads.example.com");
        idx.insert("ads.example.com");
        assert!(idx.contains("ads.example.com"));
    }

    #[test]
    fn delete_missing_is_a_no_op() {
        let mut idx = DomainIndex::new(100, 4096);
        assert!(!idx.delete("missing.com"));
    }

    #[test]
    fn capacity_cap_drops_further_inserts() {
        let mut idx = DomainIndex::new(2, 4096);
        assert!(idx.insert("one.com"));
        assert!(!idx.insert("two.com"));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn storage_cap_drops_inserts_that_would_overflow() {
        let mut idx = DomainIndex::new(100, 16);
        assert!(idx.insert("short.com"));
        assert!(!idx.insert("this-name-is-far-too-long-for-the-arena.com"));
    }

    #[test]
    fn remaining_capacity_shrinks_as_entries_are_inserted() {
        let mut idx = DomainIndex::new(100, 4096);
        let before = idx.remaining_capacity();
        idx.insert("example.com");
        assert_eq!(idx.remaining_capacity(), before - "example.com".len() - 1);
    }

    #[test]
    fn deleting_a_middle_entry_does_not_break_lookups_around_it() {
        let mut idx = DomainIndex::new(100, 4096);
        idx.insert("a.com");
        idx.insert("ads.example.com");
        idx.insert("b.com");
        assert!(idx.delete("ads.example.com"));

        assert!(idx.contains("a.com"));
        assert!(idx.contains("b.com"));
        assert!(!idx.contains("ads.example.com"));

        assert!(idx.insert("am.com"));
        assert!(idx.contains("am.com"));
        assert!(idx.contains("a.com"));
        assert!(idx.contains("b.com"));
    }

    #[test]
    fn sentinel_slot_is_never_a_valid_hit() {
        let mut idx = DomainIndex::new(100, 4096);
        assert!(!idx.contains("!"));
        assert!(!idx.delete("!"));
    }

    #[test]
    fn clear_resets_to_sentinel_only() {
        let mut idx = DomainIndex::new(100, 4096);
        idx.insert("a.com");
        idx.insert("b.com");
        idx.clear();
        assert_eq!(idx.len(), 0);
        assert!(!idx.contains("a.com"));
    }
}
