//! Fixed-capacity least-recently-used map
//!
//! Backs the per-font shaped-text cache. Entries live in a slab indexed by
//! a hash map; recency order is a doubly-linked list threaded through the
//! slab so hits and evictions stay O(1).

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

const NIL: usize = usize::MAX;

struct Entry<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// LRU cache with a fixed maximum size
pub struct LruCache<K, V> {
    map: HashMap<K, usize>,
    entries: Vec<Entry<K, V>>,
    head: usize,
    tail: usize,
    capacity: usize,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LruCache capacity must be non-zero");
        Self {
            map: HashMap::with_capacity(capacity),
            entries: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    /// Look up `key`, marking the entry most-recently-used on a hit
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = *self.map.get(key)?;
        self.detach(index);
        self.attach_front(index);
        Some(&self.entries[index].value)
    }

    /// Insert or replace `key`, evicting the least-recently-used entry
    /// when the cache is full
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&index) = self.map.get(&key) {
            self.entries[index].value = value;
            self.detach(index);
            self.attach_front(index);
            return;
        }

        let index = if self.map.len() == self.capacity {
            // Reuse the evicted entry's slot.
            let index = self.tail;
            self.detach(index);
            let old_key = std::mem::replace(&mut self.entries[index].key, key.clone());
            self.entries[index].value = value;
            self.map.remove(&old_key);
            index
        } else {
            self.entries.push(Entry {
                key: key.clone(),
                value,
                prev: NIL,
                next: NIL,
            });
            self.entries.len() - 1
        };

        self.map.insert(key, index);
        self.attach_front(index);
    }

    /// Whether `key` is present, without touching recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.map.clear();
        self.entries.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn detach(&mut self, index: usize) {
        let (prev, next) = (self.entries[index].prev, self.entries[index].next);
        if prev != NIL {
            self.entries[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.entries[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.entries[index].prev = NIL;
        self.entries[index].next = NIL;
    }

    fn attach_front(&mut self, index: usize) {
        self.entries[index].next = self.head;
        if self.head != NIL {
            self.entries[self.head].prev = index;
        }
        self.head = index;
        if self.tail == NIL {
            self.tail = index;
        }
    }
}
