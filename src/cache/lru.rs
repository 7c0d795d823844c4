//! LRU List Module
//!
//! Recency list backing the cache's eviction policy.

// == LRU List ==
/// Doubly-linked recency list stored in a slab.
///
/// Slots are addressed by a stable `usize` handle, which the cache keeps in its
/// key index. All operations are O(1).
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a value as most recently used and returns its handle.
    pub fn push_front(&mut self, value: T) -> usize {
        let node = Node {
            value,
            prev: None,
            next: self.head,
        };

        let handle = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            self.node_mut(old_head).prev = Some(handle);
        }
        self.head = Some(handle);
        if self.tail.is_none() {
            self.tail = Some(handle);
        }
        self.len += 1;
        handle
    }

    // == Touch ==
    /// Marks a handle as recently used (moves it to the front).
    pub fn move_to_front(&mut self, handle: usize) {
        if self.head == Some(handle) {
            return;
        }
        self.unlink(handle);

        let old_head = self.head;
        {
            let node = self.node_mut(handle);
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            self.node_mut(h).prev = Some(handle);
        }
        self.head = Some(handle);
        if self.tail.is_none() {
            self.tail = Some(handle);
        }
    }

    // == Remove ==
    /// Removes a handle from the list, returning its value.
    pub fn remove(&mut self, handle: usize) -> Option<T> {
        self.slots.get(handle)?.as_ref()?;
        self.unlink(handle);
        let node = self.slots[handle].take()?;
        self.free.push(handle);
        self.len -= 1;
        Some(node.value)
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used value.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Peek Oldest ==
    /// Returns the least recently used value without removing it.
    pub fn peek_back(&self) -> Option<&T> {
        self.tail.and_then(|t| self.get(t))
    }

    /// Returns the most recently used value without moving anything.
    pub fn peek_front(&self) -> Option<&T> {
        self.head.and_then(|h| self.get(h))
    }

    pub fn get(&self, handle: usize) -> Option<&T> {
        self.slots
            .get(handle)
            .and_then(|slot| slot.as_ref())
            .map(|node| &node.value)
    }

    pub fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.slots
            .get_mut(handle)
            .and_then(|slot| slot.as_mut())
            .map(|node| &mut node.value)
    }

    /// Iterates values from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Clear ==
    /// Drops every node and releases the slab.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn unlink(&mut self, handle: usize) {
        let (prev, next) = {
            let node = self.node_mut(handle);
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    // Handles come from this list, so a vacant slot here is a logic error.
    fn node_mut(&mut self, handle: usize) -> &mut Node<T> {
        match self.slots[handle].as_mut() {
            Some(node) => node,
            None => unreachable!("lru handle {handle} points at a vacant slot"),
        }
    }
}

/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.cursor?;
        let node = self.list.slots[handle].as_ref()?;
        self.cursor = node.next;
        Some(&node.value)
    }
}
