//! Arena allocator for search nodes.
//!
//! Slots are carved sequentially out of blocks that double in size whenever the current one
//! fills up. Discarded slots are threaded onto a free list and handed out again before any new
//! slot is carved. Blocks are only released when the pool itself is dropped, so a [NodeId]
//! stays valid (though possibly recycled) for the lifetime of its pool.
use log::debug;
use std::ops::{Index, IndexMut};

/// Initial number of slots reserved by a pool.
pub const DEFAULT_POOL_CAPACITY: usize = 128;

/// Handle to a slot of a [NodePool].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    block: u32,
    slot: u32,
}

#[derive(Debug)]
enum Slot<T> {
    Live(T),
    Free { next: Option<NodeId> },
}

#[derive(Debug)]
struct Block<T> {
    slots: Vec<Slot<T>>,
    size: usize,
}

impl<T> Block<T> {
    fn new(size: usize) -> Block<T> {
        Block {
            slots: Vec::with_capacity(size),
            size,
        }
    }
    fn is_exhausted(&self) -> bool {
        self.slots.len() >= self.size
    }
}

#[derive(Debug)]
pub struct NodePool<T> {
    /// Every block ever allocated, the last one being carved from.
    blocks: Vec<Block<T>>,
    free_head: Option<NodeId>,
    free_len: usize,
    carved: usize,
}

impl<T> Default for NodePool<T> {
    fn default() -> Self {
        NodePool::with_capacity(DEFAULT_POOL_CAPACITY)
    }
}

impl<T> NodePool<T> {
    pub fn new() -> NodePool<T> {
        NodePool::default()
    }

    /// Creates a pool whose first block holds `initial` slots (at least one).
    pub fn with_capacity(initial: usize) -> NodePool<T> {
        NodePool {
            blocks: vec![Block::new(initial.max(1))],
            free_head: None,
            free_len: 0,
            carved: 0,
        }
    }

    /// Stores `value` in a recycled slot if one is available, otherwise in a freshly carved one.
    pub fn obtain(&mut self, value: T) -> NodeId {
        if let Some(id) = self.free_head {
            let slot = &mut self.blocks[id.block as usize].slots[id.slot as usize];
            self.free_head = match slot {
                Slot::Free { next } => *next,
                Slot::Live(_) => unreachable!("free list points at live slot {:?}", id),
            };
            *slot = Slot::Live(value);
            self.free_len -= 1;
            return id;
        }
        let current = self.blocks.len() - 1;
        if self.blocks[current].is_exhausted() {
            let size = 2 * self.blocks[current].size;
            debug!(
                "Node pool block {} exhausted, allocating block of {} slots",
                current, size
            );
            self.blocks.push(Block::new(size));
        }
        let block = self.blocks.len() - 1;
        let slots = &mut self.blocks[block].slots;
        let id = NodeId {
            block: block as u32,
            slot: slots.len() as u32,
        };
        slots.push(Slot::Live(value));
        self.carved += 1;
        id
    }

    /// Returns a slot to the free list. The id must not be used again until handed out anew.
    pub fn discard(&mut self, id: NodeId) {
        let slot = &mut self.blocks[id.block as usize].slots[id.slot as usize];
        debug_assert!(
            matches!(slot, Slot::Live(_)),
            "node slot {:?} discarded twice",
            id
        );
        *slot = Slot::Free {
            next: self.free_head,
        };
        self.free_head = Some(id);
        self.free_len += 1;
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.blocks.get(id.block as usize)?.slots.get(id.slot as usize)? {
            Slot::Live(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self
            .blocks
            .get_mut(id.block as usize)?
            .slots
            .get_mut(id.slot as usize)?
        {
            Slot::Live(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Number of slots ever carved out of the blocks.
    pub fn carved(&self) -> usize {
        self.carved
    }

    /// Number of slots currently waiting on the free list.
    pub fn free_len(&self) -> usize {
        self.free_len
    }

    pub fn live_len(&self) -> usize {
        self.carved - self.free_len
    }

    /// Number of slots reserved over all blocks, carved or not.
    pub fn capacity(&self) -> usize {
        self.blocks.iter().map(|b| b.size).sum()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Walks the free list from its head.
    pub fn free_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.free_head, move |id| {
            match &self.blocks[id.block as usize].slots[id.slot as usize] {
                Slot::Free { next } => *next,
                Slot::Live(_) => None,
            }
        })
    }
}

impl<T> Index<NodeId> for NodePool<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("node slot {:?} accessed after discard", id),
        }
    }
}

impl<T> IndexMut<NodeId> for NodePool<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("node slot {:?} accessed after discard", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carves_sequentially_then_doubles() {
        let mut pool = NodePool::with_capacity(2);
        let ids: Vec<NodeId> = (0..7).map(|i| pool.obtain(i)).collect();
        // Blocks of 2, 4 and 8 slots.
        assert_eq!(pool.block_count(), 3);
        assert_eq!(pool.capacity(), 14);
        assert_eq!(pool.carved(), 7);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(pool[*id], i);
        }
    }

    #[test]
    fn discarded_slots_are_reused_first() {
        let mut pool = NodePool::with_capacity(4);
        let a = pool.obtain('a');
        let b = pool.obtain('b');
        pool.discard(a);
        pool.discard(b);
        assert_eq!(pool.free_len(), 2);
        // Last in, first out.
        assert_eq!(pool.obtain('c'), b);
        assert_eq!(pool.obtain('d'), a);
        assert_eq!(pool.free_len(), 0);
        assert_eq!(pool.carved(), 2);
        assert_eq!(pool[a], 'd');
        assert_eq!(pool[b], 'c');
    }

    #[test]
    fn discarded_slot_is_no_longer_readable() {
        let mut pool = NodePool::new();
        let id = pool.obtain(5u64);
        pool.discard(id);
        assert!(pool.get(id).is_none());
        assert!(pool.get_mut(id).is_none());
    }

    #[test]
    #[should_panic]
    fn indexing_discarded_slot_panics() {
        let mut pool = NodePool::new();
        let id = pool.obtain(1u8);
        pool.discard(id);
        let _value: u8 = pool[id];
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut pool: NodePool<i32> = NodePool::with_capacity(0);
        assert_eq!(pool.capacity(), 1);
        pool.obtain(1);
        pool.obtain(2);
        assert_eq!(pool.capacity(), 3);
    }

    #[test]
    fn free_list_walk_matches_count() {
        let mut pool = NodePool::with_capacity(3);
        let ids: Vec<NodeId> = (0..10).map(|i| pool.obtain(i)).collect();
        for id in ids.iter().step_by(3) {
            pool.discard(*id);
        }
        let free: Vec<NodeId> = pool.free_ids().collect();
        assert_eq!(free.len(), pool.free_len());
        assert_eq!(pool.live_len() + pool.free_len(), pool.carved());
        assert_eq!(free, vec![ids[9], ids[6], ids[3], ids[0]]);
    }
}
