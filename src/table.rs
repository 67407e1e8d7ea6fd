//! Fixed capacity co-occurrence table
//!
//! Maps `(target, context)` token id pairs to an accumulated weight using
//! open addressing with linear probing. The capacity is chosen once at
//! creation; there is no resizing. When a new distinct key cannot be placed
//! the table answers with [`CoocError::Full`] and leaves itself untouched.

use crate::errors::{CoocError, Result};
use crate::types::{Entry, TokenId};

/// One slot of the table, either empty or holding a key and its weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot {
    Empty,
    Occupied {
        target: TokenId,
        context: TokenId,
        weight: f64,
    },
}

/// Outcome of probing the table for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The key already lives at this index
    Found(usize),
    /// The key is absent and may be stored at this index
    Insertable(usize),
    /// The key is absent and there is no room for it
    Full,
}

#[derive(Debug, Clone)]
pub struct CooccurrenceTable {
    slots: Vec<Slot>,
    len: usize,
}

impl CooccurrenceTable {

    /// Allocate `capacity` empty slots
    pub fn new(capacity: usize) -> Result<Self> {

        if capacity == 0 {
            return Err(CoocError::InvalidCapacity);
        }

        Ok(Self {
            slots: vec![Slot::Empty; capacity],
            len: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of distinct keys stored
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Add `amount` to the weight of `(target, context)`, inserting the key if
    /// it is new. Returns the index of the slot holding the key.
    pub fn increment(&mut self, target: TokenId, context: TokenId, amount: f64) -> Result<usize> {

        if !(amount.is_finite() && amount > 0.0) {
            return Err(CoocError::InvalidAmount { amount });
        }

        match self.find_slot(target, context) {
            Probe::Found(index) => {
                if let Slot::Occupied { weight, .. } = &mut self.slots[index] {
                    *weight += amount;
                }
                Ok(index)
            }
            Probe::Insertable(index) => {
                self.slots[index] = Slot::Occupied { target, context, weight: amount };
                self.len += 1;
                Ok(index)
            }
            Probe::Full => Err(CoocError::Full { capacity: self.capacity() }),
        }
    }

    /// Locate the slot for `(target, context)`.
    ///
    /// Probing starts at the hashed position and walks forward one slot at a
    /// time, wrapping to zero, for at most `capacity` steps. An empty slot is
    /// only handed out while the table still has room for another key.
    pub fn find_slot(&self, target: TokenId, context: TokenId) -> Probe {

        let capacity = self.capacity();
        let start = (hash_pair(target, context) % capacity as u64) as usize;

        for step in 0..capacity {
            let index = (start + step) % capacity;
            match self.slots[index] {
                Slot::Occupied { target: t, context: c, .. } if t == target && c == context => {
                    return Probe::Found(index)
                }
                Slot::Occupied { .. } => continue,
                Slot::Empty => {
                    if self.len >= capacity {
                        return Probe::Full;
                    }
                    return Probe::Insertable(index)
                }
            }
        }

        Probe::Full
    }

    /// Accumulated weight of `(target, context)`, if the key is present
    pub fn get(&self, target: TokenId, context: TokenId) -> Option<f64> {
        match self.find_slot(target, context) {
            Probe::Found(index) => match self.slots[index] {
                Slot::Occupied { weight, .. } => Some(weight),
                Slot::Empty => None,
            },
            _ => None,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Occupied slots as entries, in slot order
    pub fn iter(&self) -> impl Iterator<Item = Entry> + '_ {
        self.slots.iter().filter_map(|slot| match *slot {
            Slot::Occupied { target, context, weight } => Some(Entry { target, context, weight }),
            Slot::Empty => None,
        })
    }

    /// Consume the table, keeping only its entries
    pub fn into_entries(self) -> Vec<Entry> {
        self.iter().collect()
    }
}

/// Ordered pair hash: the classic `31 * (31 + target) + context` tuple hash,
/// followed by a splitmix64 finalizer so neighbouring ids spread over the
/// whole table. Swapping target and context changes the hash.
pub fn hash_pair(target: TokenId, context: TokenId) -> u64 {

    let mut h: u64 = 1;
    h = h.wrapping_mul(31).wrapping_add(target as u64);
    h = h.wrapping_mul(31).wrapping_add(context as u64);

    h ^= h >> 30;
    h = h.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    h ^= h >> 27;
    h = h.wrapping_mul(0x94d0_49bb_1331_11eb);
    h ^= h >> 31;
    h
}
