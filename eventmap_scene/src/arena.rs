// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seat storage: stable handles and per-entry flags.

use eventmap_geometry::Seat;

/// Identifier for a seat (or figure) in an [`EventMap`](crate::EventMap).
///
/// This is a small, copyable handle made of a slot index and a generation.
///
/// ## Semantics
///
/// - Every add allocates a fresh slot in the current generation.
/// - Entries are never removed individually, so slots are never reused
///   within a generation.
/// - [`EventMap::replace_all`](crate::EventMap::replace_all) starts a new
///   generation; every handle from the previous one becomes stale and no
///   longer resolves, even when its slot index is reused.
///
/// Two handles are equal exactly when they refer to the same entry. Adding the
/// same entry twice with [`EventMap::add_again`](crate::EventMap::add_again)
/// does not mint a new handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct SeatId(u32, u32);

impl SeatId {
    pub(crate) const fn new(slot: u32, generation: u32) -> Self {
        Self(slot, generation)
    }

    /// Slot index within the current generation.
    pub const fn slot(self) -> usize {
        self.0 as usize
    }

    /// Generation the handle was minted in.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Entry flags controlling drawing and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EntryFlags: u8 {
        /// Entry is drawn.
        const VISIBLE  = 0b0000_0001;
        /// Entry participates in hit testing.
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for EntryFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) seat: Seat,
    pub(crate) flags: EntryFlags,
    /// Added as an overlay figure rather than a seat.
    pub(crate) figure: bool,
}

/// Generation-tagged entry table.
#[derive(Clone, Debug)]
pub(crate) struct Arena {
    entries: Vec<Entry>,
    generation: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            generation: 1,
        }
    }
}

impl Arena {
    /// Appends an entry. Returns `None` once slot indices no longer fit `u32`.
    pub(crate) fn insert(&mut self, seat: Seat, flags: EntryFlags, figure: bool) -> Option<SeatId> {
        let slot = u32::try_from(self.entries.len()).ok()?;
        self.entries.push(Entry {
            seat,
            flags,
            figure,
        });
        Some(SeatId::new(slot, self.generation))
    }

    pub(crate) fn get(&self, id: SeatId) -> Option<&Entry> {
        if id.generation() != self.generation {
            return None;
        }
        self.entries.get(id.slot())
    }

    pub(crate) fn get_mut(&mut self, id: SeatId) -> Option<&mut Entry> {
        if id.generation() != self.generation {
            return None;
        }
        self.entries.get_mut(id.slot())
    }

    pub(crate) fn contains(&self, id: SeatId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drops every entry and starts a new generation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use peniko::Color;

    fn seat() -> Seat {
        Seat::rectangle(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK)
    }

    #[test]
    fn handles_resolve_within_their_generation() {
        let mut arena = Arena::default();
        let a = arena.insert(seat(), EntryFlags::default(), false).unwrap();
        let b = arena.insert(seat(), EntryFlags::VISIBLE, true).unwrap();
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(b).map(|e| e.flags), Some(EntryFlags::VISIBLE));

        arena.clear();
        assert!(!arena.contains(a));
        let c = arena.insert(seat(), EntryFlags::default(), false).unwrap();
        // Same slot, different generation.
        assert_eq!(c.slot(), a.slot());
        assert_ne!(c, a);
        assert!(arena.get(a).is_none());
        assert!(arena.contains(c));
    }
}
