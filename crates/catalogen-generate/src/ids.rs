use std::collections::BTreeMap;

use catalogen_core::{IdKind, MetadataStore};

use crate::errors::GenerationError;

/// Monotonic identifier source for one [`IdKind`].
///
/// Starts right above the store maximum captured at startup; identifiers
/// are never reused or rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    kind: IdKind,
    floor: u64,
    last: u64,
}

impl IdAllocator {
    pub fn new(kind: IdKind, floor: u64) -> Self {
        Self {
            kind,
            floor,
            last: floor,
        }
    }

    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    pub fn kind(&self) -> IdKind {
        self.kind
    }

    /// Store maximum the allocator was seeded with.
    pub fn floor(&self) -> u64 {
        self.floor
    }

    /// Last issued identifier, or the floor when nothing was issued.
    pub fn last(&self) -> u64 {
        self.last
    }

    pub fn issued(&self) -> u64 {
        self.last - self.floor
    }
}

/// One allocator per identifier kind.
#[derive(Debug, Clone)]
pub struct Identifiers {
    allocators: [IdAllocator; IdKind::COUNT],
}

impl Identifiers {
    /// Seeds every allocator from the store's current maxima.
    pub fn from_store(store: &dyn MetadataStore) -> Result<Self, GenerationError> {
        let mut floors = [0_u64; IdKind::COUNT];
        for kind in IdKind::ALL {
            floors[kind.index()] = store.max_id(kind)?;
        }
        Ok(Self::from_floors(floors))
    }

    pub fn from_floors(floors: [u64; IdKind::COUNT]) -> Self {
        Self {
            allocators: std::array::from_fn(|i| IdAllocator::new(IdKind::ALL[i], floors[i])),
        }
    }

    pub fn next(&mut self, kind: IdKind) -> u64 {
        self.allocators[kind.index()].next()
    }

    pub fn peek(&self, kind: IdKind) -> u64 {
        self.allocators[kind.index()].last()
    }

    pub fn issued(&self, kind: IdKind) -> u64 {
        self.allocators[kind.index()].issued()
    }

    /// Issued identifier counts keyed by kind name, for run reports.
    pub fn summary(&self) -> BTreeMap<String, u64> {
        self.allocators
            .iter()
            .map(|alloc| {
                let (table, _) = alloc.kind().source();
                (table.to_string(), alloc.issued())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogen_core::MetadataSnapshot;

    #[test]
    fn allocator_is_monotonic_above_floor() {
        let mut alloc = IdAllocator::new(IdKind::Product, 41);
        let issued: Vec<u64> = (0..5).map(|_| alloc.next()).collect();
        assert_eq!(issued, vec![42, 43, 44, 45, 46]);
        assert_eq!(alloc.issued(), 5);
        assert_eq!(alloc.last(), 46);
    }

    #[test]
    fn identifiers_are_seeded_from_store() {
        let mut snapshot = MetadataSnapshot::fresh_install();
        snapshot.max_ids.insert(IdKind::Product, 900);

        let mut ids = Identifiers::from_store(&snapshot).expect("seed identifiers");
        assert_eq!(ids.next(IdKind::Product), 901);
        assert_eq!(ids.next(IdKind::Category), 3);
        assert_eq!(ids.next(IdKind::CustomerGroup), 4);
        assert_eq!(ids.peek(IdKind::MediaGallery), 0);
        assert_eq!(ids.issued(IdKind::Product), 1);
    }
}
