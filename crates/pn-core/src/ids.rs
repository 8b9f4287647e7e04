use core::fmt;
use core::num::NonZeroU32;

use crate::error::{PnError, PnResult};

macro_rules! compact_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Create an id from a 0-based index by storing index+1.
            pub fn from_index(index: u32) -> Self {
                let raw = index.checked_add(1).and_then(NonZeroU32::new);
                Self(raw.unwrap_or(NonZeroU32::MAX))
            }

            /// Recover the 0-based index.
            pub fn index(self) -> u32 {
                self.0.get() - 1
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.index())
            }
        }
    };
}

compact_id!(
    /// One transport segment (pipe). Assigned by the host, unique across the simulation.
    SegmentId,
    "Segment"
);

compact_id!(
    /// One generation of a connected pipe network. Never reused.
    NetworkId,
    "Network"
);

compact_id!(
    /// Spatial anchor (grid) a network lives on.
    GridId,
    "Grid"
);

/// Hands out fresh [`NetworkId`]s.
///
/// Split and merge always produce new generations, so ids only ever increase.
#[derive(Debug, Default, Clone)]
pub struct NetworkIdAllocator {
    next: u32,
}

impl NetworkIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue handing out ids after `issued` have been used.
    pub fn resume(issued: u32) -> Self {
        Self { next: issued }
    }

    /// Next fresh id. Fails once the id space is used up instead of repeating one.
    pub fn allocate(&mut self) -> PnResult<NetworkId> {
        if self.next == u32::MAX {
            return Err(PnError::Invariant {
                what: "network id space exhausted",
            });
        }
        let id = NetworkId::from_index(self.next);
        self.next += 1;
        Ok(id)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}
