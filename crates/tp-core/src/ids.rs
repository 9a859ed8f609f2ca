//! Dense ids for roads, crosses and vehicles.
//!
//! Records arrive with sparse external ids.  The network and the fleet
//! re-index them densely in ascending external-id order, so these ids are
//! plain `Vec` indices and "ascending id" orderings are index orderings.
//! The external id stays on the entity for I/O and log lines.

use std::fmt;

/// Declares a `Copy` newtype over an integer index, with a `MAX` sentinel
/// and conversions to and from `usize`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Placeholder for an unresolved id; never a real index.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Position in the owning table.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// [`Self::INVALID`].
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Dense index of a road segment.
    pub struct RoadId(u32);
}

typed_id! {
    /// Dense index of an intersection ("cross").
    pub struct CrossId(u32);
}

typed_id! {
    /// Dense index of a vehicle in the registry.
    pub struct VehicleId(u32);
}
