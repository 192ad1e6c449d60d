//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Unlike dense slot indices, these
//! are the caller-facing ids of the road graph: Overpass node ids are 64-bit
//! OSM ids, so values are sparse and may be large.  Stores translate them to
//! dense slots internally.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw integer value.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }

        impl From<$name> for $inner {
            #[inline(always)]
            fn from(id: $name) -> $inner {
                id.0
            }
        }
    };
}

typed_id! {
    /// Id of a road-graph node (an intersection or way vertex).
    pub struct NodeId(i64);
}

typed_id! {
    /// Id of a directed road-graph edge.
    pub struct EdgeId(i64);
}

typed_id! {
    /// Id of the street an edge belongs to.  Incident reports address edges
    /// by street id.
    pub struct StreetId(i64);
}

typed_id! {
    /// Id of an incident report.  Timestamp-derived and strictly increasing
    /// within one store.
    pub struct ReportId(u64);
}
