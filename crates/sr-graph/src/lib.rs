//! `sr-graph` — the street graph and its store.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`model`]     | `Node`, `Edge`                                             |
//! | [`adjacency`] | `AdjacencyIndex` (CSR outgoing-edge index)                 |
//! | [`graph`]     | `Graph` (immutable snapshot + indexes), `GraphStatus`      |
//! | [`store`]     | `GraphStore`, `GraphTxn`, `GenerateOutcome`                |
//! | [`source`]    | `GraphSource` trait, `GridSource`                          |
//! | [`overpass`]  | `OverpassSource`, `bbox_query`                             |
//! | [`persist`]   | JSON `load` / `save`                                       |
//! | [`error`]     | `GraphError`, `GraphResult<T>`                             |

pub mod adjacency;
pub mod error;
pub mod graph;
pub mod model;
pub mod overpass;
pub mod persist;
pub mod source;
pub mod store;


pub use adjacency::AdjacencyIndex;
pub use error::{GraphError, GraphResult};
pub use graph::{Graph, GraphStatus};
pub use model::{DEFAULT_SPEED_LIMIT_KMH, Edge, Node};
pub use overpass::OverpassSource;
pub use source::{GraphSource, GridSource};
pub use store::{GenerateOutcome, GraphStore, GraphTxn};
