//! `tp-network`: road topology, edge weights, and routing.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`network`]     | `Road`, `Intersection`, `RoadNetwork`, `RoadNetworkBuilder`|
//! | [`embedding`]   | breadth-first planar embedding and boundary detection      |
//! | [`weight`]      | `IntersectionKind`, `VehicleProfile`, `edge_weight`        |
//! | [`router`]      | `Router` trait, `Route`, `DijkstraRouter`                  |
//! | [`all_pairs`]   | `AllPairs` (Floyd-Warshall distance and next-hop tables)   |
//! | [`error`]       | `NetworkError`, `NetworkResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Runs each Floyd-Warshall pivot step on Rayon.             |
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.        |

pub mod all_pairs;
pub mod embedding;
pub mod error;
pub mod network;
pub mod router;
pub mod weight;

#[cfg(test)]
mod tests;

pub use all_pairs::AllPairs;
pub use error::{NetworkError, NetworkResult};
pub use network::{CrossRecord, Intersection, Road, RoadNetwork, RoadNetworkBuilder, RoadRecord};
pub use router::{DijkstraRouter, Route, Router};
pub use weight::{IntersectionKind, VehicleProfile};
