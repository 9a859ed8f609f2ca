//! `tp-io`: the file formats around the planner.
//!
//! # Input files
//!
//! Four plain-text files, one record per line.  Lines starting with `#` and
//! blank lines are skipped, each record may be wrapped in parentheses, and
//! fields are comma-separated integers:
//!
//! | File          | Record                                                        |
//! |---------------|---------------------------------------------------------------|
//! | roads         | `(id, length, speed, lanes, from, to, duplex)`                |
//! | intersections | `(id, north, east, south, west)`, `-1` for an empty slot      |
//! | cars          | `(id, from, to, speed, planTime, priority, preset)`           |
//! | preset routes | `(carId, startTime, roadId, roadId, ...)`                     |
//!
//! # Output file
//!
//! [`write_answer`] emits `(carId, startTime, roadId, ...)` for every vehicle
//! that was routed by the planner rather than by a preset route.

pub mod answer;
pub mod error;
pub mod records;

#[cfg(test)]
mod tests;

pub use answer::{write_answer, write_answer_file};
pub use error::{IoError, IoResult};
pub use records::{
    load_cars, load_cars_reader, load_crosses, load_crosses_reader, load_presets, load_presets_reader,
    load_roads, load_roads_reader,
};
