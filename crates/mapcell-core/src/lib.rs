//! mapcell core types
//!
//! Shared vocabulary for deferred map cells and the views layered over them.
//!
//! # Core Concepts
//!
//! - [`Mapping`]: insertion-ordered key/value collection produced by a cell
//! - [`MapCell`]: contract a deferred map cell exposes (resolve, replace, bulk merge, reset)
//! - [`Combine`]: additive merge of two values stored under the same key
//!
//! # Example
//!
//! ```rust,ignore
//! use mapcell_core::{MapCell, Mapping};
//!
//! fn snapshot_len<C: MapCell>(cell: &C) -> Result<usize, C::Error> {
//!     Ok(cell.resolve()?.len())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cell;
mod mapping;

pub use cell::MapCell;
pub use mapping::{mapping_of, Combine, CombineError, Mapping};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
