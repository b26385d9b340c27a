//! mapcell merge strategies
//!
//! Pluggable semantics for merging a batch of entries into a cell's value.
//!
//! # Core Concepts
//!
//! - [`MergeStrategy`]: Core trait for bulk-merge semantics
//! - [`OverwriteStrategy`]: Incoming entries win (plain map semantics)
//! - [`KeepExistingStrategy`]: Existing entries win
//! - [`SingleWriterStrategy`]: Overlapping keys are a conflict
//! - [`AdditiveStrategy`]: Overlapping values are combined
//! - [`MergeKind`]: Serializable selector for the strategies above
//!
//! # Example
//!
//! ```rust,ignore
//! use mapcell_core::mapping_of;
//! use mapcell_merge::{MergeKind, MergeStrategy};
//!
//! let strategy = MergeKind::Additive.strategy::<&str, u32>();
//! let mut base = mapping_of([("hits", 1)]);
//! let report = strategy.merge(&mut base, mapping_of([("hits", 2)]))?;
//! assert_eq!(base["hits"], 3);
//! assert_eq!(report.combined, 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod additive;
mod keep_existing;
mod overwrite;
mod registry;
mod single_writer;
mod strategy;

pub use additive::AdditiveStrategy;
pub use keep_existing::KeepExistingStrategy;
pub use overwrite::OverwriteStrategy;
pub use registry::MergeKind;
pub use single_writer::SingleWriterStrategy;
pub use strategy::{
    ConflictDiagnostic, ConflictKind, MergeError, MergeReport, MergeStrategy,
    ResolutionSuggestion,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
