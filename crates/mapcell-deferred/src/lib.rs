//! Deferred map cell
//!
//! Reference implementation of [`MapCell`](mapcell_core::MapCell):
//! - Lazy values from providers, with a convention used while unset
//! - Queued additions merged at resolution through a [`MergeStrategy`](mapcell_merge::MergeStrategy)
//! - Validation and entry limits on every write
//! - Finalization and change disallowing
//! - Change history and listeners
//!
//! # Example
//!
//! ```rust,ignore
//! use mapcell_deferred::{CellConfig, DeferredMapCell};
//! use mapcell_merge::MergeKind;
//!
//! let cell: DeferredMapCell<String, u32> =
//!     DeferredMapCell::from_config(CellConfig::new("hits").with_merge(MergeKind::Additive));
//!
//! cell.put("get".into(), 1)?;
//! cell.put_provider("get".into(), || Ok(2))?;
//! assert_eq!(cell.resolve()?["get"], 3);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cell;
mod config;
mod error;
mod events;
mod source;

pub use cell::DeferredMapCell;
pub use config::{CellConfig, ConfigError, DEFAULT_HISTORY_CAPACITY};
pub use error::{CellError, CellResult};
pub use events::{ChangeEvent, ChangeKind, ChangeLog, SubscriptionId};
pub use source::{MapProvider, ValueProvider, WriteLock};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
