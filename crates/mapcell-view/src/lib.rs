//! mapcell view
//!
//! Presents a deferred map cell through the conventional mutable-map
//! contract, so code written against lookups, inserts and removals can read
//! and write a value that is computed and change-tracked elsewhere.
//!
//! - [`MapView`]: the adapter
//! - [`Entries`]: detached snapshot returned by [`MapView::entries`]
//!
//! # Example
//!
//! ```rust,ignore
//! use mapcell_deferred::DeferredMapCell;
//! use mapcell_view::MapView;
//! use std::rc::Rc;
//!
//! let cell = Rc::new(DeferredMapCell::<String, i32>::new("env"));
//! let mut view = MapView::new(Rc::clone(&cell));
//!
//! view.insert("x".into(), 1)?;
//! assert_eq!(view.remove("x")?, Some(1));
//! assert_eq!(cell.change_count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod entries;
mod view;

pub use entries::Entries;
pub use view::MapView;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
