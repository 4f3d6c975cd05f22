//! Horizon Narrate - keyboard and screen-reader navigation for game menus.
//!
//! This is the main crate. It turns hierarchical or tabular game data into
//! menus a blind player can walk with the keyboard:
//!
//! - [`model`]: node arenas with lazy children, sortable grids, option lists
//! - [`nav`]: cursor state machines following the WAI-ARIA tree pattern
//! - [`search`]: typeahead search with rollback on zero matches
//! - [`announce`]: spoken text formatting plus speech and audio sinks
//! - [`session`]: per-menu sessions driven by [`KeyAction`]s
//!
//! Core plumbing (signals, logging, the host-facing [`Error`]) is
//! re-exported from `horizon-narrate-core`.
//!
//! # Example
//!
//! ```
//! use horizon_narrate::model::NodeSpec;
//! use horizon_narrate::nav::TreeNavigator;
//!
//! let mut nav = TreeNavigator::new(vec![
//!     NodeSpec::branch("Health", vec![NodeSpec::leaf("Torso"), NodeSpec::leaf("Head")]),
//!     NodeSpec::lazy("Needs", || Ok(vec![NodeSpec::leaf("Food: 80%")])),
//! ]);
//!
//! nav.expand().unwrap();
//! nav.expand().unwrap();
//! assert_eq!(nav.current().map(|n| n.label()), Some("Torso"));
//! assert_eq!(nav.sibling_position(), Some((1, 2)));
//! ```

pub use horizon_narrate_core::*;

pub mod action;
pub mod announce;
pub mod config;
mod error;
pub mod model;
pub mod nav;
pub mod search;
pub mod session;

pub use action::KeyAction;
pub use config::NarrationConfig;
pub use error::{ProviderError, Rejection};
pub use nav::{NavEvent, NavResult};
