//! Data models behind navigable menus.
//!
//! - [`TreeModel`]: an arena of [`TreeNode`]s built from [`NodeSpec`]s, with
//!   lazy children and a flattened visible sequence.
//! - [`GridModel`]: provider rows described by [`ColumnSpec`]s, with a
//!   stable, identity-preserving sort.
//! - [`Choice`]: option lists for submenus.
//! - [`TreeDebug`]: text dumps for diagnostics.

mod choice;
mod debug;
mod grid_model;
mod node;
mod tree_model;

pub use choice::{Choice, choice_nodes};
pub use debug::{TreeDebug, TreeFormatOptions, TreeStyle};
pub use grid_model::{
    CellActionFn, ColumnSpec, CompareFn, GridModel, IdentityFn, ValueFn, compare_text,
};
pub use node::{
    ActionOutcome, ActivateFn, ChildLoader, DeleteFn, ExpansionState, NodeId, NodeSpec, TreeNode,
};
pub use tree_model::{Materialized, TreeModel};
