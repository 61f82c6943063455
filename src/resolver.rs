//! Route and store resolution over the module tree.
//!
//! Both resolvers are pure passes over an immutable [`crate::tree::ModuleTree`]:
//! each receives a snapshot of a directory's children, classifies them, and
//! builds its own descriptor tree. Nothing mutates the filesystem tree, so
//! the two passes compose in any order.

pub mod route;
pub mod store;

pub use route::{resolve_routes, PropsSpec, Route};
pub use store::{resolve_store, StoreModule, StoreTree};
