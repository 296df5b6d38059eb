//! Resource tree routing.
//!
//! Path patterns compile into a segment tree: literal children matched
//! exactly, plus at most one variable child per node for `{name}` or `{}`
//! capture segments. Resolution walks the request path one segment at a time,
//! preferring literal matches, and lands on a per-verb bucket of handler
//! overloads.

mod tree;


pub use tree::{Resolution, ResourceTree};
