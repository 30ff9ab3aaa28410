//! Signup aggregation: resolve the tracked post, collect who reacted, and
//! cross-tabulate them against the tracked roles.

pub mod aggregate;
pub mod hydrate;
pub mod reaction;
pub mod resolver;
pub mod roster;
pub mod table;
