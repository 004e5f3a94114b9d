//! Core module - Business logic
//!
//! Sessions, the search fan-out, tree and collection readers, keyword
//! expansion and the markdown renderers. Nothing here knows about
//! transports; remote calls go through [`kb::KnowledgeApi`].

pub mod collection;
pub mod error;
pub mod format;
pub mod kb;
pub mod keywords;
pub mod result;
pub mod search;
pub mod session;
pub mod tree;

#[cfg(test)]
pub mod testing;
