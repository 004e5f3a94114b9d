//! Remote knowledge base client module
//!
//! HTTP gateway to the knowledge base REST API and its wire types.

mod client;
pub mod types;

pub use client::ApiClient;
