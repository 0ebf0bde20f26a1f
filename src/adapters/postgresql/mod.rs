//! PostgreSQL sink adapter

pub mod client;

pub use client::PostgresSink;
