//! Snowflake sink adapter

pub mod client;
pub mod models;

pub use client::SnowflakeSink;
