//! Google Sheets source adapter

pub mod auth;
pub mod client;
pub mod models;
pub mod traits;

pub use client::GoogleSheetsSource;
pub use traits::RowSource;
