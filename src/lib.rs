//! Listing management console for real-estate agents: listing editor,
//! client-side filtering, and the HTTP client for the listing backend.

pub mod api;
pub mod config;
pub mod editor;
pub mod filter;
pub mod models;
pub mod session;
