//! DevConnect: a social-network backend and typed API client.
//!
//! Users register, publish posts, comment, and like content; each user owns
//! at most one developer profile. The server exposes a REST API over a
//! SQLite-backed document store; the [`client`] module wraps every endpoint
//! in an action that dispatches tagged events to a central store.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod server;
