//! Client action layer.
//!
//! Mirrors the server API one action per endpoint: each action performs the
//! HTTP call through [`ApiClient`] and publishes a tagged [`Event`] (success
//! payload or status-coded failure) to the central [`Store`], which views
//! re-render from.

pub mod actions;
pub mod store;

pub use actions::{Actions, ApiClient, ClientError, EducationDraft, ExperienceDraft, ProfileDraft};
pub use store::{ApiFailure, Event, Store};
