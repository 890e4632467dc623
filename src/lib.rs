//! Library crate for userdeck.
//!
//! This crate exposes the building blocks of the TUI:
//! - Remote user directory client (`api`)
//! - Application state and update loop (`app`)
//! - Error and result types (`error`)
//! - The reducer-driven user store (`store`)
//! - UI rendering and widgets (`ui`)
//!
//! It is used by the `userdeck` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod app;
pub mod error;
pub mod store;
pub mod ui;

// Re-export commonly used items at the crate root for convenience
/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
pub use store::{Snapshot, User, UserDraft, UserId, UserStore};
