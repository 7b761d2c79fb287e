//! Core library for the campus turnstile access-control console.
//!
//! The crate models badge holders and their access history, persists them
//! to a small key-value store and exposes the verification, filtering,
//! reporting and export operations used by the `turnstile` binary.

pub mod access_log;
pub mod app;
pub mod console;
pub mod control;
pub mod export;
pub mod filter;
pub mod fixtures;
pub mod models;
pub mod navigation;
pub mod privileges;
pub mod reports;
pub mod session;
pub mod settings;
pub mod store;
pub mod users;
pub mod verification;
