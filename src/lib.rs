// src/lib.rs

//! Member Tracker Library
//!
//! Scrapes an aggregate member count (and optional per-world counts) from a
//! web page and keeps a single Discord embed message in sync with it.

pub mod chat;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
