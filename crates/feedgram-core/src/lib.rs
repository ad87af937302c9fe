//! Core domain + application logic for the feedgram Telegram bridge.
//!
//! This crate is intentionally framework-agnostic. Telegram and the feed
//! reader's storage layer live behind ports (traits) implemented by the
//! adapter crate and the host application.

pub mod callback;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod format;
pub mod logging;
pub mod messaging;
pub mod storage;

pub use errors::{Error, Result};
