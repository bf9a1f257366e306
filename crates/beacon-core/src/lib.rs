//! Core contracts and pure logic for the beacon settings store.
//!
//! This crate defines **what** effects the settings layer performs; handlers
//! in `beacon-effects` define **how**. It also hosts pure domain logic
//! (wake-word sanitization and its wire codec) with no I/O.
//!
//! # Architecture Constraints
//!
//! - YES effect trait definitions and error types
//! - YES pure, synchronous domain functions
//! - NO handler implementations (those live in `beacon-effects`)
//! - NO observable state (that lives in `beacon-prefs`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod blob;
pub mod kv;
pub mod wake_words;

pub use blob::BlobStorageEffects;
pub use kv::{KvError, SecureKvEffects};
