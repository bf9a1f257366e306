//! Stateless effect handlers for the beacon settings store.
//!
//! Production implementations of the contracts defined in `beacon-core`:
//! blob stores (in-memory and filesystem) and the encrypting typed
//! key-value handler that composes over them. No mock handlers here; test
//! doubles live with the tests that need them.

#![forbid(unsafe_code)]

pub mod encrypted;
pub mod filesystem;
pub mod memory;

pub use encrypted::{EncryptedKv, MasterKey};
pub use filesystem::FilesystemBlobHandler;
pub use memory::MemoryBlobHandler;
