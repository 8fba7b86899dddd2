// # Secret Lookup Implementations
//
// This module provides implementations of the SecretLookup trait for
// different secret backends.

pub mod dir;
pub mod memory;

pub use dir::DirSecretLookup;
pub use memory::MemorySecretLookup;
