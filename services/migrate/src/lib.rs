//! Schema migrations for the slogans service
//!
//! The revisions live in [`versions`]; the `migrate` binary applies them.

pub mod versions;

pub use versions::{LOCKED_PASSWORD, chain};
