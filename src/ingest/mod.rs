//! Feed clients.
//!
//! Submodules:
//! - `jma` fetches the JMA earthquake report list.

pub mod jma;
