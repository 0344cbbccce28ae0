// src/plugins/mod.rs

//! Post-assimilation pipeline stages.
//!
//! These stages transform the file set after the source tree and all
//! submodules have been merged: bundling assets, fixing up output names,
//! and precompressing for the web server.

pub mod concat;
pub mod gzip;
pub mod rename;

pub use concat::Concat;
pub use gzip::Gzip;
pub use rename::Rename;
