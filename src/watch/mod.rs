// src/watch/mod.rs

//! Filesystem watching for `--watch` mode.
//!
//! This module wires a cross-platform filesystem watcher (`notify`) over
//! the source tree and every assimilated module tree, and turns raw change
//! events into a stream of changed paths. It does **not** know how to
//! rebuild; the application loop consumes the stream and reruns the
//! pipeline.

pub mod watcher;

pub use watcher::{spawn_watcher, WatcherHandle};
