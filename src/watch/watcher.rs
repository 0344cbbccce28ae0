// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::pipeline::files::normalize_rel;
use crate::pipeline::patterns::IgnorePatterns;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing every root recursively.
///
/// Create, modify, and remove events for files that are not ignored are
/// forwarded as paths on the returned channel; everything else is dropped.
/// Ignore patterns are matched against the path relative to whichever root
/// contains it.
pub fn spawn_watcher(
    roots: Vec<PathBuf>,
    ignore: IgnorePatterns,
) -> Result<(WatcherHandle, mpsc::Receiver<PathBuf>)> {
    // Canonicalize once so event paths strip cleanly.
    let roots: Vec<PathBuf> = roots
        .into_iter()
        .map(|root| root.canonicalize().unwrap_or(root))
        .collect();

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (path_tx, path_rx) = mpsc::channel::<PathBuf>(256);

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("sitesmith: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("sitesmith: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    for root in &roots {
        watcher.watch(root, RecursiveMode::Recursive)?;
        info!(root = %root.display(), "watching");
    }

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_relevant(&event.kind) {
                continue;
            }
            for path in event.paths {
                let Some(rel) = relativize(&roots, &path) else {
                    continue;
                };
                if ignore.is_match(&rel) {
                    debug!(path = %rel, "change ignored");
                    continue;
                }
                debug!(path = %rel, "file changed");
                if path_tx.send(path).await.is_err() {
                    // Receiver gone, the application loop has shut down.
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok((WatcherHandle { _inner: watcher }, path_rx))
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Path relative to the first root containing it, in `/`-separated form.
/// An event on a root directory itself relativizes to the empty string and
/// is dropped here rather than matched against the ignore set.
fn relativize(roots: &[PathBuf], path: &Path) -> Option<String> {
    roots.iter().find_map(|root| {
        let rel = normalize_rel(path.strip_prefix(root).ok()?);
        (!rel.is_empty()).then_some(rel)
    })
}
