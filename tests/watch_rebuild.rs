//! Filesystem watching: change events surface on the channel, ignored
//! paths do not.

use std::path::PathBuf;
use std::time::Duration;

use sitesmith::pipeline::IgnorePatterns;
use sitesmith::watch::spawn_watcher;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::Receiver;

use sitesmith_test_utils::fixtures::SiteFixture;
use sitesmith_test_utils::{init_tracing, with_timeout};

/// Receive until a path ending in `suffix` arrives. Directory creation and
/// duplicate modify events for other paths are skipped along the way.
async fn expect_path(rx: &mut Receiver<PathBuf>, suffix: &str) -> PathBuf {
    with_timeout(async {
        loop {
            let path = rx.recv().await.expect("watcher channel closed");
            if path.ends_with(suffix) {
                return path;
            }
        }
    })
    .await
}

/// Let the watcher finish registering its roots before we generate events.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::test]
async fn changes_under_any_root_reach_the_channel() {
    init_tracing();
    let fix = SiteFixture::new();
    fix.mkdir("src").mkdir("inc/normalize");

    let roots = vec![fix.path("src"), fix.path("inc/normalize")];
    let (_watcher, mut rx) = spawn_watcher(roots, IgnorePatterns::empty()).unwrap();
    settle().await;

    fix.write("src/pages/new.md", "fresh");
    expect_path(&mut rx, "pages/new.md").await;

    fix.write("inc/normalize/normalize.css", "body {}");
    expect_path(&mut rx, "normalize.css").await;
}

#[tokio::test]
async fn ignored_paths_never_reach_the_channel() {
    init_tracing();
    let fix = SiteFixture::new();
    fix.mkdir("src");

    let ignore = IgnorePatterns::compile(&["**/*.swp".to_string()]).unwrap();
    let (_watcher, mut rx) = spawn_watcher(vec![fix.path("src")], ignore).unwrap();
    settle().await;

    fix.write("src/notes.swp", "scratch");
    tokio::time::sleep(Duration::from_millis(300)).await;
    match rx.try_recv() {
        Err(TryRecvError::Empty) => {}
        Ok(path) => panic!("ignored path surfaced: {}", path.display()),
        Err(other) => panic!("channel failed: {other}"),
    }

    // The watcher itself is still alive: a real change comes through.
    fix.write("src/real.txt", "content");
    expect_path(&mut rx, "real.txt").await;
}

#[tokio::test]
async fn dropping_the_handle_stops_the_watcher() {
    init_tracing();
    let fix = SiteFixture::new();
    fix.mkdir("src");

    let (watcher, mut rx) = spawn_watcher(vec![fix.path("src")], IgnorePatterns::empty()).unwrap();
    settle().await;
    drop(watcher);

    // With the notify backend gone its callback channel closes, and the
    // forwarding task ends; the receiver eventually reports closure.
    with_timeout(async {
        loop {
            if rx.recv().await.is_none() {
                return;
            }
        }
    })
    .await;
}
