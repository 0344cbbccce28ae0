//! The concat, rename, and gzip stages, plus a full build assembled from a
//! configuration file the way `run` would do it.

use std::io::Read as _;
use std::path::Path;

use flate2::read::GzDecoder;
use sitesmith::assemble_pipeline;
use sitesmith::fs::RealFileSystem;
use sitesmith::pipeline::{
    BuildContext, BuildFile, BuildFileSet, IgnorePatterns, Plugin, SiteMetadata,
};
use sitesmith::plugins::{Concat, Gzip};
use sitesmith_test_utils::configs::site_config;
use sitesmith_test_utils::fixtures::SiteFixture;
use sitesmith_test_utils::{init_tracing, with_timeout};

/// Run a single stage over an in-memory set. Stages under test here never
/// touch the context, so a throwaway one is fine.
async fn run_stage(
    plugin: &dyn Plugin,
    files: &mut BuildFileSet,
) -> sitesmith::errors::Result<()> {
    let mut metadata = SiteMetadata::new();
    let ignore = IgnorePatterns::empty();
    let fs = RealFileSystem;
    let ctx = BuildContext {
        metadata: &mut metadata,
        working_dir: Path::new("."),
        ignore: &ignore,
        fs: &fs,
    };
    plugin.run(files, ctx).await
}

#[tokio::test]
async fn concat_joins_in_pattern_then_key_order() {
    init_tracing();
    let mut files = BuildFileSet::new();
    files.insert("s/normalize.css", BuildFile::new("norm"));
    files.insert("css/b.css", BuildFile::new("b"));
    files.insert("css/a.css", BuildFile::new("a"));
    files.insert("index.html", BuildFile::new("page"));

    let concat = Concat::new(["s/normalize.css", "css/*.css"], "css/site.css").unwrap();
    run_stage(&concat, &mut files).await.unwrap();

    // The literal pattern comes first, then glob matches in key order.
    assert_eq!(files.get("css/site.css").unwrap().contents, b"norm\na\nb");
    assert!(!files.contains("s/normalize.css"));
    assert!(!files.contains("css/a.css"));
    assert!(!files.contains("css/b.css"));
    assert!(files.contains("index.html"));
}

#[tokio::test]
async fn concat_missing_literal_input_is_an_error() {
    init_tracing();
    let mut files = BuildFileSet::new();
    files.insert("index.html", BuildFile::new("page"));

    let concat = Concat::new(["css/app.css"], "css/site.css").unwrap();
    let err = run_stage(&concat, &mut files).await.unwrap_err();
    assert!(err.to_string().contains("css/app.css"), "error was {err}");
    // The set is untouched on failure.
    assert!(files.contains("index.html"));
    assert!(!files.contains("css/site.css"));
}

#[tokio::test]
async fn concat_glob_matching_nothing_still_writes_output() {
    init_tracing();
    let mut files = BuildFileSet::new();
    files.insert("index.html", BuildFile::new("page"));

    let concat = Concat::new(["css/*.css"], "css/site.css").unwrap();
    run_stage(&concat, &mut files).await.unwrap();

    assert_eq!(files.get("css/site.css").unwrap().contents, b"");
    assert!(files.contains("index.html"));
}

#[tokio::test]
async fn gzip_adds_decompressable_siblings() {
    init_tracing();
    let mut files = BuildFileSet::new();
    files.insert("index.html", BuildFile::new("<html>hello</html>"));
    files.insert("notes.txt", BuildFile::new("plain"));

    let gzip = Gzip::new(["**/*.html"]).unwrap();
    run_stage(&gzip, &mut files).await.unwrap();

    assert!(files.contains("index.html"));
    assert!(!files.contains("notes.txt.gz"));

    let compressed = &files.get("index.html.gz").unwrap().contents;
    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut restored = Vec::new();
    decoder.read_to_end(&mut restored).unwrap();
    assert_eq!(restored, b"<html>hello</html>");
}

/// The whole program path: a config file's worth of settings assembled into
/// a pipeline, run twice against a real site layout.
#[tokio::test]
async fn assembled_pipeline_builds_a_complete_site() {
    init_tracing();
    let fix = SiteFixture::new();
    fix.write(
        "src/index.html.hbs",
        "+++\ntitle = \"Home\"\n+++\n<html>home</html>",
    )
    .write("src/css/a.css", "a")
    .write("src/css/b.css", "b")
    .write("src/junk.swp", "scratch")
    .write("inc/normalize/normalize.css", "norm");

    let cfg = site_config(
        r#"
        [site]
        title = "e2e"

        [build]
        ignore = ["**/*.swp"]

        [submodules."inc/normalize"]
        include = "normalize.css"
        dest = "s"

        [submodules."inc/gen"]
        include = "build/**"
        dest = "gen"
        precmd = ["sh", "-c", "mkdir -p build && printf g > build/g.txt && echo build"]
        capture_stdout_to = "GEN_DIR"

        [concat]
        files = ["s/normalize.css", "css/*.css"]
        output = "css/site.css"

        [[rename]]
        pattern = "**/*.hbs"
        strip_suffix = ".hbs"

        [gzip]
        patterns = ["**/*.html"]
        "#,
    );
    fix.mkdir("inc/gen");

    let pipeline = assemble_pipeline(&cfg, fix.root()).unwrap();
    assert_eq!(
        pipeline.stage_names(),
        ["submodules", "concat", "rename", "gzip"]
    );

    let first = with_timeout(pipeline.build()).await.unwrap();

    // Concat consumed its inputs and wrote the bundle.
    assert_eq!(fix.read_to_string("rendered/css/site.css"), "norm\na\nb");
    assert!(!fix.exists("rendered/css/a.css"));
    assert!(!fix.exists("rendered/s/normalize.css"));

    // Rename ran before gzip, so the compressed name matches the final key.
    assert_eq!(fix.read_to_string("rendered/index.html"), "<html>home</html>");
    assert!(!fix.exists("rendered/index.html.hbs"));
    assert!(!fix.exists("rendered/index.html.hbs.gz"));

    let gz = fix.read("rendered/index.html.gz");
    let mut decoder = GzDecoder::new(gz.as_slice());
    let mut restored = Vec::new();
    decoder.read_to_end(&mut restored).unwrap();
    assert_eq!(restored, b"<html>home</html>");

    // The generator module's output was merged under its dest prefix.
    assert_eq!(fix.read_to_string("rendered/gen/build/g.txt"), "g");

    // Ignored files never entered the set.
    assert!(!fix.exists("rendered/junk.swp"));

    let second = with_timeout(pipeline.build()).await.unwrap();
    assert_eq!(first, second);
}
