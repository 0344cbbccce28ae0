// src/pipeline/front_matter.rs

//! TOML front matter handling.
//!
//! Source files may open with a `+++` delimited TOML block. The block is
//! parsed into per-file metadata and stripped from the contents. Files that
//! do not start with a `+++` line pass through untouched, so binary assets
//! are safe.

use std::path::Path;

use crate::errors::{Result, SitesmithError};
use crate::fs::FileSystem;
use crate::pipeline::files::BuildFile;

const DELIMITER: &str = "+++";

/// A file split into front matter metadata and remaining body.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitFile {
    pub metadata: toml::Table,
    pub body: Vec<u8>,
}

/// Split `+++` delimited TOML front matter from raw file contents.
///
/// Returns an error message when an opening delimiter is never closed or
/// the block is not valid TOML. A file without an opening delimiter line
/// comes back with empty metadata and its contents unchanged.
pub fn extract_front_matter(contents: &[u8]) -> std::result::Result<SplitFile, String> {
    let Some(rest) = opening_rest(contents) else {
        return Ok(SplitFile {
            metadata: toml::Table::new(),
            body: contents.to_vec(),
        });
    };

    let mut offset = 0;
    loop {
        let newline = rest[offset..].iter().position(|&b| b == b'\n');
        let (line, after_line) = match newline {
            Some(i) => (&rest[offset..offset + i], offset + i + 1),
            None => (&rest[offset..], rest.len()),
        };
        if strip_cr(line) == DELIMITER.as_bytes() {
            let header = std::str::from_utf8(&rest[..offset])
                .map_err(|_| "front matter is not valid UTF-8".to_string())?;
            let metadata = toml::from_str(header).map_err(|e| e.to_string())?;
            return Ok(SplitFile {
                metadata,
                body: rest[after_line..].to_vec(),
            });
        }
        if newline.is_none() {
            return Err("unterminated front matter block".to_string());
        }
        offset = after_line;
    }
}

/// If the first line is the delimiter, return everything after it.
fn opening_rest(contents: &[u8]) -> Option<&[u8]> {
    let i = contents.iter().position(|&b| b == b'\n')?;
    let line = strip_cr(&contents[..i]);
    (line == DELIMITER.as_bytes()).then(|| &contents[i + 1..])
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Read one source file through the filesystem abstraction and split its
/// front matter. The source tree reader and the submodule assimilator both
/// go through here, so front matter behaves identically wherever a file
/// comes from.
pub async fn read_build_file(fs: &dyn FileSystem, path: &Path) -> Result<BuildFile> {
    let contents = fs.read(path).await?;
    let split = extract_front_matter(&contents).map_err(|message| SitesmithError::FrontMatter {
        path: path.to_path_buf(),
        message,
    })?;
    Ok(BuildFile::with_metadata(split.body, split.metadata))
}
