//! Writes feed documents into the output directory.
//!
//! Every run starts by deleting the previous run's `.json` files, so a
//! country that drops out of the upstream feed loses its file too.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use thiserror::Error;

use crate::jsonfeed::{FeedDocument, COMBINED_SLUG};

pub const OUTPUT_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to list output directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to remove stale output '{}': {source}", path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize feed '{slug}': {source}")]
    Serialize {
        slug: String,
        source: serde_json::Error,
    },
}

/// Everything one run writes: per-country feeds plus the optional combined feed.
#[derive(Debug, Default)]
pub struct OutputSet {
    /// `(slug, document)` in write order.
    pub feeds: Vec<(String, FeedDocument)>,
    pub combined: Option<FeedDocument>,
}

/// Removes every `*.json` entry directly inside `dir`, whoever wrote it,
/// plus temp files left behind by an interrupted [`write_feed`].
///
/// Symlinks are removed, not followed. Returns the number of entries
/// removed. Subdirectories are left alone.
pub fn clear_stale_outputs(dir: &Path) -> Result<usize, OutputError> {
    let entries = std::fs::read_dir(dir).map_err(|source| OutputError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|source| OutputError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let is_output = path.extension().and_then(|e| e.to_str()) == Some(OUTPUT_EXTENSION);
        let is_temp = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(is_leftover_temp);
        if is_dir || !(is_output || is_temp) {
            continue;
        }
        std::fs::remove_file(&path).map_err(|source| OutputError::Remove {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Removed stale output");
        removed += 1;
    }
    Ok(removed)
}

/// Matches `{slug}.tmp.{hex}`, the names [`atomic_write`] stages into.
fn is_leftover_temp(name: &str) -> bool {
    name.split_once(".tmp.").is_some_and(|(stem, suffix)| {
        !stem.is_empty() && !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_hexdigit())
    })
}

/// Serializes a feed with 4-space indentation.
pub fn render(slug: &str, doc: &FeedDocument) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    doc.serialize(&mut ser)
        .map_err(|source| OutputError::Serialize {
            slug: slug.to_string(),
            source,
        })?;
    Ok(buf)
}

/// Writes `doc` to `{dir}/{slug}.json` via a temp file and rename.
pub fn write_feed(dir: &Path, slug: &str, doc: &FeedDocument) -> Result<PathBuf, OutputError> {
    let content = render(slug, doc)?;
    let path = dir.join(format!("{slug}.{OUTPUT_EXTENSION}"));
    atomic_write(&path, &content)?;
    Ok(path)
}

/// Creates `dir`, clears stale outputs, then writes every feed in `outputs`.
///
/// The combined feed, when present, is written last.
pub fn write_all(dir: &Path, outputs: &OutputSet) -> Result<Vec<PathBuf>, OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let removed = clear_stale_outputs(dir)?;
    if removed > 0 {
        tracing::info!(dir = %dir.display(), removed = removed, "Cleared previous outputs");
    }

    let mut written = Vec::with_capacity(outputs.feeds.len() + 1);
    for (slug, doc) in &outputs.feeds {
        written.push(write_feed(dir, slug, doc)?);
    }
    if let Some(doc) = &outputs.combined {
        written.push(write_feed(dir, COMBINED_SLUG, doc)?);
    }
    Ok(written)
}

fn atomic_write(path: &Path, content: &[u8]) -> Result<(), OutputError> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let write_err = |source: std::io::Error| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(write_err)?;

    if let Err(e) = file.write_all(content).and_then(|()| file.sync_all()) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(write_err(e));
    }
    drop(file);

    #[cfg(windows)]
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(write_err(e));
        }
    }

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        write_err(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonfeed::{assemble, FeedSettings};

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("travel_advisories_output_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    fn doc(slug: &str) -> FeedDocument {
        let settings = FeedSettings {
            feed_url_template: "https://feeds.example.com/{slug}.json".to_string(),
            home_page_url: "https://travel.example.gov/".to_string(),
            icon_url: "https://travel.example.gov/icon.jpg".to_string(),
        };
        assemble(&settings, "Chad", slug, Vec::new(), None)
    }

    #[test]
    fn test_render_uses_four_space_indent() {
        let text = String::from_utf8(render("chad", &doc("chad")).unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"version\": \"https://jsonfeed.org/version/1.1\",\n"));
        assert!(text.contains("\n    \"items\": []\n}"));
    }

    #[test]
    fn test_clear_stale_outputs_only_removes_json_files() {
        let dir = test_dir("clear");
        std::fs::create_dir_all(dir.join("nested.json")).unwrap();
        std::fs::write(dir.join("old.json"), "{}").unwrap();
        std::fs::write(dir.join("unrelated.json"), "[]").unwrap();
        std::fs::write(dir.join("notes.txt"), "keep").unwrap();

        let removed = clear_stale_outputs(&dir).unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.join("old.json").exists());
        assert!(!dir.join("unrelated.json").exists());
        assert!(dir.join("notes.txt").exists());
        assert!(dir.join("nested.json").is_dir());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_clear_stale_outputs_removes_json_symlinks() {
        let dir = test_dir("clear_symlink");
        let outside = test_dir("clear_symlink_target");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::create_dir_all(&outside).unwrap();
        let target = outside.join("feed.json");
        std::fs::write(&target, "{}").unwrap();
        std::os::unix::fs::symlink(&target, dir.join("old.json")).unwrap();

        let written = write_all(&dir, &OutputSet {
            feeds: vec![("chad".to_string(), doc("chad"))],
            combined: None,
        })
        .unwrap();

        assert_eq!(written.len(), 1);
        let names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["chad.json"]);
        assert!(target.exists());

        std::fs::remove_dir_all(&dir).ok();
        std::fs::remove_dir_all(&outside).ok();
    }

    #[test]
    fn test_clear_stale_outputs_removes_leftover_temp_files() {
        let dir = test_dir("clear_temp");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("chad.tmp.0000017f3a2b9c10"), "{\"ver").unwrap();
        std::fs::write(dir.join("notes.tmp.txt"), "keep").unwrap();
        std::fs::write(dir.join("backup.tmp"), "keep").unwrap();

        let removed = clear_stale_outputs(&dir).unwrap();
        assert_eq!(removed, 1);
        assert!(!dir.join("chad.tmp.0000017f3a2b9c10").exists());
        assert!(dir.join("notes.tmp.txt").exists());
        assert!(dir.join("backup.tmp").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_leftover_temp_names() {
        assert!(is_leftover_temp("chad.tmp.00ff"));
        assert!(!is_leftover_temp("chad.tmp."));
        assert!(!is_leftover_temp(".tmp.00ff"));
        assert!(!is_leftover_temp("chad.json"));
    }

    #[test]
    fn test_clear_stale_outputs_missing_dir_errors() {
        let dir = test_dir("missing");
        assert!(matches!(
            clear_stale_outputs(&dir),
            Err(OutputError::ReadDir { .. })
        ));
    }

    #[test]
    fn test_write_all_creates_dir_and_writes_combined_last() {
        let dir = test_dir("write_all").join("deep").join("er");
        let outputs = OutputSet {
            feeds: vec![("chad".to_string(), doc("chad")), ("mali".to_string(), doc("mali"))],
            combined: Some(doc(COMBINED_SLUG)),
        };

        let written = write_all(&dir, &outputs).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["chad.json", "mali.json", "combined.json"]);

        let parsed: FeedDocument =
            serde_json::from_slice(&std::fs::read(dir.join("mali.json")).unwrap()).unwrap();
        assert_eq!(parsed, doc("mali"));

        std::fs::remove_dir_all(test_dir("write_all")).ok();
    }

    #[test]
    fn test_write_feed_leaves_no_temp_files() {
        let dir = test_dir("no_temp");
        std::fs::create_dir_all(&dir).unwrap();
        write_feed(&dir, "chad", &doc("chad")).unwrap();

        let names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["chad.json"]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
