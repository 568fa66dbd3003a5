//! # Source Collection
//!
//! Gathers `(label, bytes)` pairs from the filesystem and turns raw bytes
//! into normalized text. Reading is kept apart from layout: a file that
//! can't be read becomes a [`SourceFile`] carrying the error, and the
//! document still renders around it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CodepressError;

/// Extensions picked up by directory walks.
pub const CODE_EXTENSIONS: &[&str] = &[
    "py", "java", "cpp", "js", "html", "css", "php", "rb", "go", "ts", "jsx", "tsx", "json", "xml",
    "yaml", "yml", "sql", "sh", "bat", "c", "h", "cs", "swift", "kt", "rs", "m", "mm", "scala",
];

/// One input file: its display label and its bytes, or why they couldn't
/// be read.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub data: Result<Vec<u8>, String>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: Ok(bytes.into()),
        }
    }

    pub fn unreadable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: Err(message.into()),
        }
    }

    /// Read `path` from disk, labelled `label`. Read failures are kept on
    /// the file rather than returned.
    pub fn read(path: &Path, label: impl Into<String>) -> Self {
        let label = label.into();
        match fs::read(path) {
            Ok(bytes) => Self::new(label, bytes),
            Err(e) => {
                tracing::warn!(target: "source", path = %path.display(), error = %e, "read_failed");
                Self::unreadable(label, e.to_string())
            }
        }
    }

    /// Size in bytes, 0 when unreadable.
    pub fn size(&self) -> u64 {
        self.data.as_ref().map(|b| b.len() as u64).unwrap_or(0)
    }
}

pub fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            CODE_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Collect every code file under `root`, sorted by path, labelled relative
/// to `root` with `/` separators.
pub fn collect_dir(root: &Path) -> Result<Vec<SourceFile>, CodepressError> {
    let mut paths = Vec::new();
    walk(root, &mut paths).map_err(|source| CodepressError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    paths.sort();

    let files: Vec<SourceFile> = paths
        .iter()
        .filter(|p| is_code_file(p))
        .map(|p| SourceFile::read(p, relative_label(root, p)))
        .collect();
    tracing::debug!(target: "source", root = %root.display(), files = files.len(), "directory_collected");
    Ok(files)
}

/// Collect from a mix of files and directories. Files named explicitly are
/// taken whatever their extension; directories are walked.
pub fn collect(paths: &[PathBuf]) -> Result<Vec<SourceFile>, CodepressError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(collect_dir(path)?);
        } else {
            let label = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            files.push(SourceFile::read(path, label));
        }
    }
    Ok(files)
}

/// Symlinked directories are not followed; a link back to an ancestor
/// would otherwise repeat the tree until the OS refuses the path.
fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_symlink() && path.is_dir() {
            tracing::debug!(target: "source", path = %path.display(), "symlinked_directory_skipped");
        } else if file_type.is_dir() {
            // Unreadable subdirectories are skipped, not fatal.
            if let Err(e) = walk(&path, out) {
                tracing::warn!(target: "source", path = %path.display(), error = %e, "subdirectory_skipped");
            }
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn relative_label(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Decode file bytes to normalized text.
///
/// UTF-8 when valid, Latin-1 otherwise (every byte maps to a char, so this
/// can't fail). A leading BOM is dropped, line endings become `\n`, tabs
/// are expanded to `tab_width` stops, trailing whitespace is trimmed, and
/// runs of blank lines collapse to one.
pub fn decode_text(bytes: &[u8], tab_width: usize) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            tracing::debug!(target: "source", "latin1_fallback");
            bytes.iter().map(|&b| b as char).collect()
        }
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut out = String::with_capacity(text.len());
    let mut prev_blank = false;
    for line in text.lines() {
        let line = expand_tabs(line, tab_width);
        let line = line.trim_end();
        let blank = line.is_empty();
        if blank && prev_blank {
            continue;
        }
        out.push_str(line);
        out.push('\n');
        prev_blank = blank;
    }
    out
}

fn expand_tabs(line: &str, tab_width: usize) -> String {
    if tab_width == 0 || !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + tab_width);
    let mut col = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = tab_width - col % tab_width;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(ch);
            col += 1;
        }
    }
    out
}

/// Human-readable byte count: `512.00 B`, `1.50 KB`, ... up to TB.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_and_latin1() {
        assert_eq!(decode_text("héllo".as_bytes(), 4), "héllo\n");
        assert_eq!(decode_text(&[b'c', b'a', b'f', 0xE9], 4), "café\n");
    }

    #[test]
    fn blank_runs_collapse() {
        let text = decode_text(b"a\n\n\n\nb   \n  \n\nc\r\n", 4);
        assert_eq!(text, "a\n\nb\n\nc\n");
    }

    #[test]
    fn tabs_expand_to_stops() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("ab\tc", 4), "ab  c");
        assert_eq!(expand_tabs("a\tb", 0), "a\tb");
    }

    #[test]
    fn bom_is_dropped() {
        assert_eq!(decode_text("\u{feff}x".as_bytes(), 4), "x\n");
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024_u64.pow(4)), "3.00 TB");
    }

    #[test]
    fn code_file_filter() {
        assert!(is_code_file(Path::new("src/main.rs")));
        assert!(is_code_file(Path::new("App.TSX")));
        assert!(!is_code_file(Path::new("README.md")));
        assert!(!is_code_file(Path::new("Makefile")));
    }

    #[test]
    fn walks_sorted_with_relative_labels() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg/sub")).unwrap();
        fs::write(dir.path().join("b.py"), "print(1)\n").unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip me").unwrap();
        fs::write(dir.path().join("pkg/sub/c.go"), "package sub\n").unwrap();

        let files = collect_dir(dir.path()).unwrap();
        let labels: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(labels, vec!["a.rs", "b.py", "pkg/sub/c.go"]);
        assert_eq!(files[0].size(), 10);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg/a.rs"), "fn a() {}\n").unwrap();
        fs::write(dir.path().join("b.py"), "b = 2\n").unwrap();
        std::os::unix::fs::symlink("..", dir.path().join("pkg/up")).unwrap();
        std::os::unix::fs::symlink("b.py", dir.path().join("link.py")).unwrap();

        let files = collect_dir(dir.path()).unwrap();
        let labels: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        // File links are read through; directory links are not walked.
        assert_eq!(labels, vec!["b.py", "link.py", "pkg/a.rs"]);
        assert_eq!(files[1].data.as_deref().unwrap(), b"b = 2\n");
    }

    #[test]
    fn explicit_files_skip_the_filter() {
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "hello").unwrap();
        let files = collect(&[notes, dir.path().join("missing.rs")]).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "notes.txt");
        assert!(files[0].data.is_ok());
        assert!(files[1].data.is_err());
    }

    #[test]
    fn missing_root_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, CodepressError::Io { .. }));
    }
}
