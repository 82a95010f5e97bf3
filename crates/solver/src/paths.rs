use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Canonical form of `candidate` if it names an existing regular file
pub(crate) fn canonical_file(candidate: &Path) -> Option<PathBuf> {
    if !candidate.is_file() {
        return None;
    }
    match candidate.canonicalize() {
        Ok(path) => Some(path),
        Err(err) => {
            log::debug!("Failed to canonicalize {}: {err}", candidate.display());
            None
        }
    }
}

/// Directory containing `src_path`; empty for a bare file name
pub(crate) fn source_dir(src_path: &Path) -> &Path {
    src_path.parent().unwrap_or_else(|| Path::new(""))
}

/// Display name of a source vertex
pub(crate) fn file_name(src_path: &Path) -> String {
    src_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| src_path.display().to_string())
}

/// `path` with `.ext` appended verbatim (`a.b` + `py` gives `a.b.py`)
pub(crate) fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Walk `levels` parents up from `dir`; `None` when the root is passed
pub(crate) fn ascend(dir: &Path, levels: usize) -> Option<&Path> {
    dir.ancestors().nth(levels)
}
