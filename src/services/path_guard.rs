//! Lexical path containment checks
//!
//! Album paths are compared textually after making them absolute and
//! collapsing `.` / `..` components. Symlinks are never resolved, so the
//! check behaves the same whether or not the paths exist.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Make a path absolute (against the current directory) and lexically clean it
///
/// Returns `None` when the current directory is needed but unavailable.
pub fn absolute_clean(path: &Path) -> Option<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().ok()?.join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !matches!(
                    cleaned.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    cleaned.pop();
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    Some(cleaned)
}

/// True iff `candidate` lies strictly inside `base`
///
/// Equal paths are not "within" each other, and sibling directories that
/// merely share a textual prefix (`/music` vs `/music2`) do not match because
/// the comparison is component-wise.
pub fn is_within(base: &Path, candidate: &Path) -> bool {
    let (Some(base), Some(candidate)) = (absolute_clean(base), absolute_clean(candidate)) else {
        return false;
    };
    candidate != base && candidate.starts_with(&base)
}

/// Path of `candidate` relative to `base`, when `candidate` is strictly inside it
pub fn relative_within(base: &Path, candidate: &Path) -> Option<PathBuf> {
    let base = absolute_clean(base)?;
    let candidate = absolute_clean(candidate)?;
    if candidate == base {
        return None;
    }
    candidate.strip_prefix(&base).ok().map(Path::to_path_buf)
}
