use std::path::{Component, Path, PathBuf};

/// Canonical form of `path` when it exists. A missing file still resolves
/// through its parent so identity can be computed before the file is stat'd.
pub fn canonical(path: &Path) -> PathBuf {
    if let Ok(p) = dunce::canonicalize(path) {
        return p;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => match dunce::canonicalize(parent) {
            Ok(p) => p.join(name),
            Err(_) => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// `path` relative to `root`, joined with `/`. `None` when `path` is not
/// under `root` or is `root` itself.
pub fn relative_slash(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Join a stored forward-slash path under `root`, refusing anything that
/// would escape it.
pub fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut out = root.to_path_buf();
    let mut pushed = false;
    for part in relative.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            p if Path::new(p).is_absolute() || p.contains('\\') || p.contains(':') => return None,
            p => {
                out.push(p);
                pushed = true;
            }
        }
    }
    pushed.then_some(out)
}
