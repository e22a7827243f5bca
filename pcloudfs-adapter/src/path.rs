//! Canonical path form used on the wire.
//!
//! Remote paths always start with exactly one `/`, never end with one
//! (except the root itself) and contain no empty segments.

pub const ROOT: &str = "/";

/// Normalize any caller path into the remote absolute form.
pub fn normalize(path: &str) -> String {
    if path == "." {
        return ROOT.to_string();
    }
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Directory containing `path`. The root is its own parent.
pub fn parent_of(path: &str) -> String {
    let path = normalize(path);
    match path.rsplit_once('/') {
        Some(("", _)) | None => ROOT.to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

/// Last segment of `path`, or `None` for the root.
pub fn base_name(path: &str) -> Option<String> {
    let path = normalize(path);
    path.rsplit_once('/')
        .map(|(_, name)| name.to_string())
        .filter(|name| !name.is_empty())
}

/// Append a child name to an already normalized directory path.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT || parent.is_empty() {
        format!("/{}", name.trim_matches('/'))
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name.trim_matches('/'))
    }
}

/// Every directory from the top level down to `path` itself, in creation order.
/// `"/a/b/c"` yields `["/a", "/a/b", "/a/b/c"]`; the root yields nothing.
pub fn ancestors_inclusive(path: &str) -> Vec<String> {
    let path = normalize(path);
    let mut current = String::new();
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            current.push('/');
            current.push_str(segment);
            current.clone()
        })
        .collect()
}
