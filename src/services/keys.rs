//! Object key resolution.
//!
//! Keys use `/` separators and never start with `/`. URLs handed back to the
//! host are the key with a single leading `/`.

/// Replace backslash separators with forward slashes.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Turn a path (possibly with backslashes or a leading slash) into a key.
pub fn object_key(path: &str) -> String {
    normalize_separators(path).trim_start_matches('/').to_string()
}

/// Join a prefix and a path with exactly one `/` between them.
///
/// An empty prefix yields just the normalized path.
pub fn join(prefix: &str, path: &str) -> String {
    let prefix = normalize_separators(prefix);
    let prefix = prefix.trim_matches('/');
    let path = object_key(path);

    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    }
}

/// Key for a (file name, optional directory) pair, as used by `exists` and
/// `delete`.
pub fn dir_key(file_name: &str, target_dir: Option<&str>) -> String {
    match target_dir.filter(|dir| !dir.is_empty()) {
        Some(dir) => join(dir, file_name),
        None => object_key(file_name),
    }
}

/// URL path under which a stored key is served.
pub fn url_for(key: &str) -> String {
    format!("/{}", key)
}
