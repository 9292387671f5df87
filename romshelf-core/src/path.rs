//! `/`-separated path helpers that never touch a real file system.
//!
//! Device storage paths are always forward-slash strings regardless of the
//! host OS, so `std::path` semantics (drive letters, `\` separators) would be
//! wrong here. Every function is total.

/// Join path segments with `/`.
///
/// Empty segments are dropped, repeated separators collapse, a single leading
/// `./` and any trailing separators are removed. A leading `/` on the first
/// non-empty segment is preserved. No segments yields `"."`.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let parts: Vec<&str> = segments
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !s.is_empty())
        .collect();
    let Some(first) = parts.first() else {
        return ".".to_string();
    };
    let absolute = first.starts_with('/');

    let mut collapsed = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
    for ch in parts.join("/").chars() {
        if ch == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(ch);
    }

    let body = collapsed.strip_prefix("./").unwrap_or(&collapsed);
    let body = body.trim_matches('/');
    match (absolute, body.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{body}"),
        (false, true) => ".".to_string(),
        (false, false) => body.to_string(),
    }
}

/// Last non-empty segment of `path`.
///
/// When `ext` is given and the segment ends with it (and is longer than it),
/// the suffix is removed.
pub fn basename<'a>(path: &'a str, ext: Option<&str>) -> &'a str {
    let base = path.split('/').filter(|s| !s.is_empty()).last().unwrap_or("");
    match ext {
        Some(ext) if !ext.is_empty() && base.len() > ext.len() => {
            base.strip_suffix(ext).unwrap_or(base)
        }
        _ => base,
    }
}

/// Everything but the last segment.
///
/// The root maps to itself and a single relative segment maps to `"."`.
pub fn dirname(path: &str) -> String {
    let absolute = path.starts_with('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() <= 1 {
        return if absolute { "/" } else { "." }.to_string();
    }
    let parent = segments[..segments.len() - 1].join("/");
    if absolute {
        format!("/{parent}")
    } else {
        parent
    }
}

/// Extension of the basename, from the last `.` onward.
///
/// Empty when there is no dot or the only dot starts the name (hidden files).
pub fn extname(path: &str) -> &str {
    let base = basename(path, None);
    match base.rfind('.') {
        None | Some(0) => "",
        Some(i) => &base[i..],
    }
}
