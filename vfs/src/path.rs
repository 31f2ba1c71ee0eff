use crate::VfsError;

/// Normalize a VFS path.
///
/// - Replaces backslashes with forward slashes
/// - Collapses redundant separators (`a///b` → `a/b`)
/// - Drops `.` segments
/// - Rejects `..` segments (use [`join`] to resolve them against a base)
/// - Strips leading and trailing slashes
///
/// Returns `Err(VfsError::InvalidPath)` if the path is empty or contains `..`.
pub fn normalize(path: &str) -> Result<String, VfsError> {
    let replaced = path.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in replaced.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            return Err(VfsError::InvalidPath(format!(
                "path traversal (..) not allowed: {path}"
            )));
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return Err(VfsError::InvalidPath("empty path".into()));
    }

    Ok(segments.join("/"))
}

/// Resolve a relative reference against a base directory.
///
/// `..` segments pop a directory off the base; popping past the root is an
/// error rather than a silent clamp.
pub fn join(base: &str, relative: &str) -> Result<String, VfsError> {
    let base = base.replace('\\', "/");
    let relative = relative.replace('\\', "/");
    let mut segments: Vec<&str> = base
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(VfsError::InvalidPath(format!(
                        "{relative} escapes the base directory {base}"
                    )));
                }
            }
            other => segments.push(other),
        }
    }

    normalize(&segments.join("/"))
}

/// Directory portion of a path, without the trailing slash.
///
/// `"models/car/car.gltf"` → `"models/car"`, `"car.gltf"` → `""`.
pub fn parent(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Decode `%XX` escapes in a URI reference.
///
/// Malformed escapes are kept verbatim. Returns `InvalidUri` if the decoded
/// bytes are not UTF-8.
pub fn percent_decode(input: &str) -> Result<String, VfsError> {
    String::from_utf8(percent_decode_bytes(input))
        .map_err(|_| VfsError::InvalidUri(format!("non UTF-8 escape in {input}")))
}

/// Decode `%XX` escapes into raw bytes.
pub fn percent_decode_bytes(input: &str) -> Vec<u8> {
    fn hex(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex(bytes[i + 1]), hex(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Split a normalized path into source name and remainder.
///
/// Returns `(source, rest)` where `source` is the first path segment
/// and `rest` is everything after it. If there is only one segment,
/// `rest` is empty.
pub(crate) fn split_source(path: &str) -> (&str, &str) {
    match path.find('/') {
        Some(pos) => (&path[..pos], &path[pos + 1..]),
        None => (path, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cleans_separators() {
        assert_eq!(normalize("/models//car/./car.bin").unwrap(), "models/car/car.bin");
        assert_eq!(normalize("models\\car.bin").unwrap(), "models/car.bin");
    }

    #[test]
    fn normalize_rejects_dotdot_and_empty() {
        assert!(normalize("models/../secret.bin").is_err());
        assert!(normalize("").is_err());
        assert!(normalize("///").is_err());
    }

    #[test]
    fn join_relative_to_base() {
        assert_eq!(join("assets/models", "car.bin").unwrap(), "assets/models/car.bin");
        assert_eq!(join("", "car.bin").unwrap(), "car.bin");
        assert_eq!(
            join("assets/models", "../textures/paint.png").unwrap(),
            "assets/textures/paint.png"
        );
    }

    #[test]
    fn join_rejects_escape() {
        assert!(matches!(
            join("assets", "../../etc/passwd"),
            Err(VfsError::InvalidPath(_))
        ));
    }

    #[test]
    fn parent_of_paths() {
        assert_eq!(parent("models/car/car.gltf"), "models/car");
        assert_eq!(parent("car.gltf"), "");
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("my%20model.bin").unwrap(), "my model.bin");
        assert_eq!(percent_decode("100%").unwrap(), "100%");
        assert_eq!(percent_decode("a%zzb").unwrap(), "a%zzb");
    }

    #[test]
    fn split_source_with_rest() {
        assert_eq!(
            split_source("assets/textures/brick.png"),
            ("assets", "textures/brick.png")
        );
        assert_eq!(split_source("file.txt"), ("file.txt", ""));
    }
}
