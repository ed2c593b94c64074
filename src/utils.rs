use std::env;
use std::path::PathBuf;
use urlencoding::decode;

/// Turn a map path as handed to us (plain path, relative path, or a
/// `file://` URI from an editor) into an absolute, normalized path.
/// Nonexistent paths are returned absolute but otherwise untouched so that
/// opening them reports the real error.
pub fn resolve_map_path(source_path: &str) -> PathBuf {
    let mut path_str = source_path.to_string();

    if let Some(rest) = path_str.strip_prefix("file://") {
        let decoded = decode(rest).map(|s| s.into_owned()).unwrap_or_else(|_| rest.to_string());
        path_str = decoded;

        // file:///C:/... becomes /C:/...
        if cfg!(windows) && path_str.starts_with('/') && path_str.chars().nth(2) == Some(':') {
            path_str.remove(0);
        }
    }

    let path = PathBuf::from(&path_str);
    let absolute = if path.is_absolute() {
        path
    } else {
        env::current_dir().unwrap_or_default().join(path)
    };

    // dunce avoids \\?\ prefixes on Windows
    dunce::canonicalize(&absolute).unwrap_or(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_uri_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("my app.map");
        std::fs::write(&map, "").unwrap();

        let uri = format!("file://{}", map.to_string_lossy().replace(' ', "%20"));
        let resolved = resolve_map_path(&uri);
        assert_eq!(resolved, dunce::canonicalize(&map).unwrap());
    }

    #[test]
    fn missing_relative_path_becomes_absolute() {
        let resolved = resolve_map_path("does/not/exist.map");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("does/not/exist.map"));
    }
}
