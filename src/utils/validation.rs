use std::path::Path;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Reduces a client-supplied name to its final path segment.
///
/// Accepts names that still carry directory components (browsers on some
/// platforms submit full paths) and keeps only the base name. Fails when
/// nothing usable remains, which covers ``, `.`, `/` and `..` inputs.
pub fn sanitize_filename(raw: &str) -> Result<String, ValidationError> {
    let name = Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() || name == "." || name == "/" {
        return Err(ValidationError {
            code: "INVALID_FILENAME",
            message: format!("'{}' does not name a file", raw),
        });
    }

    Ok(name.to_string())
}

/// Stricter variant for deletion: the raw input must already be a bare file
/// name. Taking the base name must not change it, and path separators or a
/// `..` substring anywhere in the input are rejected outright, on top of the
/// containment check the storage layer performs on the resolved path.
pub fn sanitize_filename_strict(raw: &str) -> Result<String, ValidationError> {
    let name = sanitize_filename(raw)?;

    if name != raw || raw.contains('/') || raw.contains('\\') || raw.contains("..") {
        return Err(ValidationError {
            code: "PATH_REJECTED",
            message: format!("'{}' contains path characters", raw),
        });
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test.pdf").unwrap(), "test.pdf");
        assert_eq!(sanitize_filename("my file.doc").unwrap(), "my file.doc");
        assert_eq!(sanitize_filename("测试.txt").unwrap(), "测试.txt");

        // Directory components are stripped, not rejected
        assert_eq!(sanitize_filename("../../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("uploads/game.zip").unwrap(), "game.zip");

        // Nothing usable left
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename(".").is_err());
        assert!(sanitize_filename("/").is_err());
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("foo/..").is_err());
    }

    #[test]
    fn test_sanitize_filename_strict() {
        assert_eq!(sanitize_filename_strict("game.zip").unwrap(), "game.zip");
        assert_eq!(
            sanitize_filename_strict("save file.dat").unwrap(),
            "save file.dat"
        );

        // Anything path-like is rejected, even when the base name would be fine
        assert!(sanitize_filename_strict("../../etc/passwd").is_err());
        assert!(sanitize_filename_strict("uploads/game.zip").is_err());
        assert!(sanitize_filename_strict("..\\system32").is_err());
        assert!(sanitize_filename_strict("a..b").is_err());
        assert!(sanitize_filename_strict("").is_err());
    }
}
