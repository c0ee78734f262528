//! Content hashing for change detection.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Computes SHA256 hash of a string, returning hex-encoded digest.
pub fn hexdigest_str(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes SHA256 hash of a file, returning hex-encoded digest.
pub fn hexdigest_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Returns true if `path` exists and already holds exactly `content`.
pub fn is_unchanged(path: &Path, content: &str) -> io::Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    Ok(hexdigest_file(path)? == hexdigest_str(content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_hexdigest_str() {
        assert_eq!(
            hexdigest_str("hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hexdigest_file_matches_str() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "hello world").unwrap();

        assert_eq!(hexdigest_file(&path).unwrap(), hexdigest_str("hello world"));
    }

    #[test]
    fn test_is_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        assert!(!is_unchanged(&path, "x\n").unwrap());

        fs::write(&path, "x\n").unwrap();
        assert!(is_unchanged(&path, "x\n").unwrap());
        assert!(!is_unchanged(&path, "y\n").unwrap());
    }
}
