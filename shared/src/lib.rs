pub mod core;

use std::path::Path;

pub use crate::core::config::VerifierConfig;

/// Makes sure the directory screenshots are written into exists.
pub fn init_output_dir(dir: &Path) -> Result<(), SharedError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

// Error handling
#[derive(Debug, thiserror::Error)]
pub enum SharedError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_output_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("shots").join("run");
        init_output_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent on an existing directory.
        init_output_dir(&nested).unwrap();
    }

    #[test]
    fn init_output_dir_accepts_working_directory() {
        init_output_dir(Path::new("")).unwrap();
    }

    #[test]
    fn init_output_dir_under_a_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("taken");
        std::fs::write(&file, b"").unwrap();
        let err = init_output_dir(&file.join("shots")).unwrap_err();
        assert!(matches!(err, SharedError::IoError(_)));
        assert!(err.to_string().starts_with("IO error: "));
    }
}
