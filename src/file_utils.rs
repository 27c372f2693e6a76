use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::PersistenceError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Name of a translated result, `translated_{YYYYmmdd_HHMMSS}_{file_name}`
    pub fn output_file_name(file_name: &str, at: DateTime<Local>) -> String {
        format!("translated_{}_{}", at.format("%Y%m%d_%H%M%S"), file_name)
    }

    // @generates: Output path for a translated document
    // @params: output_dir, file_name
    pub fn generate_output_path<P: AsRef<Path>>(output_dir: P, file_name: &str) -> PathBuf {
        output_dir.as_ref().join(Self::output_file_name(file_name, Local::now()))
    }

    /// Final path component as a display string
    pub fn file_name_of<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Read a whole file
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write bytes to a file, creating the parent directory when missing
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let write_error = |message: String| PersistenceError::Write {
            path: path.display().to_string(),
            message,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                Self::ensure_dir(parent).map_err(|e| write_error(format!("{:#}", e)))?;
            }
        }

        fs::write(path, content).map_err(|e| write_error(e.to_string()))?;

        if !Self::file_exists(path) {
            return Err(write_error("file missing after write".to_string()));
        }
        Ok(())
    }
}
