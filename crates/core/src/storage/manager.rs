use std::path::Path;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::position::Position;

use super::format;

/// High-level storage operations: save/load positions to/from CSV bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Serialize positions to CSV bytes.
    pub fn save_to_bytes(positions: &[Position]) -> Result<Vec<u8>, CoreError> {
        format::write_positions(positions)
    }

    /// Parse positions from CSV bytes. Malformed rows are dropped.
    pub fn load_from_bytes(data: &[u8]) -> Vec<Position> {
        format::read_positions(data)
    }

    /// Write positions to `path`, creating parent directories as needed.
    pub fn save_to_file(positions: &[Position], path: &Path) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(positions)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        debug!(path = %path.display(), count = positions.len(), "saved positions");
        Ok(())
    }

    /// Read positions from `path`. A missing file is an empty store.
    pub fn load_from_file(path: &Path) -> Result<Vec<Position>, CoreError> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let positions = Self::load_from_bytes(&bytes);
        debug!(path = %path.display(), count = positions.len(), "loaded positions");
        Ok(positions)
    }
}
