// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{DispatchError, DispatchResult};
use crate::protocol::ModelSummary;
use crate::traits::ModelReader;

/// Every `.3dm` file opens with this signature.
pub const OPENNURBS_SIGNATURE: &[u8; 24] = b"3D Geometry File Format ";
/// Width of the space-padded version field following the signature.
const VERSION_FIELD_LEN: usize = 8;

/// Reads the fixed 32-byte `.3dm` header only.
///
/// Object and layer tables are compressed chunk streams; this reader leaves
/// them to richer [`ModelReader`] implementations and reports no objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenNurbsHeaderReader;

impl OpenNurbsHeaderReader {
    pub fn new() -> Self {
        Self
    }
}

fn parse_version(field: &[u8]) -> Option<u32> {
    std::str::from_utf8(field).ok()?.trim().parse().ok()
}

impl ModelReader for OpenNurbsHeaderReader {
    fn read_model(&self, path: &Path) -> DispatchResult<ModelSummary> {
        let mut file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                DispatchError::NotFound(format!("File not found: {}", path.display()))
            }
            _ => DispatchError::fault(format!("Failed to open {}: {}", path.display(), e)),
        })?;

        let size_bytes = file
            .metadata()
            .map_err(|e| DispatchError::fault(format!("Failed to stat {}: {}", path.display(), e)))?
            .len();

        let mut header = [0u8; 32];
        if file.read_exact(&mut header).is_err() || &header[..24] != OPENNURBS_SIGNATURE {
            return Err(DispatchError::fault(format!(
                "{} is not a 3dm model file",
                path.display()
            )));
        }

        Ok(ModelSummary {
            file_path: path.to_path_buf(),
            size_bytes,
            format_version: parse_version(&header[24..24 + VERSION_FIELD_LEN]),
            object_count: None,
            layer_count: None,
            objects: Vec::new(),
        })
    }
}
