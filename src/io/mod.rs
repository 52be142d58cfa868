// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - importing and exporting meshes

mod export_gltf;
mod stl;

pub use export_gltf::{export as export_gltf, export_glb, export_gltf_embedded};
pub use stl::{export_stl, export_stl_ascii, import_stl};

use crate::geometry::Mesh;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Binary STL
    #[default]
    Stl,
    /// glTF JSON with an embedded buffer
    Gltf,
    /// Binary glTF
    Glb,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "stl" => Some(Self::Stl),
            "gltf" => Some(Self::Gltf),
            "glb" => Some(Self::Glb),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Gltf => "gltf",
            Self::Glb => "glb",
        }
    }
}

/// Write `mesh` to `path` in the given format
pub fn export(mesh: &Mesh, path: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
    let path = path.as_ref();
    log::debug!("exporting {} triangles to {:?} as {:?}", mesh.triangle_count(), path, format);
    match format {
        ExportFormat::Stl => export_stl(mesh, path),
        ExportFormat::Gltf => export_gltf_embedded(mesh, path),
        ExportFormat::Glb => export_glb(mesh, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path("half.STL"), Some(ExportFormat::Stl));
        assert_eq!(ExportFormat::from_path("out/front.gltf"), Some(ExportFormat::Gltf));
        assert_eq!(ExportFormat::from_path("back.glb"), Some(ExportFormat::Glb));
        assert_eq!(ExportFormat::from_path("mesh.obj"), None);
        assert_eq!(ExportFormat::from_path("mesh"), None);
    }
}
