// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GLTF/GLB exporter

use crate::geometry::Mesh;
use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

/// Export mesh to GLTF or GLB format, chosen by extension
pub fn export(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let is_glb = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("glb"));

    if is_glb {
        export_glb(mesh, path)
    } else {
        export_gltf_embedded(mesh, path)
    }
}

/// Export mesh to GLB (binary GLTF)
pub fn export_glb(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let (document, buffer_data) = build_document(mesh)?;

    let json_string = serde_json::to_string(&document)?;
    let json_length = align_to_multiple_of_four(json_string.len());
    let json_padding = json_length - json_string.len();

    let buffer_length = align_to_multiple_of_four(buffer_data.len());
    let buffer_padding = buffer_length - buffer_data.len();

    let total_length = 12 + 8 + json_length + 8 + buffer_length;
    let total_length = u32::try_from(total_length).context("GLB file exceeds 4 GiB")?;

    let file = File::create(path.as_ref()).context("Failed to create GLB file")?;
    let mut file = BufWriter::new(file);

    // GLB header
    file.write_all(&0x46546C67u32.to_le_bytes())?; // magic: "glTF"
    file.write_all(&2u32.to_le_bytes())?; // version
    file.write_all(&total_length.to_le_bytes())?;

    // JSON chunk
    file.write_all(&(json_length as u32).to_le_bytes())?;
    file.write_all(&0x4E4F534Au32.to_le_bytes())?; // type: "JSON"
    file.write_all(json_string.as_bytes())?;
    file.write_all(&vec![b' '; json_padding])?;

    // BIN chunk
    file.write_all(&(buffer_length as u32).to_le_bytes())?;
    file.write_all(&0x004E4942u32.to_le_bytes())?; // type: "BIN\0"
    file.write_all(&buffer_data)?;
    file.write_all(&vec![0u8; buffer_padding])?;

    file.flush()?;
    Ok(())
}

/// Export mesh to a self-contained .gltf with the buffer embedded as a data URI
pub fn export_gltf_embedded(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let (mut document, buffer_data) = build_document(mesh)?;
    document["buffers"][0]["uri"] = json!(format!(
        "data:application/octet-stream;base64,{}",
        BASE64_ENGINE.encode(&buffer_data)
    ));

    let json_string = serde_json::to_string_pretty(&document)?;
    std::fs::write(path.as_ref(), json_string).context("Failed to write GLTF file")?;
    Ok(())
}

/// Binary buffer plus the views and accessors describing it
struct BufferBuilder {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BufferBuilder {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Append one tightly packed f32 attribute; returns its accessor index
    fn push_floats<const N: usize>(&mut self, values: impl Iterator<Item = [f32; N]>, count: usize) -> usize {
        let offset = self.data.len();
        for value in values {
            for component in value {
                self.data.extend_from_slice(&component.to_le_bytes());
            }
        }

        let kind = match N {
            2 => "VEC2",
            3 => "VEC3",
            _ => "VEC4",
        };
        self.push_view(offset, ARRAY_BUFFER);
        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": count,
            "type": kind
        }));
        self.accessors.len() - 1
    }

    fn push_indices(&mut self, indices: &[u32]) -> usize {
        let offset = self.data.len();
        for index in indices {
            self.data.extend_from_slice(&index.to_le_bytes());
        }
        self.push_view(offset, ELEMENT_ARRAY_BUFFER);
        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "byteOffset": 0,
            "componentType": UNSIGNED_INT,
            "count": indices.len(),
            "type": "SCALAR"
        }));
        self.accessors.len() - 1
    }

    fn push_view(&mut self, offset: usize, target: u32) {
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": self.data.len() - offset,
            "target": target
        }));
    }
}

fn build_document(mesh: &Mesh) -> Result<(Value, Vec<u8>)> {
    let indices = mesh
        .indices
        .iter()
        .map(|&i| u32::try_from(i))
        .collect::<std::result::Result<Vec<u32>, _>>()
        .context("Mesh has more vertices than 32-bit indices can address")?;
    if mesh.vertices.is_empty() {
        bail!("Cannot export an empty mesh to GLTF");
    }

    let count = mesh.vertex_count();
    let mut buffer = BufferBuilder::new();
    let mut attributes = serde_json::Map::new();

    let position = buffer.push_floats(
        mesh.vertices.iter().map(|v| {
            let p = v.position;
            [p.x as f32, p.y as f32, p.z as f32]
        }),
        count,
    );
    let (min, max) = calculate_bounds(mesh);
    buffer.accessors[position]["min"] = json!(min);
    buffer.accessors[position]["max"] = json!(max);
    attributes.insert("POSITION".into(), json!(position));

    if mesh.layout.normals {
        let normal = buffer.push_floats(
            mesh.vertices.iter().map(|v| {
                let n = v.normal;
                [n.x as f32, n.y as f32, n.z as f32]
            }),
            count,
        );
        attributes.insert("NORMAL".into(), json!(normal));
    }

    if mesh.layout.uvs {
        // glTF puts the texture origin at the top left
        let uv = buffer.push_floats(
            mesh.vertices.iter().map(|v| [v.uv.x as f32, 1.0 - v.uv.y as f32]),
            count,
        );
        attributes.insert("TEXCOORD_0".into(), json!(uv));
    }

    if mesh.layout.colors {
        let color = buffer.push_floats(mesh.vertices.iter().map(|v| v.color.to_array()), count);
        attributes.insert("COLOR_0".into(), json!(color));
    }

    let indices_accessor = buffer.push_indices(&indices);

    let document = json!({
        "asset": {
            "generator": "meshslice",
            "version": "2.0"
        },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{
            "primitives": [{
                "attributes": attributes,
                "indices": indices_accessor,
                "mode": 4
            }]
        }],
        "accessors": buffer.accessors,
        "bufferViews": buffer.views,
        "buffers": [{ "byteLength": buffer.data.len() }]
    });

    Ok((document, buffer.data))
}

fn calculate_bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for vertex in &mesh.vertices {
        let p = [vertex.position.x as f32, vertex.position.y as f32, vertex.position.z as f32];
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }

    (min, max)
}

fn align_to_multiple_of_four(n: usize) -> usize {
    (n + 3) & !3
}
