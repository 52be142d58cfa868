// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::geometry::Mesh;
use crate::utils::math::triangle_cross;
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read an ASCII or binary STL file into an indexed mesh.
///
/// stl_io already shares vertices with identical coordinates. Normals are
/// rebuilt from the welded topology.
pub fn import_stl(path: impl AsRef<Path>) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open STL file: {:?}", path))?;
    let mut reader = BufReader::new(file);
    let stl = stl_io::read_stl(&mut reader).with_context(|| format!("Failed to parse STL file: {:?}", path))?;

    let positions: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let indices = stl.faces.iter().flat_map(|face| face.vertices).collect();

    let mut mesh = Mesh::from_buffers(&positions, None, None, indices);
    mesh.validate()
        .with_context(|| format!("STL file has an invalid index buffer: {:?}", path))?;
    mesh.recompute_normals();

    log::debug!(
        "imported {:?}: {} vertices, {} triangles",
        path,
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Export mesh to binary STL
pub fn export_stl(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let to_stl = |p: &Point3<f64>| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<StlTriangle> = mesh
        .triangles()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.triangle_positions(triangle);
            let normal = facet_normal(&v0, &v1, &v2);

            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [to_stl(&v0), to_stl(&v1), to_stl(&v2)],
            }
        })
        .collect();

    let file = File::create(path.as_ref()).context("Failed to create STL file")?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).context("Failed to write STL file")?;
    writer.flush()?;

    Ok(())
}

/// Export mesh to ASCII STL
pub fn export_stl_ascii(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref()).context("Failed to create STL file")?;
    let mut file = BufWriter::new(file);

    writeln!(file, "solid meshslice")?;

    for triangle in mesh.triangles() {
        let [v0, v1, v2] = mesh.triangle_positions(triangle);
        let normal = facet_normal(&v0, &v1, &v2);

        writeln!(file, "  facet normal {} {} {}", normal.x, normal.y, normal.z)?;
        writeln!(file, "    outer loop")?;
        for v in [v0, v1, v2] {
            writeln!(file, "      vertex {} {} {}", v.x, v.y, v.z)?;
        }
        writeln!(file, "    endloop")?;
        writeln!(file, "  endfacet")?;
    }

    writeln!(file, "endsolid meshslice")?;
    file.flush()?;

    Ok(())
}

/// Facet normal from winding; zero for sliver triangles
fn facet_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    triangle_cross(v0, v1, v2)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::zeros)
}
