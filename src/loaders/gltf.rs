use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use log::{debug, info, warn};
use std::ops::Range;
use std::path::Path;

use crate::math::AABB;
use crate::types::Vertex;

/// Geometry and materials of one model file, node transforms already applied
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub primitives: Vec<Primitive>,
    pub materials: Vec<MaterialData>,
    pub textures: Vec<TextureData>,
}

/// Index range drawn with one material
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub indices: Range<u32>,
    pub material: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub base_color: [f32; 4],
    /// Index into [`MeshData::textures`]
    pub texture: Option<usize>,
}

/// RGBA8 texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl MeshData {
    pub fn bounds(&self) -> Option<AABB> {
        let positions: Vec<Vec3> = self
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.position))
            .collect();
        AABB::from_points(&positions)
    }

    /// Append one primitive; `indices` refer to `vertices`
    fn push_primitive(&mut self, vertices: Vec<Vertex>, indices: Vec<u32>, material: Option<usize>) {
        let base = self.vertices.len() as u32;
        let start = self.indices.len() as u32;
        self.vertices.extend(vertices);
        self.indices.extend(indices.into_iter().map(|i| base + i));
        self.primitives.push(Primitive {
            indices: start..self.indices.len() as u32,
            material,
        });
    }
}

/// Load a glTF or GLB model
pub fn load_mesh(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let (document, buffers, images) = gltf::import(path)
        .with_context(|| format!("Failed to load glTF file: {:?}", path))?;

    let mut mesh = MeshData {
        materials: document.materials().map(material_data).collect(),
        ..MeshData::default()
    };

    for (index, image) in images.iter().enumerate() {
        let data = rgba8(image.format, &image.pixels).unwrap_or_else(|| {
            warn!(
                "{:?}: unsupported texture format {:?} for image {}, using white",
                path, image.format, index
            );
            vec![255; (image.width * image.height * 4) as usize]
        });
        mesh.textures.push(TextureData {
            width: image.width,
            height: image.height,
            data,
        });
    }

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .with_context(|| format!("{:?} contains no scene", path))?;
    for node in scene.nodes() {
        process_node(&node, &buffers, Mat4::IDENTITY, &mut mesh)
            .with_context(|| format!("Failed to read geometry from {:?}", path))?;
    }

    if mesh.indices.is_empty() {
        warn!("{:?}: no triangles found", path);
    }
    info!(
        "Loaded {:?}: {} vertices, {} triangles, {} primitives, {} textures",
        path.file_name().unwrap_or_default(),
        mesh.vertices.len(),
        mesh.indices.len() / 3,
        mesh.primitives.len(),
        mesh.textures.len()
    );
    if let Some(bounds) = mesh.bounds() {
        debug!("  bounds {:?} .. {:?}", bounds.min, bounds.max);
    }

    Ok(mesh)
}

fn material_data(material: gltf::Material) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();
    MaterialData {
        base_color: pbr.base_color_factor(),
        texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
    }
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Mat4,
    mesh: &mut MeshData,
) -> Result<()> {
    let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(source) = node.mesh() {
        for primitive in source.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!("Skipping non-triangle primitive in {:?}", source.name());
                continue;
            }
            process_primitive(&primitive, buffers, transform, mesh)?;
        }
    }

    for child in node.children() {
        process_node(&child, buffers, transform, mesh)?;
    }

    Ok(())
}

fn process_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
    mesh: &mut MeshData,
) -> Result<()> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .context("Mesh primitive has no positions")?
        .map(|p| transform.transform_point3(Vec3::from_array(p)))
        .collect();
    let mut uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(uvs) => uvs.into_f32().collect(),
        None => Vec::new(),
    };
    uvs.resize(positions.len(), [0.0, 0.0]);
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if indices.iter().any(|&i| i as usize >= positions.len()) {
        anyhow::bail!("Primitive index out of range ({} vertices)", positions.len());
    }

    let material = primitive.material().index();
    let normals = reader
        .read_normals()
        .map(|normals| normals.collect::<Vec<_>>())
        .filter(|normals| normals.len() == positions.len());
    match normals {
        Some(normals) => {
            let normal_transform = Mat3::from_mat4(transform).inverse().transpose();
            let vertices = positions
                .iter()
                .zip(normals)
                .zip(&uvs)
                .map(|((position, normal), uv)| Vertex {
                    position: position.to_array(),
                    normal: (normal_transform * Vec3::from_array(normal))
                        .normalize_or_zero()
                        .to_array(),
                    uv: *uv,
                })
                .collect();
            mesh.push_primitive(vertices, indices, material);
        }
        None => {
            let (vertices, indices) = flat_shaded(&positions, &uvs, &indices);
            mesh.push_primitive(vertices, indices, material);
        }
    }

    Ok(())
}

/// Unshare vertices so each triangle carries its face normal
pub fn flat_shaded(positions: &[Vec3], uvs: &[[f32; 2]], indices: &[u32]) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(indices.len());
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let normal = (positions[b] - positions[a])
            .cross(positions[c] - positions[a])
            .normalize_or_zero();
        for i in [a, b, c] {
            vertices.push(Vertex {
                position: positions[i].to_array(),
                normal: normal.to_array(),
                uv: uvs[i],
            });
        }
    }
    let indices = (0..vertices.len() as u32).collect();
    (vertices, indices)
}

/// Expand decoded image pixels to RGBA8
pub fn rgba8(format: gltf::image::Format, pixels: &[u8]) -> Option<Vec<u8>> {
    use gltf::image::Format;

    match format {
        Format::R8G8B8A8 => Some(pixels.to_vec()),
        Format::R8G8B8 => Some(
            pixels
                .chunks_exact(3)
                .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
                .collect(),
        ),
        Format::R8G8 => Some(
            pixels
                .chunks_exact(2)
                .flat_map(|rg| [rg[0], rg[1], 0, 255])
                .collect(),
        ),
        Format::R8 => Some(pixels.iter().flat_map(|&r| [r, r, r, 255]).collect()),
        _ => None,
    }
}
