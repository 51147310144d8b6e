use anyhow::{bail, Context, Result};
use image::RgbaImage;
use log::info;
use std::path::{Path, PathBuf};

/// Face order expected by cube textures: +X, -X, +Y, -Y, +Z, -Z
pub const FACE_NAMES: [&str; 6] = ["rt", "lf", "up", "dn", "bk", "ft"];

/// Six square RGBA8 faces of equal size, in cube layer order
#[derive(Debug, Clone)]
pub struct CubemapData {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
}

impl CubemapData {
    pub fn from_faces(faces: [RgbaImage; 6]) -> Result<Self> {
        let size = faces[0].width();
        for (image, name) in faces.iter().zip(FACE_NAMES) {
            let (width, height) = image.dimensions();
            if width != height {
                bail!("Skybox face {name} is not square ({width}x{height})");
            }
            if width != size {
                bail!("Skybox face {name} is {width}px, expected {size}px");
            }
        }
        if size == 0 {
            bail!("Skybox faces are empty");
        }

        Ok(Self {
            size,
            faces: faces.map(RgbaImage::into_raw),
        })
    }
}

/// Default face paths for a skybox named `prefix`, e.g. `skybox/plains_rt.tga`
pub fn face_paths(dir: impl AsRef<Path>, prefix: &str, extension: &str) -> [PathBuf; 6] {
    FACE_NAMES.map(|face| dir.as_ref().join(format!("{prefix}_{face}.{extension}")))
}

/// Decode six face images from disk
pub fn load_cubemap(paths: &[PathBuf; 6]) -> Result<CubemapData> {
    let mut faces = Vec::with_capacity(6);
    for path in paths {
        let image = image::open(path)
            .with_context(|| format!("Failed to load skybox face: {:?}", path))?;
        faces.push(image.to_rgba8());
    }
    let faces: [RgbaImage; 6] = faces
        .try_into()
        .map_err(|_| anyhow::anyhow!("Expected six skybox faces"))?;

    let cubemap = CubemapData::from_faces(faces)?;
    info!("Loaded skybox: 6 faces of {}px", cubemap.size);
    Ok(cubemap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faces(sizes: [(u32, u32); 6]) -> [RgbaImage; 6] {
        sizes.map(|(w, h)| RgbaImage::new(w, h))
    }

    #[test]
    fn test_cubemap_accepts_matching_square_faces() {
        let cubemap = CubemapData::from_faces(faces([(4, 4); 6])).unwrap();
        assert_eq!(cubemap.size, 4);
        assert!(cubemap.faces.iter().all(|f| f.len() == 4 * 4 * 4));
    }

    #[test]
    fn test_cubemap_rejects_non_square_face() {
        let mut sizes = [(4, 4); 6];
        sizes[2] = (4, 2);
        let err = CubemapData::from_faces(faces(sizes)).unwrap_err();
        assert!(err.to_string().contains("up"));
    }

    #[test]
    fn test_cubemap_rejects_mismatched_sizes() {
        let mut sizes = [(4, 4); 6];
        sizes[5] = (8, 8);
        let err = CubemapData::from_faces(faces(sizes)).unwrap_err();
        assert!(err.to_string().contains("ft"));
    }

    #[test]
    fn test_face_paths_order() {
        let paths = face_paths("skybox", "plains-of-abraham", "tga");
        assert_eq!(paths[0], PathBuf::from("skybox/plains-of-abraham_rt.tga"));
        assert_eq!(paths[5], PathBuf::from("skybox/plains-of-abraham_ft.tga"));
    }

    #[test]
    fn test_missing_face_reports_path() {
        let paths = face_paths("nowhere", "sky", "png");
        let err = load_cubemap(&paths).unwrap_err();
        assert!(format!("{err:?}").contains("sky_rt.png"));
    }
}
