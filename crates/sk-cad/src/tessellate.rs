//! Tessellation layer
//!
//! Meshes a shape through the kernel and flattens the per-face
//! triangulations into one triangle soup with smoothed vertex normals.

use glam::{DVec3, Vec3};

use crate::kernel::{CadError, CadResult, FaceTriangulation, Shape, TessellationParams};
use crate::modeler::Modeler;

/// Accumulated normals shorter than this are emitted as zero
const NORMAL_EPSILON: f64 = 1e-7;

/// Flat triangle mesh produced by tessellation
///
/// `normals` runs parallel to `vertices`; every three `indices` form one
/// triangle wound along its face's outward orientation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Vertex positions as `x, y, z, x, y, z, ...`
    pub fn flat_vertices(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertex normals as `x, y, z, x, y, z, ...`
    pub fn flat_normals(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Axis-aligned bounds of the vertices, `None` for an empty buffer
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(|v| Vec3::from_array(*v));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }

    /// Signed volume enclosed by the triangles
    ///
    /// Only meaningful for a closed mesh; outward winding gives a positive
    /// value. Triangles referencing a missing vertex are skipped.
    pub fn enclosed_volume(&self) -> f64 {
        let point = |i: u32| {
            let [x, y, z] = *self.vertices.get(i as usize)?;
            Some(DVec3::new(x as f64, y as f64, z as f64))
        };
        self.triangles()
            .filter_map(|[a, b, c]| Some(point(a)?.dot(point(b)?.cross(point(c)?))))
            .sum::<f64>()
            / 6.0
    }
}

/// Flatten per-face triangulations into a single buffer
///
/// Faces without a triangulation are skipped. Nodes are moved to the global
/// frame, facet normals are summed at each vertex of a face and normalized,
/// and indices are offset by the vertices already emitted.
pub fn flatten_faces(faces: &[Option<FaceTriangulation>]) -> CadResult<MeshBuffer> {
    let mut mesh = MeshBuffer::default();

    for (face_index, face) in faces.iter().enumerate() {
        let Some(face) = face else {
            continue;
        };

        let node_count = face.nodes.len();
        if let Some(bad) = face
            .triangles
            .iter()
            .flatten()
            .find(|&&i| i as usize >= node_count)
        {
            return Err(CadError::TessellationFailed(format!(
                "face {} references node {} of {}",
                face_index, bad, node_count
            )));
        }

        let offset = u32::try_from(mesh.vertices.len()).map_err(|_| {
            CadError::TessellationFailed("mesh exceeds the 32-bit index range".into())
        })?;

        let nodes: Vec<DVec3> = face
            .nodes
            .iter()
            .map(|node| face.placement.transform_point3(*node))
            .collect();

        let mut sums = vec![DVec3::ZERO; node_count];
        for &[a, b, c] in &face.triangles {
            let (p0, p1, p2) = (nodes[a as usize], nodes[b as usize], nodes[c as usize]);
            let normal = (p1 - p0).cross(p2 - p0);
            sums[a as usize] += normal;
            sums[b as usize] += normal;
            sums[c as usize] += normal;
        }

        mesh.vertices
            .extend(nodes.iter().map(|p| p.as_vec3().to_array()));
        mesh.normals.extend(sums.iter().map(|n| {
            let length = n.length();
            if length < NORMAL_EPSILON {
                [0.0; 3]
            } else {
                (*n / length).as_vec3().to_array()
            }
        }));
        mesh.indices.extend(
            face.triangles
                .iter()
                .flatten()
                .map(|&i| i + offset),
        );
    }

    if mesh.vertices.is_empty() {
        return Err(CadError::TessellationFailed("mesh has no vertices".into()));
    }
    if mesh.indices.is_empty() {
        return Err(CadError::TessellationFailed("mesh has no triangles".into()));
    }
    Ok(mesh)
}

impl Modeler {
    /// Tessellate a shape into a flat triangle mesh
    pub fn tessellate(&self, shape: &Shape, params: &TessellationParams) -> CadResult<MeshBuffer> {
        params.validate()?;
        if self.delegate("tessellate", |k| k.is_empty(shape))? {
            return Err(CadError::InvalidArgument(format!(
                "shape {} is empty",
                shape.id()
            )));
        }

        let faces = self.delegate("tessellate", |k| k.mesh_faces(shape, params))?;
        let mesh = flatten_faces(&faces)?;
        tracing::debug!(
            "Tessellated {} faces into {} triangles",
            faces.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Tessellate with the configured default parameters
    pub fn tessellate_default(&self, shape: &Shape) -> CadResult<MeshBuffer> {
        let params = self.config().tessellation.params();
        self.tessellate(shape, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DMat4;

    fn quad() -> FaceTriangulation {
        FaceTriangulation::global(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_flatten_single_face() {
        let mesh = flatten_faces(&[Some(quad())]).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.normals.len(), 4);
        for normal in &mesh.normals {
            assert_relative_eq!(normal[2], 1.0);
        }
        assert_eq!(mesh.flat_vertices().len(), 12);
    }

    #[test]
    fn test_indices_are_offset_per_face() {
        let mesh = flatten_faces(&[Some(quad()), None, Some(quad())]).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
        let triangles: Vec<[u32; 3]> = mesh.triangles().collect();
        assert_eq!(triangles[2], [4, 5, 6]);
        assert_eq!(triangles[3], [4, 6, 7]);
    }

    #[test]
    fn test_placement_applied() {
        let mut face = quad();
        face.placement = DMat4::from_translation(DVec3::new(0.0, 0.0, 5.0));

        let mesh = flatten_faces(&[Some(face)]).unwrap();
        assert!(mesh.vertices.iter().all(|v| v[2] == 5.0));

        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min.to_array(), [0.0, 0.0, 5.0]);
        assert_eq!(max.to_array(), [1.0, 1.0, 5.0]);
    }

    #[test]
    fn test_rotated_placement_turns_normals() {
        let mut face = quad();
        face.placement = DMat4::from_rotation_x(std::f64::consts::FRAC_PI_2);

        let mesh = flatten_faces(&[Some(face)]).unwrap();
        for normal in &mesh.normals {
            assert_relative_eq!(normal[1], -1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_unused_node_gets_zero_normal() {
        let face = FaceTriangulation::global(
            vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(7.0, 7.0, 7.0)],
            vec![[0, 1, 2]],
        );

        let mesh = flatten_faces(&[Some(face)]).unwrap();
        assert_eq!(mesh.normals[3], [0.0, 0.0, 0.0]);
        assert_relative_eq!(mesh.normals[0][2], 1.0);
    }

    #[test]
    fn test_bad_index_rejected() {
        let face = FaceTriangulation::global(vec![DVec3::ZERO, DVec3::X], vec![[0, 1, 2]]);
        assert!(matches!(
            flatten_faces(&[Some(face)]),
            Err(CadError::TessellationFailed(_))
        ));
    }

    #[test]
    fn test_volume_skips_missing_vertices() {
        let mut mesh = MeshBuffer {
            vertices: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            normals: vec![[0.0; 3]; 4],
            indices: vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
        };
        assert_relative_eq!(mesh.enclosed_volume(), 1.0 / 6.0, epsilon = 1e-9);

        mesh.indices.extend([1, 2, 9]);
        assert_relative_eq!(mesh.enclosed_volume(), 1.0 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(flatten_faces(&[]).is_err());
        assert!(flatten_faces(&[None, None]).is_err());

        let no_triangles = FaceTriangulation::global(vec![DVec3::ZERO], Vec::new());
        assert!(matches!(
            flatten_faces(&[Some(no_triangles)]),
            Err(CadError::TessellationFailed(_))
        ));
    }

    #[cfg(feature = "truck")]
    mod kernel {
        use super::*;
        use std::f64::consts::PI;

        #[test]
        fn test_cube_mesh() {
            let modeler = Modeler::new();
            let cube = modeler.make_box(1.0, 1.0, 1.0).unwrap();

            let mesh = modeler
                .tessellate(&cube, &TessellationParams::new(0.01, 0.1))
                .unwrap();
            assert_eq!(mesh.triangle_count(), 12);
            assert!(mesh.vertex_count() <= 24);
            assert!(
                mesh.indices
                    .iter()
                    .all(|&i| (i as usize) < mesh.vertex_count())
            );
            for normal in &mesh.normals {
                let length = Vec3::from_array(*normal).length();
                assert!(length == 0.0 || (length - 1.0).abs() < 1e-5);
            }

            let (min, max) = mesh.bounds().unwrap();
            assert_relative_eq!(min.x, 0.0, epsilon = 1e-6);
            assert_relative_eq!(max.z, 1.0, epsilon = 1e-6);
            assert_relative_eq!(mesh.enclosed_volume(), 1.0, epsilon = 1e-5);
        }

        #[test]
        fn test_sphere_volume() {
            let modeler = Modeler::new();
            let sphere = modeler.make_sphere(1.0).unwrap();

            let mesh = modeler
                .tessellate(&sphere, &TessellationParams::new(0.005, 0.1))
                .unwrap();
            assert_relative_eq!(mesh.enclosed_volume(), 4.0 / 3.0 * PI, epsilon = 0.08);
        }

        #[test]
        fn test_relative_deflection() {
            let modeler = Modeler::new();
            let sphere = modeler.make_sphere(1.0).unwrap();

            let fine = modeler
                .tessellate(&sphere, &TessellationParams::new(0.001, 0.1).relative())
                .unwrap();
            let coarse = modeler
                .tessellate(&sphere, &TessellationParams::new(0.05, 0.1).relative())
                .unwrap();
            assert!(fine.triangle_count() > coarse.triangle_count());
        }

        #[test]
        fn test_invalid_params_rejected() {
            let modeler = Modeler::new();
            let cube = modeler.make_box(1.0, 1.0, 1.0).unwrap();

            assert!(matches!(
                modeler.tessellate(&cube, &TessellationParams::new(0.0, 0.5)),
                Err(CadError::InvalidArgument(_))
            ));
            assert!(matches!(
                modeler.tessellate(&cube, &TessellationParams::new(0.1, f64::NAN)),
                Err(CadError::InvalidArgument(_))
            ));
        }

        #[test]
        fn test_wire_has_nothing_to_mesh() {
            let modeler = Modeler::new();
            let wire = modeler
                .wire_from_points_3d(&[DVec3::ZERO, DVec3::X], false)
                .unwrap()
                .wire;

            assert!(matches!(
                modeler.tessellate(&wire, &TessellationParams::default()),
                Err(CadError::TessellationFailed(_))
            ));
        }

        #[test]
        fn test_default_params_from_config() {
            let modeler = Modeler::new();
            let cylinder = modeler.make_cylinder(1.0, 2.0).unwrap();

            let mesh = modeler.tessellate_default(&cylinder).unwrap();
            assert!(mesh.triangle_count() > 0);
        }
    }
}
