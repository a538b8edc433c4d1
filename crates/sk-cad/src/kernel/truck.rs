//! Truck CAD Kernel Backend
//!
//! Pure Rust B-Rep kernel using the Truck library.
//!
//! Truck has no placement transforms on faces, so every triangulation is
//! reported in global coordinates. Its mesher takes a single chordal
//! tolerance; angular deflection is accepted but not used.

use glam::DVec3;

use truck_meshalgo::prelude::*;
use truck_modeling::{
    Edge, Face, Point3, Rad, Shell, Solid as TruckSolid, Vector3, Vertex, Wire, builder,
};
use truck_polymesh::PolygonMesh;

use super::{
    BooleanType, CadError, CadKernel, CadResult, FaceTriangulation, HandleRegistry, Shape,
    ShapeKind, TessellationParams,
};
use crate::geom::Axis;

/// One full revolution; truck closes any sweep at or beyond this angle
const FULL_TURN: f64 = std::f64::consts::TAU;

/// Extents below this are treated as degenerate when scaling tolerances
const MIN_EXTENT: f64 = 1e-9;

/// Chordal tolerance for orientation checks, relative to the shape extent
const ORIENTATION_MESH_RATIO: f64 = 0.01;

/// Kernel objects as stored in the handle table
#[derive(Clone)]
enum TruckShape {
    Wire(Wire),
    Face(Face),
    Solid(TruckSolid),
    Compound(Vec<TruckSolid>),
}

impl TruckShape {
    fn kind(&self) -> ShapeKind {
        match self {
            Self::Wire(_) => ShapeKind::Wire,
            Self::Face(_) => ShapeKind::Face,
            Self::Solid(_) => ShapeKind::Solid,
            Self::Compound(_) => ShapeKind::Compound,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Wire(wire) => wire.is_empty(),
            Self::Face(_) => false,
            Self::Solid(solid) => solid.boundaries().is_empty(),
            Self::Compound(solids) => solids.iter().all(|s| s.boundaries().is_empty()),
        }
    }
}

fn point3(v: DVec3) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

fn vector3(v: DVec3) -> Vector3 {
    Vector3::new(v.x, v.y, v.z)
}

fn dvec3(p: Point3) -> DVec3 {
    DVec3::new(p.x, p.y, p.z)
}

/// Truck-based CAD kernel
pub struct TruckKernel {
    /// Storage for kernel objects (keyed by handle)
    shapes: HandleRegistry<TruckShape>,
    /// Geometric tolerance for boolean operations and bounds estimation
    tolerance: f64,
}

impl TruckKernel {
    /// Tolerance used by [`TruckKernel::new`]
    pub const DEFAULT_TOLERANCE: f64 = 0.05;

    /// Create a new Truck kernel
    pub fn new() -> Self {
        Self::with_tolerance(Self::DEFAULT_TOLERANCE)
    }

    /// Create a kernel with a custom boolean tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            shapes: HandleRegistry::new(),
            tolerance,
        }
    }

    /// Boolean tolerance in model units
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn store(&self, shape: TruckShape) -> Shape {
        self.shapes.insert(shape)
    }

    fn fetch_wire(&self, shape: &Shape) -> CadResult<Wire> {
        match self.shapes.get(shape)? {
            TruckShape::Wire(wire) => Ok(wire),
            other => Err(CadError::InvalidArgument(format!(
                "expected a wire, got a {}",
                other.kind()
            ))),
        }
    }

    fn fetch_face(&self, shape: &Shape) -> CadResult<Face> {
        match self.shapes.get(shape)? {
            TruckShape::Face(face) => Ok(face),
            other => Err(CadError::InvalidArgument(format!(
                "expected a face, got a {}",
                other.kind()
            ))),
        }
    }

    /// Resolve a boolean operand; compounds are merged into one solid
    fn fetch_solid(&self, shape: &Shape) -> CadResult<TruckSolid> {
        match self.shapes.get(shape)? {
            TruckShape::Solid(solid) => Ok(solid),
            TruckShape::Compound(solids) => {
                let shells: Vec<Shell> = solids
                    .iter()
                    .flat_map(|solid| solid.boundaries().iter().cloned())
                    .collect();
                TruckSolid::try_new(shells).map_err(|e| {
                    CadError::OperationFailed(format!("Failed to merge compound: {:?}", e))
                })
            }
            other => Err(CadError::InvalidArgument(format!(
                "boolean operands must be solids, got a {}",
                other.kind()
            ))),
        }
    }

    /// Build a planar face, mapping truck's error
    fn attach_plane(wire: Wire) -> CadResult<Face> {
        builder::try_attach_plane(&[wire])
            .map_err(|e| CadError::InvalidProfile(format!("Failed to create face: {:?}", e)))
    }

    /// Signed volume of a solid, meshed finely enough for its size
    fn solid_volume(&self, solid: &TruckSolid) -> f64 {
        let shape = TruckShape::Solid(solid.clone());
        let faces = Self::triangulate(&shape, self.tolerance);
        let fine = node_extent(&faces) * ORIENTATION_MESH_RATIO;
        if fine > MIN_EXTENT && fine < self.tolerance {
            signed_volume(&Self::triangulate(&shape, fine))
        } else {
            signed_volume(&faces)
        }
    }

    /// Flip a swept or revolved solid whose faces point inward
    ///
    /// Sweeps follow the winding of their profile, so a profile whose normal
    /// opposes the sweep direction yields an inside-out solid.
    fn outward(&self, mut solid: TruckSolid) -> TruckSolid {
        if self.solid_volume(&solid) < 0.0 {
            solid.not();
        }
        solid
    }

    fn solid_is_valid(&self, solid: &TruckSolid) -> bool {
        let shells = solid.boundaries();
        !shells.is_empty()
            && TruckSolid::try_new(shells.clone()).is_ok()
            && shells
                .iter()
                .all(|shell| shell.face_iter().all(face_is_valid))
            && self.solid_volume(solid) > 0.0
    }

    /// Mesh every face of a stored object at the given chordal tolerance
    fn triangulate(shape: &TruckShape, tolerance: f64) -> Vec<Option<FaceTriangulation>> {
        let mut faces = Vec::new();
        match shape {
            TruckShape::Wire(_) => {}
            TruckShape::Face(face) => {
                let shell: Shell = vec![face.clone()].into();
                collect_shell(&shell.triangulation(tolerance), &mut faces);
            }
            TruckShape::Solid(solid) => {
                for shell in solid.triangulation(tolerance).boundaries() {
                    collect_shell(shell, &mut faces);
                }
            }
            TruckShape::Compound(solids) => {
                for solid in solids {
                    for shell in solid.triangulation(tolerance).boundaries() {
                        collect_shell(shell, &mut faces);
                    }
                }
            }
        }
        faces
    }

    fn bounds_of(&self, shape: &TruckShape) -> CadResult<(DVec3, DVec3)> {
        let (points, margin): (Vec<DVec3>, f64) = match shape {
            TruckShape::Wire(wire) => (wire.vertex_iter().map(|v| dvec3(v.point())).collect(), 0.0),
            _ => (
                Self::triangulate(shape, self.tolerance)
                    .iter()
                    .flatten()
                    .flat_map(|face| face.nodes.iter().copied())
                    .collect(),
                self.tolerance,
            ),
        };

        let mut iter = points.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| CadError::OperationFailed("Shape has no geometry to bound".into()))?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Ok((min - DVec3::splat(margin), max + DVec3::splat(margin)))
    }

    fn mesh_tolerance(&self, shape: &TruckShape, params: &TessellationParams) -> CadResult<f64> {
        if !params.relative {
            return Ok(params.linear_deflection);
        }
        let (min, max) = self.bounds_of(shape)?;
        let size = (max - min).length();
        let scale = if size > MIN_EXTENT { size } else { 1.0 };
        Ok(params.linear_deflection * scale)
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the per-face meshes of a triangulated shell
fn collect_shell<C>(
    shell: &truck_topology::Shell<Point3, C, Option<PolygonMesh>>,
    out: &mut Vec<Option<FaceTriangulation>>,
) {
    for face in shell.face_iter() {
        let mesh = face.surface();
        out.push(
            mesh.as_ref()
                .and_then(|mesh| face_triangulation(mesh, face.orientation())),
        );
    }
}

/// Convert one face mesh, fanning polygons and honoring face orientation
fn face_triangulation(mesh: &PolygonMesh, orientation: bool) -> Option<FaceTriangulation> {
    let nodes: Vec<DVec3> = mesh.positions().iter().map(|p| dvec3(*p)).collect();

    let mut triangles = Vec::new();
    for polygon in mesh.faces().face_iter() {
        for i in 1..polygon.len().saturating_sub(1) {
            let a = polygon[0].pos as u32;
            let b = polygon[i].pos as u32;
            let c = polygon[i + 1].pos as u32;
            triangles.push(if orientation { [a, b, c] } else { [a, c, b] });
        }
    }

    if triangles.is_empty() {
        None
    } else {
        Some(FaceTriangulation::global(nodes, triangles))
    }
}

fn boxes_overlap(a: &(DVec3, DVec3), b: &(DVec3, DVec3)) -> bool {
    a.0.cmple(b.1).all() && b.0.cmple(a.1).all()
}

fn face_is_valid(face: &Face) -> bool {
    let boundaries = face.boundaries();
    !boundaries.is_empty() && boundaries.iter().all(|wire| wire.is_closed())
}

/// Signed volume of closed triangulations; positive when faces point outward
fn signed_volume(faces: &[Option<FaceTriangulation>]) -> f64 {
    faces
        .iter()
        .flatten()
        .flat_map(|face| {
            face.triangles.iter().filter_map(|[a, b, c]| {
                let a = face.nodes.get(*a as usize)?;
                let b = face.nodes.get(*b as usize)?;
                let c = face.nodes.get(*c as usize)?;
                Some(a.dot(b.cross(c)))
            })
        })
        .sum::<f64>()
        / 6.0
}

/// Largest side of the box around the meshed nodes
fn node_extent(faces: &[Option<FaceTriangulation>]) -> f64 {
    let mut nodes = faces.iter().flatten().flat_map(|face| face.nodes.iter().copied());
    let Some(first) = nodes.next() else {
        return 0.0;
    };
    let (min, max) = nodes.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
    (max - min).max_element()
}

impl CadKernel for TruckKernel {
    fn name(&self) -> &str {
        "truck"
    }

    fn version(&self) -> &str {
        "truck-modeling 0.6"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn polyline_wire(&self, points: &[DVec3], closed: bool) -> CadResult<Shape> {
        if points.len() < 2 {
            return Err(CadError::InvalidProfile(
                "Wire must have at least 2 points".into(),
            ));
        }

        let vertices: Vec<Vertex> = points.iter().map(|p| builder::vertex(point3(*p))).collect();

        // Create edges between consecutive vertices
        let mut edges: Vec<Edge> = vertices
            .windows(2)
            .map(|pair| builder::line(&pair[0], &pair[1]))
            .collect();
        if closed && let (Some(first), Some(last)) = (vertices.first(), vertices.last()) {
            edges.push(builder::line(last, first));
        }

        let wire: Wire = edges.into();
        if !wire.is_continuous() {
            return Err(CadError::OperationFailed(
                "Edges do not form a connected wire".into(),
            ));
        }
        if closed && !wire.is_closed() {
            return Err(CadError::OperationFailed("Wire could not be closed".into()));
        }

        Ok(self.store(TruckShape::Wire(wire)))
    }

    fn planar_face(&self, wire: &Shape) -> CadResult<Shape> {
        let wire = self.fetch_wire(wire)?;
        if !wire.is_closed() {
            return Err(CadError::InvalidProfile(
                "Wire must be closed to bound a face".into(),
            ));
        }

        let face = Self::attach_plane(wire)?;
        Ok(self.store(TruckShape::Face(face)))
    }

    fn extrude(&self, face: &Shape, vector: DVec3) -> CadResult<Shape> {
        let face = self.fetch_face(face)?;

        let solid: TruckSolid = builder::tsweep(&face, vector3(vector));
        Ok(self.store(TruckShape::Solid(self.outward(solid))))
    }

    fn revolve(&self, face: &Shape, axis: &Axis, angle: f64) -> CadResult<Shape> {
        let face = self.fetch_face(face)?;

        // A negative angle is a positive one about the reversed axis
        let (direction, angle) = if angle < 0.0 {
            (axis.direction.reversed(), -angle)
        } else {
            (axis.direction, angle)
        };

        // Revolve the face
        let solid: TruckSolid = builder::rsweep(
            &face,
            point3(axis.origin.to_dvec3()),
            vector3(direction.to_dvec3()),
            Rad(angle.min(FULL_TURN)),
        );

        Ok(self.store(TruckShape::Solid(self.outward(solid))))
    }

    fn boolean(&self, a: &Shape, b: &Shape, op: BooleanType) -> CadResult<Shape> {
        let solid_a = self.fetch_solid(a)?;
        let solid_b = self.fetch_solid(b)?;

        // Truck's boolean needs intersecting boundaries; separated operands
        // are resolved here
        let bounds_a = self.bounds_of(&TruckShape::Solid(solid_a.clone()))?;
        let bounds_b = self.bounds_of(&TruckShape::Solid(solid_b.clone()))?;
        if !boxes_overlap(&bounds_a, &bounds_b) {
            return match op {
                BooleanType::Union => {
                    Ok(self.store(TruckShape::Compound(vec![solid_a, solid_b])))
                }
                BooleanType::Subtract => Ok(self.store(TruckShape::Solid(solid_a))),
                BooleanType::Intersect => Err(CadError::BooleanFailed(
                    "Operands do not overlap".into(),
                )),
            };
        }

        let result = match op {
            BooleanType::Union => truck_shapeops::or(&solid_a, &solid_b, self.tolerance),
            BooleanType::Subtract => {
                let mut tool = solid_b;
                tool.not();
                truck_shapeops::and(&solid_a, &tool, self.tolerance)
            }
            BooleanType::Intersect => truck_shapeops::and(&solid_a, &solid_b, self.tolerance),
        };

        let solid = result.ok_or_else(|| {
            CadError::BooleanFailed(format!("Truck could not compute the {}", op.name()))
        })?;
        Ok(self.store(TruckShape::Solid(solid)))
    }

    fn make_box(&self, min: DVec3, max: DVec3) -> CadResult<Shape> {
        let size = max - min;

        let vertex = builder::vertex(point3(min));
        let edge = builder::tsweep(&vertex, Vector3::new(size.x, 0.0, 0.0));
        let face = builder::tsweep(&edge, Vector3::new(0.0, size.y, 0.0));
        let solid: TruckSolid = builder::tsweep(&face, Vector3::new(0.0, 0.0, size.z));

        Ok(self.store(TruckShape::Solid(self.outward(solid))))
    }

    fn make_cylinder(&self, axis: &Axis, radius: f64, height: f64) -> CadResult<Shape> {
        let origin = axis.origin.to_dvec3();
        let direction = axis.direction.to_dvec3();

        // Circle at the base, swept along the axis
        let rim = builder::vertex(point3(origin + axis.direction.perpendicular() * radius));
        let circle: Wire =
            builder::rsweep(&rim, point3(origin), vector3(direction), Rad(FULL_TURN));
        let disk = Self::attach_plane(circle)?;
        let solid: TruckSolid = builder::tsweep(&disk, vector3(direction * height));

        Ok(self.store(TruckShape::Solid(self.outward(solid))))
    }

    fn make_sphere(&self, center: DVec3, radius: f64) -> CadResult<Shape> {
        // Semicircle from pole to pole; `cone` collapses the pole edges so the
        // revolved shell closes
        let north = builder::vertex(point3(center + DVec3::Z * radius));
        let south = builder::vertex(point3(center - DVec3::Z * radius));
        let arc = builder::circle_arc(&north, &south, point3(center + DVec3::X * radius));
        let profile: Wire = vec![arc].into();
        let shell = builder::cone(&profile, vector3(DVec3::Z), Rad(FULL_TURN));

        let solid = TruckSolid::try_new(vec![shell])
            .map_err(|e| CadError::OperationFailed(format!("Failed to close sphere: {:?}", e)))?;
        Ok(self.store(TruckShape::Solid(self.outward(solid))))
    }

    fn make_cone(
        &self,
        axis: &Axis,
        bottom_radius: f64,
        top_radius: f64,
        height: f64,
    ) -> CadResult<Shape> {
        let origin = axis.origin.to_dvec3();
        let direction = axis.direction.to_dvec3();
        let radial = axis.direction.perpendicular();
        let top = origin + direction * height;

        // Profile runs from the top center down to the base center; rims of
        // zero radius are left out so the profile never has a zero edge
        let mut profile = vec![top];
        if top_radius > 0.0 {
            profile.push(top + radial * top_radius);
        }
        if bottom_radius > 0.0 {
            profile.push(origin + radial * bottom_radius);
        }
        profile.push(origin);

        let vertices: Vec<Vertex> = profile.iter().map(|p| builder::vertex(point3(*p))).collect();
        let edges: Vec<Edge> = vertices
            .windows(2)
            .map(|pair| builder::line(&pair[0], &pair[1]))
            .collect();
        let wire: Wire = edges.into();

        let shell = builder::cone(&wire, vector3(direction), Rad(FULL_TURN));
        let solid = TruckSolid::try_new(vec![shell])
            .map_err(|e| CadError::OperationFailed(format!("Failed to close cone: {:?}", e)))?;
        Ok(self.store(TruckShape::Solid(self.outward(solid))))
    }

    fn make_torus(
        &self,
        axis: &Axis,
        major_radius: f64,
        minor_radius: f64,
    ) -> CadResult<Shape> {
        let origin = axis.origin.to_dvec3();
        let direction = axis.direction.to_dvec3();
        let radial = axis.direction.perpendicular();

        // Tube cross-section lies in the plane spanned by the axis and `radial`
        let tube_center = origin + radial * major_radius;
        let tube_axis = direction.cross(radial);
        let start = builder::vertex(point3(tube_center + radial * minor_radius));
        let circle: Wire = builder::rsweep(
            &start,
            point3(tube_center),
            vector3(tube_axis),
            Rad(FULL_TURN),
        );
        let disk = Self::attach_plane(circle)?;
        let solid: TruckSolid =
            builder::rsweep(&disk, point3(origin), vector3(direction), Rad(FULL_TURN));

        Ok(self.store(TruckShape::Solid(self.outward(solid))))
    }

    fn mesh_faces(
        &self,
        shape: &Shape,
        params: &TessellationParams,
    ) -> CadResult<Vec<Option<FaceTriangulation>>> {
        let shape = self.shapes.get(shape)?;
        let tolerance = self.mesh_tolerance(&shape, params)?;
        Ok(Self::triangulate(&shape, tolerance))
    }

    fn check(&self, shape: &Shape) -> CadResult<bool> {
        let valid = match self.shapes.get(shape)? {
            TruckShape::Wire(wire) => !wire.is_empty() && wire.is_continuous(),
            TruckShape::Face(face) => face_is_valid(&face),
            TruckShape::Solid(solid) => self.solid_is_valid(&solid),
            TruckShape::Compound(solids) => {
                !solids.is_empty() && solids.iter().all(|solid| self.solid_is_valid(solid))
            }
        };
        Ok(valid)
    }

    fn kind(&self, shape: &Shape) -> CadResult<ShapeKind> {
        Ok(self.shapes.get(shape)?.kind())
    }

    fn is_empty(&self, shape: &Shape) -> CadResult<bool> {
        Ok(self.shapes.get(shape)?.is_empty())
    }

    fn bounding_box(&self, shape: &Shape) -> CadResult<(DVec3, DVec3)> {
        let shape = self.shapes.get(shape)?;
        self.bounds_of(&shape)
    }

    fn release(&self, shape: Shape) -> bool {
        self.shapes.remove(shape).is_some()
    }

    fn live_shapes(&self) -> usize {
        self.shapes.len()
    }
}
