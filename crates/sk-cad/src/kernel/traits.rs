//! CAD Kernel trait definitions
//!
//! These traits define the verbs the facade needs from a B-Rep kernel. The
//! kernel owns every topological object; callers only ever hold [`Shape`]
//! tokens that the kernel resolves through its handle table.

use glam::{DMat4, DVec3};
use thiserror::Error;
use uuid::Uuid;

use crate::geom::Axis;

/// Owning handle to a kernel-resident topological entity
///
/// A `Shape` is neither `Clone` nor `Copy`: exactly one owner exists, and the
/// handle is released by passing it by value to [`CadKernel::release`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    id: Uuid,
}

impl Shape {
    /// Wrap a handle-table identifier. Only kernel backends mint shapes.
    pub(crate) fn new(id: Uuid) -> Self {
        Self { id }
    }

    /// The identifier this handle resolves through
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Kind of topological entity behind a [`Shape`]
///
/// The discriminants are part of the C interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ShapeKind {
    Vertex = 0,
    Edge = 1,
    Wire = 2,
    Face = 3,
    Shell = 4,
    Solid = 5,
    Compound = 6,
}

impl ShapeKind {
    /// Integer code used at the C boundary
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode an integer code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Vertex),
            1 => Some(Self::Edge),
            2 => Some(Self::Wire),
            3 => Some(Self::Face),
            4 => Some(Self::Shell),
            5 => Some(Self::Solid),
            6 => Some(Self::Compound),
            _ => None,
        }
    }

    /// Lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::Wire => "wire",
            Self::Face => "face",
            Self::Shell => "shell",
            Self::Solid => "solid",
            Self::Compound => "compound",
        }
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanType {
    /// Union (fuse)
    Union,
    /// Difference (cut the second operand from the first)
    Subtract,
    /// Intersection (common)
    Intersect,
}

impl BooleanType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Union => "union",
            Self::Subtract => "difference",
            Self::Intersect => "intersection",
        }
    }
}

/// Error type for CAD kernel operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown shape handle: {0}")]
    UnknownHandle(Uuid),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Tessellation failed: {0}")]
    TessellationFailed(String),

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Kernel fault: {0}")]
    KernelFault(String),
}

/// Coarse classification of a [`CadError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected before reaching the kernel
    InvalidArgument,
    /// The kernel reported that the operation did not complete
    Construction,
    /// The kernel faulted while running the operation
    Fault,
}

impl CadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument(_) | Self::UnknownHandle(_) | Self::InvalidProfile(_) => {
                ErrorCategory::InvalidArgument
            }
            Self::BooleanFailed(_)
            | Self::TessellationFailed(_)
            | Self::KernelNotAvailable(_)
            | Self::OperationFailed(_) => ErrorCategory::Construction,
            Self::KernelFault(_) => ErrorCategory::Fault,
        }
    }
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// Mesh generation settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationParams {
    /// Maximum chordal distance between surface and mesh
    pub linear_deflection: f64,
    /// Maximum angle in radians between normals of adjacent facets
    pub angular_deflection: f64,
    /// Interpret `linear_deflection` relative to the shape's size
    pub relative: bool,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            linear_deflection: 0.1,
            angular_deflection: 0.5,
            relative: false,
        }
    }
}

impl TessellationParams {
    /// Create absolute-deflection parameters
    pub fn new(linear_deflection: f64, angular_deflection: f64) -> Self {
        Self {
            linear_deflection,
            angular_deflection,
            relative: false,
        }
    }

    /// Switch to size-relative linear deflection
    pub fn relative(mut self) -> Self {
        self.relative = true;
        self
    }

    /// Both deflections must be finite and strictly positive
    pub fn validate(&self) -> CadResult<()> {
        if !(self.linear_deflection.is_finite() && self.linear_deflection > 0.0) {
            return Err(CadError::InvalidArgument(format!(
                "linear deflection must be positive, got {}",
                self.linear_deflection
            )));
        }
        if !(self.angular_deflection.is_finite() && self.angular_deflection > 0.0) {
            return Err(CadError::InvalidArgument(format!(
                "angular deflection must be positive, got {}",
                self.angular_deflection
            )));
        }
        Ok(())
    }
}

/// Triangulation of a single face as reported by the kernel
///
/// Nodes are expressed in the face's local frame; `placement` maps them to
/// the shape's global frame. Triangle indices are zero-based into `nodes`.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTriangulation {
    /// Local-to-global transform of the face
    pub placement: DMat4,
    /// Mesh nodes in the local frame
    pub nodes: Vec<DVec3>,
    /// Triangles as index triples, wound along the face orientation
    pub triangles: Vec<[u32; 3]>,
}

impl FaceTriangulation {
    /// A triangulation already expressed in global coordinates
    pub fn global(nodes: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            placement: DMat4::IDENTITY,
            nodes,
            triangles,
        }
    }
}

/// The main CAD kernel trait
///
/// Implementations of this trait provide the actual geometry operations
/// using different backends. Every constructor returns a freshly minted
/// [`Shape`] owned by the caller; inputs are borrowed and never consumed.
pub trait CadKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Version string of the underlying kernel
    fn version(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Build a wire of straight edges through `points`
    ///
    /// Points are already free of coincident neighbours. When `closed` is
    /// set an edge joins the last point back to the first.
    fn polyline_wire(&self, points: &[DVec3], closed: bool) -> CadResult<Shape>;

    /// Build a planar face bounded by a closed wire
    fn planar_face(&self, wire: &Shape) -> CadResult<Shape>;

    /// Sweep a face along `vector` into a prism solid
    fn extrude(&self, face: &Shape, vector: DVec3) -> CadResult<Shape>;

    /// Revolve a face `angle` radians about `axis`
    fn revolve(&self, face: &Shape, axis: &Axis, angle: f64) -> CadResult<Shape>;

    /// Perform a boolean operation on two shapes
    ///
    /// # Arguments
    /// * `a` - The first operand (the base for a difference)
    /// * `b` - The second operand (the tool for a difference)
    /// * `op` - The boolean operation type
    fn boolean(&self, a: &Shape, b: &Shape, op: BooleanType) -> CadResult<Shape>;

    /// Axis-aligned box spanning `min` to `max`
    fn make_box(&self, min: DVec3, max: DVec3) -> CadResult<Shape>;

    /// Cylinder whose base disk is centered on the axis origin
    fn make_cylinder(&self, axis: &Axis, radius: f64, height: f64) -> CadResult<Shape>;

    /// Sphere around `center`
    fn make_sphere(&self, center: DVec3, radius: f64) -> CadResult<Shape>;

    /// Cone or frustum; `bottom_radius` lies at the axis origin
    fn make_cone(
        &self,
        axis: &Axis,
        bottom_radius: f64,
        top_radius: f64,
        height: f64,
    ) -> CadResult<Shape>;

    /// Torus around `axis`, centered at the axis origin
    fn make_torus(
        &self,
        axis: &Axis,
        major_radius: f64,
        minor_radius: f64,
    ) -> CadResult<Shape>;

    /// Mesh every face of a shape
    ///
    /// Returns one entry per face in a deterministic order; `None` marks a
    /// face the mesher produced no triangulation for.
    fn mesh_faces(
        &self,
        shape: &Shape,
        params: &TessellationParams,
    ) -> CadResult<Vec<Option<FaceTriangulation>>>;

    /// Topological consistency verdict for a shape
    fn check(&self, shape: &Shape) -> CadResult<bool>;

    /// Kind of entity behind a handle
    fn kind(&self, shape: &Shape) -> CadResult<ShapeKind>;

    /// Whether the shape carries no topology at all
    fn is_empty(&self, shape: &Shape) -> CadResult<bool>;

    /// Axis-aligned bounds as `(min, max)`
    fn bounding_box(&self, shape: &Shape) -> CadResult<(DVec3, DVec3)>;

    /// Drop the kernel object behind a handle
    ///
    /// Returns `false` when the handle did not resolve to a live object.
    fn release(&self, shape: Shape) -> bool;

    /// Number of objects currently held in the handle table
    fn live_shapes(&self) -> usize;
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> CadResult<T> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

impl CadKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn version(&self) -> &str {
        "0"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn polyline_wire(&self, _points: &[DVec3], _closed: bool) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn planar_face(&self, _wire: &Shape) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn extrude(&self, _face: &Shape, _vector: DVec3) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn revolve(&self, _face: &Shape, _axis: &Axis, _angle: f64) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn boolean(&self, _a: &Shape, _b: &Shape, _op: BooleanType) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn make_box(&self, _min: DVec3, _max: DVec3) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn make_cylinder(&self, _axis: &Axis, _radius: f64, _height: f64) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn make_sphere(&self, _center: DVec3, _radius: f64) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn make_cone(
        &self,
        _axis: &Axis,
        _bottom_radius: f64,
        _top_radius: f64,
        _height: f64,
    ) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn make_torus(
        &self,
        _axis: &Axis,
        _major_radius: f64,
        _minor_radius: f64,
    ) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn mesh_faces(
        &self,
        _shape: &Shape,
        _params: &TessellationParams,
    ) -> CadResult<Vec<Option<FaceTriangulation>>> {
        Self::unavailable()
    }

    fn check(&self, _shape: &Shape) -> CadResult<bool> {
        Self::unavailable()
    }

    fn kind(&self, _shape: &Shape) -> CadResult<ShapeKind> {
        Self::unavailable()
    }

    fn is_empty(&self, _shape: &Shape) -> CadResult<bool> {
        Self::unavailable()
    }

    fn bounding_box(&self, _shape: &Shape) -> CadResult<(DVec3, DVec3)> {
        Self::unavailable()
    }

    fn release(&self, _shape: Shape) -> bool {
        false
    }

    fn live_shapes(&self) -> usize {
        0
    }
}

/// Get the default CAD kernel based on available features
pub fn default_kernel() -> Box<dyn CadKernel> {
    kernel_from_config(&crate::config::KernelConfig::default())
}

/// Build the compiled-in kernel with explicit settings
pub fn kernel_from_config(config: &crate::config::KernelConfig) -> Box<dyn CadKernel> {
    #[cfg(feature = "truck")]
    {
        Box::new(super::TruckKernel::with_tolerance(config.boolean_tolerance))
    }

    #[cfg(not(feature = "truck"))]
    {
        let _ = config;
        Box::new(NullKernel)
    }
}
