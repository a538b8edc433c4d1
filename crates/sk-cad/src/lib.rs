//! B-Rep Modeling Facade
//!
//! This crate provides:
//! - An abstract CAD kernel trait with a Truck backend
//! - A handle registry owning every kernel object
//! - Wire, face and sweep construction
//! - Primitive solids and boolean operations
//! - Tessellation into flat triangle buffers

pub mod boolean;
pub mod config;
pub mod construct;
pub mod geom;
pub mod inspect;
pub mod kernel;
pub mod modeler;
pub mod primitive;
pub mod tessellate;

// Re-exports for convenience
pub use config::{ConfigError, KernelConfig, LoggingConfig, ModelerConfig, TessellationConfig};
pub use construct::{COINCIDENCE_TOLERANCE, PolylineWire};
pub use geom::{Axis, DIRECTION_EPSILON, Direction, Point, Vector};
pub use kernel::{
    BooleanType, CadError, CadKernel, CadResult, ErrorCategory, FaceTriangulation,
    HandleRegistry, NullKernel, Shape, ShapeKind, TessellationParams, default_kernel,
    kernel_from_config,
};
pub use modeler::Modeler;
pub use tessellate::{MeshBuffer, flatten_faces};

#[cfg(feature = "truck")]
pub use kernel::TruckKernel;
