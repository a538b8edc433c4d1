//! Flat C interface to the solid modeling facade
//!
//! Every function is `extern "C"` and never unwinds across the boundary.
//! Failures come back as null pointers, `false` or `-1`; details go to the
//! log. Handles returned by a function are owned by the caller and released
//! with the matching `*_delete` function.
//!
//! The C declarations live in `include/solidkit.h`.

pub mod boolean;
pub mod construct;
pub mod geom;
pub mod handle;
pub mod mesh;
pub mod primitive;
pub mod runtime;
pub mod shape;

pub use handle::{SkAxis, SkDirection, SkPoint, SkShape, SkVector};
pub use mesh::{SkMesh, SkTessellationParams};
pub use runtime::CONFIG_ENV;
pub use shape::SK_SHAPE_TYPE_INVALID;
