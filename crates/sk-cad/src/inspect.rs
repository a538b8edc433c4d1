//! Validity and introspection

use crate::kernel::{CadResult, Shape, ShapeKind};
use crate::modeler::Modeler;

impl Modeler {
    /// Whether a shape is live, non-empty and topologically consistent
    ///
    /// Never fails; anything the kernel cannot vouch for is invalid.
    pub fn is_valid(&self, shape: &Shape) -> bool {
        match self.delegate("check", |k| k.is_empty(shape)) {
            Ok(false) => {}
            _ => return false,
        }
        self.delegate("check", |k| k.check(shape)).unwrap_or(false)
    }

    /// Kind of topological entity behind a handle
    pub fn shape_kind(&self, shape: &Shape) -> CadResult<ShapeKind> {
        self.delegate("shape kind", |k| k.kind(shape))
    }
}
