//! Boolean layer
//!
//! Operands are borrowed and left untouched; every result is a new shape.

use crate::kernel::{BooleanType, CadError, CadResult, Shape};
use crate::modeler::Modeler;

impl Modeler {
    /// Union of two solids
    pub fn union(&self, a: &Shape, b: &Shape) -> CadResult<Shape> {
        self.boolean(a, b, BooleanType::Union)
    }

    /// `a` with `b` removed
    pub fn difference(&self, a: &Shape, b: &Shape) -> CadResult<Shape> {
        self.boolean(a, b, BooleanType::Subtract)
    }

    /// Common volume of two solids
    pub fn intersection(&self, a: &Shape, b: &Shape) -> CadResult<Shape> {
        self.boolean(a, b, BooleanType::Intersect)
    }

    fn boolean(&self, a: &Shape, b: &Shape, op: BooleanType) -> CadResult<Shape> {
        for operand in [a, b] {
            if self.delegate("boolean operand", |k| k.is_empty(operand))? {
                return Err(CadError::InvalidArgument(format!(
                    "{} operand {} is empty",
                    op.name(),
                    operand.id()
                )));
            }
        }

        let result = self.delegate(op.name(), |k| k.boolean(a, b, op))?;

        // All or nothing: an empty result is released and reported
        if self.delegate("boolean result", |k| k.is_empty(&result))? {
            self.release(result);
            return Err(CadError::BooleanFailed(format!(
                "{} produced an empty shape",
                op.name()
            )));
        }
        Ok(result)
    }
}
