//! Boolean operations

use std::ptr;

use sk_cad::{CadResult, Modeler, Shape};

use crate::handle::{SkShape, shape_or_null};
use crate::runtime::modeler;

/// Resolve both operands and run `op`; null when either operand is null
unsafe fn combine(
    name: &str,
    a: *const SkShape,
    b: *const SkShape,
    op: impl FnOnce(&Modeler, &Shape, &Shape) -> CadResult<Shape>,
) -> *mut SkShape {
    let (Some(a), Some(b)) = (unsafe { a.as_ref() }, unsafe { b.as_ref() }) else {
        return ptr::null_mut();
    };
    shape_or_null(name, op(modeler(), &a.0, &b.0))
}

/// Union of two solids; the operands stay owned by the caller
///
/// # Safety
/// `a` and `b` must each be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_boolean_union(a: *const SkShape, b: *const SkShape) -> *mut SkShape {
    unsafe { combine("sk_boolean_union", a, b, Modeler::union) }
}

/// `a` with `b` removed
///
/// # Safety
/// `a` and `b` must each be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_boolean_difference(
    a: *const SkShape,
    b: *const SkShape,
) -> *mut SkShape {
    unsafe { combine("sk_boolean_difference", a, b, Modeler::difference) }
}

/// Common volume of two solids
///
/// # Safety
/// `a` and `b` must each be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_boolean_intersection(
    a: *const SkShape,
    b: *const SkShape,
) -> *mut SkShape {
    unsafe { combine("sk_boolean_intersection", a, b, Modeler::intersection) }
}
