//! Opaque handle types crossing the C boundary
//!
//! Every handle is a boxed Rust value. Creating functions hand out the raw
//! box; the matching `*_delete` function takes it back.

use std::fmt::Display;
use std::ptr;

use sk_cad::{Axis, CadResult, Direction, Point, Shape, Vector};

/// Owned topological shape
pub struct SkShape(pub(crate) Shape);

/// Owned point value
pub struct SkPoint(pub(crate) Point);

/// Owned vector value
pub struct SkVector(pub(crate) Vector);

/// Owned unit direction
pub struct SkDirection(pub(crate) Direction);

/// Owned axis value
pub struct SkAxis(pub(crate) Axis);

/// Box a value and leak it to the caller
pub(crate) fn into_raw<T>(value: T) -> *mut T {
    Box::into_raw(Box::new(value))
}

/// Reclaim and drop a handle; null is ignored
///
/// # Safety
/// `ptr` must be null or come from [`into_raw`] and not be freed yet.
pub(crate) unsafe fn drop_raw<T>(ptr: *mut T) -> Option<T> {
    if ptr.is_null() {
        return None;
    }
    Some(*unsafe { Box::from_raw(ptr) })
}

/// Unwrap a result for the C side, logging the error and yielding null
pub(crate) fn ok_or_log<T, E: Display>(op: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("{} returned null: {}", op, e);
            None
        }
    }
}

/// Hand a new shape to the caller, or null on failure
pub(crate) fn shape_or_null(op: &str, result: CadResult<Shape>) -> *mut SkShape {
    ok_or_log(op, result).map_or(ptr::null_mut(), |shape| into_raw(SkShape(shape)))
}
