//! Point, vector, direction and axis handles

use std::ptr;

use sk_cad::{Axis, Direction, Point, Vector};

use crate::handle::{SkAxis, SkDirection, SkPoint, SkVector, drop_raw, into_raw, ok_or_log};

/// Create a point; null for non-finite coordinates
#[unsafe(no_mangle)]
pub extern "C" fn sk_point_create(x: f64, y: f64, z: f64) -> *mut SkPoint {
    let point = Point::new(x, y, z);
    if !point.is_finite() {
        tracing::debug!("sk_point_create returned null: non-finite coordinates");
        return ptr::null_mut();
    }
    into_raw(SkPoint(point))
}

/// # Safety
/// `point` must be null or a live handle from `sk_point_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_point_delete(point: *mut SkPoint) {
    unsafe { drop_raw(point) };
}

/// Create a vector; null for non-finite components
#[unsafe(no_mangle)]
pub extern "C" fn sk_vector_create(x: f64, y: f64, z: f64) -> *mut SkVector {
    let vector = Vector::new(x, y, z);
    if !vector.is_finite() {
        tracing::debug!("sk_vector_create returned null: non-finite components");
        return ptr::null_mut();
    }
    into_raw(SkVector(vector))
}

/// # Safety
/// `vector` must be null or a live handle from `sk_vector_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_vector_delete(vector: *mut SkVector) {
    unsafe { drop_raw(vector) };
}

/// Create a unit direction; null for a zero or non-finite input
#[unsafe(no_mangle)]
pub extern "C" fn sk_direction_create(x: f64, y: f64, z: f64) -> *mut SkDirection {
    ok_or_log("sk_direction_create", Direction::new(x, y, z))
        .map_or(ptr::null_mut(), |direction| into_raw(SkDirection(direction)))
}

/// # Safety
/// `direction` must be null or a live handle from `sk_direction_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_direction_delete(direction: *mut SkDirection) {
    unsafe { drop_raw(direction) };
}

/// Create an axis; the inputs are copied, not consumed
///
/// # Safety
/// Each argument must be null or a live handle of its type.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_axis_create(
    origin: *const SkPoint,
    direction: *const SkDirection,
) -> *mut SkAxis {
    let (Some(origin), Some(direction)) = (unsafe { origin.as_ref() }, unsafe { direction.as_ref() })
    else {
        return ptr::null_mut();
    };
    into_raw(SkAxis(Axis::new(origin.0, direction.0)))
}

/// # Safety
/// `axis` must be null or a live handle from `sk_axis_create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_axis_delete(axis: *mut SkAxis) {
    unsafe { drop_raw(axis) };
}
