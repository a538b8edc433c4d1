//! Wire, face and sweep construction

use std::ptr;

use glam::{DVec2, DVec3};
use sk_cad::{CadResult, PolylineWire, Vector};

use crate::handle::{SkAxis, SkShape, into_raw, ok_or_log, shape_or_null};
use crate::runtime::modeler;

/// View `count * dims` coordinates; `None` for null or fewer than 2 points
///
/// # Safety
/// `points` must be null or point to `count * dims` readable doubles.
unsafe fn coordinates<'a>(points: *const f64, count: i32, dims: usize) -> Option<&'a [f64]> {
    if points.is_null() || count < 2 {
        return None;
    }
    Some(unsafe { std::slice::from_raw_parts(points, count as usize * dims) })
}

/// Hand out the wire and store the skipped count when requested
///
/// # Safety
/// `skipped` must be null or writable.
unsafe fn finish_wire(
    op: &str,
    result: CadResult<PolylineWire>,
    skipped: *mut i32,
) -> *mut SkShape {
    let Some(polyline) = ok_or_log(op, result) else {
        return ptr::null_mut();
    };
    if let Some(out) = unsafe { skipped.as_mut() } {
        *out = i32::try_from(polyline.skipped_segments).unwrap_or(i32::MAX);
    }
    into_raw(SkShape(polyline.wire))
}

/// Wire through `num_points` XY pairs at z = 0
///
/// # Safety
/// `points` must be null or hold `2 * num_points` doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_wire_from_points_2d(
    points: *const f64,
    num_points: i32,
    closed: bool,
) -> *mut SkShape {
    unsafe { sk_wire_from_points_2d_ex(points, num_points, closed, ptr::null_mut()) }
}

/// Like [`sk_wire_from_points_2d`], also reporting skipped degenerate
/// segments through `skipped` when it is not null
///
/// # Safety
/// `points` must be null or hold `2 * num_points` doubles; `skipped` must be
/// null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_wire_from_points_2d_ex(
    points: *const f64,
    num_points: i32,
    closed: bool,
    skipped: *mut i32,
) -> *mut SkShape {
    let Some(raw) = (unsafe { coordinates(points, num_points, 2) }) else {
        return ptr::null_mut();
    };
    let pairs: &[[f64; 2]] = bytemuck::cast_slice(raw);
    let points: Vec<DVec2> = pairs.iter().map(|p| DVec2::from_array(*p)).collect();
    let result = modeler().wire_from_points_2d(&points, closed);
    unsafe { finish_wire("sk_wire_from_points_2d", result, skipped) }
}

/// Wire through `num_points` XYZ triples
///
/// # Safety
/// `points` must be null or hold `3 * num_points` doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_wire_from_points_3d(
    points: *const f64,
    num_points: i32,
    closed: bool,
) -> *mut SkShape {
    unsafe { sk_wire_from_points_3d_ex(points, num_points, closed, ptr::null_mut()) }
}

/// Like [`sk_wire_from_points_3d`], also reporting skipped degenerate
/// segments through `skipped` when it is not null
///
/// # Safety
/// `points` must be null or hold `3 * num_points` doubles; `skipped` must be
/// null or writable.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_wire_from_points_3d_ex(
    points: *const f64,
    num_points: i32,
    closed: bool,
    skipped: *mut i32,
) -> *mut SkShape {
    let Some(raw) = (unsafe { coordinates(points, num_points, 3) }) else {
        return ptr::null_mut();
    };
    let triples: &[[f64; 3]] = bytemuck::cast_slice(raw);
    let points: Vec<DVec3> = triples.iter().map(|p| DVec3::from_array(*p)).collect();
    let result = modeler().wire_from_points_3d(&points, closed);
    unsafe { finish_wire("sk_wire_from_points_3d", result, skipped) }
}

/// Planar face bounded by a closed wire
///
/// # Safety
/// `wire` must be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_face_from_wire(wire: *const SkShape) -> *mut SkShape {
    let Some(wire) = (unsafe { wire.as_ref() }) else {
        return ptr::null_mut();
    };
    shape_or_null("sk_face_from_wire", modeler().face_from_wire(&wire.0))
}

/// Extrude the face bounded by a closed wire into a solid
///
/// # Safety
/// `wire` must be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_extrude_wire(
    wire: *const SkShape,
    vx: f64,
    vy: f64,
    vz: f64,
) -> *mut SkShape {
    let Some(wire) = (unsafe { wire.as_ref() }) else {
        return ptr::null_mut();
    };
    let vector = Vector::new(vx, vy, vz);
    shape_or_null("sk_extrude_wire", modeler().extrude_wire(&wire.0, &vector))
}

/// Extrude a face into a solid
///
/// # Safety
/// `face` must be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_extrude_face(
    face: *const SkShape,
    vx: f64,
    vy: f64,
    vz: f64,
) -> *mut SkShape {
    let Some(face) = (unsafe { face.as_ref() }) else {
        return ptr::null_mut();
    };
    let vector = Vector::new(vx, vy, vz);
    shape_or_null("sk_extrude_face", modeler().extrude_face(&face.0, &vector))
}

/// Revolve the face bounded by a closed wire by `angle` radians
///
/// # Safety
/// `wire` and `axis` must each be null or a live handle of their type.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_revolve_wire(
    wire: *const SkShape,
    axis: *const SkAxis,
    angle: f64,
) -> *mut SkShape {
    let (Some(wire), Some(axis)) = (unsafe { wire.as_ref() }, unsafe { axis.as_ref() }) else {
        return ptr::null_mut();
    };
    shape_or_null(
        "sk_revolve_wire",
        modeler().revolve_wire(&wire.0, &axis.0, angle),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{sk_shape_delete, sk_shape_type, sk_wire_delete};

    const SQUARE: [f64; 8] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

    #[test]
    fn test_rejects_null_and_short_input() {
        unsafe {
            assert!(sk_wire_from_points_2d(ptr::null(), 4, true).is_null());
            assert!(sk_wire_from_points_2d(SQUARE.as_ptr(), 1, false).is_null());
            assert!(sk_wire_from_points_3d(SQUARE.as_ptr(), -3, false).is_null());
            assert!(sk_face_from_wire(ptr::null()).is_null());
            assert!(sk_extrude_wire(ptr::null(), 0.0, 0.0, 1.0).is_null());
            assert!(sk_extrude_face(ptr::null(), 0.0, 0.0, 1.0).is_null());
            assert!(sk_revolve_wire(ptr::null(), ptr::null(), 1.0).is_null());
        }
    }

    #[cfg(feature = "truck")]
    #[test]
    fn test_extrude_square() {
        unsafe {
            let wire = sk_wire_from_points_2d(SQUARE.as_ptr(), 4, true);
            assert!(!wire.is_null());
            assert_eq!(sk_shape_type(wire), 2);

            let solid = sk_extrude_wire(wire, 0.0, 0.0, 1.0);
            assert!(!solid.is_null());
            assert_eq!(sk_shape_type(solid), 5);

            // A zero vector is rejected
            assert!(sk_extrude_wire(wire, 0.0, 0.0, 0.0).is_null());

            let face = sk_face_from_wire(wire);
            assert_eq!(sk_shape_type(face), 3);
            let prism = sk_extrude_face(face, 0.0, 0.0, -2.0);
            assert_eq!(sk_shape_type(prism), 5);

            for shape in [solid, face, prism] {
                sk_shape_delete(shape);
            }
            sk_wire_delete(wire);
        }
    }

    #[cfg(feature = "truck")]
    #[test]
    fn test_skipped_segments_reported() {
        let points = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        let mut skipped = -1;

        unsafe {
            let wire = sk_wire_from_points_3d_ex(points.as_ptr(), 4, false, &mut skipped);
            assert!(!wire.is_null());
            assert_eq!(skipped, 1);
            sk_wire_delete(wire);
        }
    }

    #[cfg(feature = "truck")]
    #[test]
    fn test_revolve_profile() {
        use crate::geom::{sk_axis_create, sk_axis_delete, sk_direction_create, sk_point_create};
        use crate::geom::{sk_direction_delete, sk_point_delete};

        // Rectangle in the XZ plane, off the Z axis
        let profile = [1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 2.0, 0.0, 1.0, 1.0, 0.0, 1.0];

        unsafe {
            let wire = sk_wire_from_points_3d(profile.as_ptr(), 4, true);
            let origin = sk_point_create(0.0, 0.0, 0.0);
            let direction = sk_direction_create(0.0, 0.0, 1.0);
            let axis = sk_axis_create(origin, direction);

            let ring = sk_revolve_wire(wire, axis, std::f64::consts::TAU);
            assert_eq!(sk_shape_type(ring), 5);
            assert!(sk_revolve_wire(wire, axis, 0.0).is_null());

            sk_shape_delete(ring);
            sk_wire_delete(wire);
            sk_axis_delete(axis);
            sk_direction_delete(direction);
            sk_point_delete(origin);
        }
    }
}
