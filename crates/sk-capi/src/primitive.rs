//! Primitive solid factories

use std::ptr;

use crate::handle::{SkAxis, SkPoint, SkShape, shape_or_null};
use crate::runtime::modeler;

/// Box spanning `[0, dx] x [0, dy] x [0, dz]`
#[unsafe(no_mangle)]
pub extern "C" fn sk_primitive_box(dx: f64, dy: f64, dz: f64) -> *mut SkShape {
    shape_or_null("sk_primitive_box", modeler().make_box(dx, dy, dz))
}

/// Box between two opposite corners
///
/// # Safety
/// `p1` and `p2` must each be null or a live point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_primitive_box_two_corners(
    p1: *const SkPoint,
    p2: *const SkPoint,
) -> *mut SkShape {
    let (Some(p1), Some(p2)) = (unsafe { p1.as_ref() }, unsafe { p2.as_ref() }) else {
        return ptr::null_mut();
    };
    shape_or_null(
        "sk_primitive_box_two_corners",
        modeler().make_box_corners(&p1.0, &p2.0),
    )
}

/// Cylinder standing on the origin along +Z
#[unsafe(no_mangle)]
pub extern "C" fn sk_primitive_cylinder(radius: f64, height: f64) -> *mut SkShape {
    shape_or_null("sk_primitive_cylinder", modeler().make_cylinder(radius, height))
}

/// Cylinder on an arbitrary axis
///
/// # Safety
/// `axis` must be null or a live axis handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_primitive_cylinder_axis(
    axis: *const SkAxis,
    radius: f64,
    height: f64,
) -> *mut SkShape {
    let Some(axis) = (unsafe { axis.as_ref() }) else {
        return ptr::null_mut();
    };
    shape_or_null(
        "sk_primitive_cylinder_axis",
        modeler().make_cylinder_on_axis(&axis.0, radius, height),
    )
}

/// Sphere around the origin
#[unsafe(no_mangle)]
pub extern "C" fn sk_primitive_sphere(radius: f64) -> *mut SkShape {
    shape_or_null("sk_primitive_sphere", modeler().make_sphere(radius))
}

/// Sphere around `center`
///
/// # Safety
/// `center` must be null or a live point handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_primitive_sphere_center(
    center: *const SkPoint,
    radius: f64,
) -> *mut SkShape {
    let Some(center) = (unsafe { center.as_ref() }) else {
        return ptr::null_mut();
    };
    shape_or_null(
        "sk_primitive_sphere_center",
        modeler().make_sphere_at(&center.0, radius),
    )
}

/// Cone or frustum along +Z
#[unsafe(no_mangle)]
pub extern "C" fn sk_primitive_cone(radius1: f64, radius2: f64, height: f64) -> *mut SkShape {
    shape_or_null(
        "sk_primitive_cone",
        modeler().make_cone(radius1, radius2, height),
    )
}

/// Torus around +Z
#[unsafe(no_mangle)]
pub extern "C" fn sk_primitive_torus(major_radius: f64, minor_radius: f64) -> *mut SkShape {
    shape_or_null(
        "sk_primitive_torus",
        modeler().make_torus(major_radius, minor_radius),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{sk_shape_delete, sk_shape_type};

    #[test]
    fn test_invalid_dimensions_give_null() {
        assert!(sk_primitive_box(0.0, 1.0, 1.0).is_null());
        assert!(sk_primitive_cylinder(-1.0, 1.0).is_null());
        assert!(sk_primitive_sphere(0.0).is_null());
        assert!(sk_primitive_cone(0.0, 0.0, 1.0).is_null());
        assert!(sk_primitive_torus(1.0, 2.0).is_null());
        unsafe {
            assert!(sk_primitive_box_two_corners(ptr::null(), ptr::null()).is_null());
            assert!(sk_primitive_cylinder_axis(ptr::null(), 1.0, 1.0).is_null());
            assert!(sk_primitive_sphere_center(ptr::null(), 1.0).is_null());
        }
    }

    #[cfg(feature = "truck")]
    #[test]
    fn test_primitives_are_solids() {
        use crate::geom::{sk_point_create, sk_point_delete};

        unsafe {
            let a = sk_point_create(0.0, 0.0, 0.0);
            let b = sk_point_create(-1.0, 2.0, 3.0);

            let shapes = [
                sk_primitive_box(1.0, 1.0, 1.0),
                sk_primitive_box_two_corners(a, b),
                sk_primitive_cylinder(1.0, 2.0),
                sk_primitive_sphere(1.0),
                sk_primitive_sphere_center(b, 0.5),
                sk_primitive_cone(1.0, 0.0, 1.0),
                sk_primitive_torus(2.0, 0.5),
            ];
            for shape in shapes {
                assert_eq!(sk_shape_type(shape), 5);
                sk_shape_delete(shape);
            }

            assert!(sk_primitive_box_two_corners(a, a).is_null());
            sk_point_delete(a);
            sk_point_delete(b);
        }
    }
}
