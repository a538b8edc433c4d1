//! Shape lifecycle and introspection

use crate::handle::{SkShape, drop_raw, ok_or_log};
use crate::runtime::modeler;

/// Returned by [`sk_shape_type`] for null or unknown handles
pub const SK_SHAPE_TYPE_INVALID: i32 = -1;

/// Release a shape; null is ignored
///
/// # Safety
/// `shape` must be null or a live shape handle. Releasing the same handle
/// twice is undefined.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_shape_delete(shape: *mut SkShape) {
    if let Some(SkShape(shape)) = unsafe { drop_raw(shape) } {
        modeler().release(shape);
    }
}

/// Release a wire; wires are shapes
///
/// # Safety
/// Same contract as [`sk_shape_delete`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_wire_delete(wire: *mut SkShape) {
    unsafe { sk_shape_delete(wire) };
}

/// Topological validity; `false` for null
///
/// # Safety
/// `shape` must be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_shape_is_valid(shape: *const SkShape) -> bool {
    unsafe { shape.as_ref() }.is_some_and(|shape| modeler().is_valid(&shape.0))
}

/// Shape kind code: 0 vertex, 1 edge, 2 wire, 3 face, 4 shell, 5 solid,
/// 6 compound; -1 for null or unknown
///
/// # Safety
/// `shape` must be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_shape_type(shape: *const SkShape) -> i32 {
    let Some(shape) = (unsafe { shape.as_ref() }) else {
        return SK_SHAPE_TYPE_INVALID;
    };
    ok_or_log("sk_shape_type", modeler().shape_kind(&shape.0))
        .map_or(SK_SHAPE_TYPE_INVALID, |kind| kind.code())
}
