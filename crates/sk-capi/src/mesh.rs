//! Tessellation into caller-owned mesh buffers

use std::ptr;

use sk_cad::{MeshBuffer, TessellationParams};

use crate::handle::{SkShape, drop_raw, into_raw, ok_or_log};
use crate::runtime::modeler;

/// Tessellation parameters passed by value
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SkTessellationParams {
    pub linear_deflection: f64,
    pub angular_deflection: f64,
    pub relative: bool,
}

impl From<SkTessellationParams> for TessellationParams {
    fn from(params: SkTessellationParams) -> Self {
        Self {
            linear_deflection: params.linear_deflection,
            angular_deflection: params.angular_deflection,
            relative: params.relative,
        }
    }
}

/// Triangle soup owned by the caller until `sk_mesh_delete`
///
/// `vertices` and `normals` hold `3 * num_vertices` floats, `triangles`
/// holds `3 * num_triangles` zero-based indices.
#[repr(C)]
#[derive(Debug)]
pub struct SkMesh {
    pub vertices: *mut f32,
    pub num_vertices: i32,
    pub normals: *mut f32,
    pub triangles: *mut u32,
    pub num_triangles: i32,
}

fn leak_slice<T: Copy>(data: &[T]) -> *mut T {
    let boxed: Box<[T]> = data.into();
    Box::into_raw(boxed) as *mut T
}

/// # Safety
/// `data` must come from [`leak_slice`] with exactly `len` elements.
unsafe fn free_slice<T>(data: *mut T, len: usize) {
    if !data.is_null() {
        drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(data, len)) });
    }
}

impl SkMesh {
    fn from_buffer(mesh: &MeshBuffer) -> Option<Self> {
        let num_vertices = i32::try_from(mesh.vertex_count()).ok()?;
        let num_triangles = i32::try_from(mesh.triangle_count()).ok()?;
        Some(Self {
            vertices: leak_slice(mesh.flat_vertices()),
            num_vertices,
            normals: leak_slice(mesh.flat_normals()),
            triangles: leak_slice(&mesh.indices),
            num_triangles,
        })
    }
}

/// Tessellate a shape; null on failure
///
/// # Safety
/// `shape` must be null or a live shape handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_tessellate(
    shape: *const SkShape,
    params: SkTessellationParams,
) -> *mut SkMesh {
    let Some(shape) = (unsafe { shape.as_ref() }) else {
        return ptr::null_mut();
    };
    let Some(mesh) = ok_or_log(
        "sk_tessellate",
        modeler().tessellate(&shape.0, &params.into()),
    ) else {
        return ptr::null_mut();
    };
    match SkMesh::from_buffer(&mesh) {
        Some(mesh) => into_raw(mesh),
        None => {
            tracing::warn!("sk_tessellate: mesh too large for 32-bit counts");
            ptr::null_mut()
        }
    }
}

/// Free a mesh and its arrays; null is ignored
///
/// # Safety
/// `mesh` must be null or a live mesh from `sk_tessellate`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sk_mesh_delete(mesh: *mut SkMesh) {
    let Some(mesh) = (unsafe { drop_raw(mesh) }) else {
        return;
    };
    let vertex_floats = mesh.num_vertices as usize * 3;
    let index_count = mesh.num_triangles as usize * 3;
    unsafe {
        free_slice(mesh.vertices, vertex_floats);
        free_slice(mesh.normals, vertex_floats);
        free_slice(mesh.triangles, index_count);
    }
}
