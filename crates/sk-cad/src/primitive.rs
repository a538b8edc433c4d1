//! Primitive solid factories
//!
//! Each factory checks its dimensions before the kernel sees them.

use glam::DVec3;

use crate::construct::COINCIDENCE_TOLERANCE;
use crate::geom::{Axis, Point};
use crate::kernel::{CadError, CadResult, Shape};
use crate::modeler::Modeler;

fn positive(name: &str, value: f64) -> CadResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CadError::InvalidArgument(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f64) -> CadResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CadError::InvalidArgument(format!(
            "{} must not be negative, got {}",
            name, value
        )))
    }
}

fn finite_point(name: &str, point: &Point) -> CadResult<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(CadError::InvalidArgument(format!("{} must be finite", name)))
    }
}

impl Modeler {
    /// Box spanning `[0, dx] x [0, dy] x [0, dz]`
    pub fn make_box(&self, dx: f64, dy: f64, dz: f64) -> CadResult<Shape> {
        positive("box width", dx)?;
        positive("box depth", dy)?;
        positive("box height", dz)?;
        self.delegate("box", |k| k.make_box(DVec3::ZERO, DVec3::new(dx, dy, dz)))
    }

    /// Box with opposite corners `p1` and `p2`, in any order
    pub fn make_box_corners(&self, p1: &Point, p2: &Point) -> CadResult<Shape> {
        finite_point("first corner", p1)?;
        finite_point("second corner", p2)?;

        let (a, b) = (p1.to_dvec3(), p2.to_dvec3());
        let extent = (b - a).abs();
        if extent.min_element() <= COINCIDENCE_TOLERANCE {
            return Err(CadError::InvalidArgument(format!(
                "box corners must differ along every axis, extent is {}",
                extent
            )));
        }
        self.delegate("box", |k| k.make_box(a.min(b), a.max(b)))
    }

    /// Cylinder standing on the origin along +Z
    pub fn make_cylinder(&self, radius: f64, height: f64) -> CadResult<Shape> {
        self.make_cylinder_on_axis(&Axis::z(), radius, height)
    }

    /// Cylinder whose base is centered on the axis origin
    pub fn make_cylinder_on_axis(&self, axis: &Axis, radius: f64, height: f64) -> CadResult<Shape> {
        positive("cylinder radius", radius)?;
        positive("cylinder height", height)?;
        finite_point("cylinder axis origin", &axis.origin)?;
        self.delegate("cylinder", |k| k.make_cylinder(axis, radius, height))
    }

    /// Sphere centered on the origin
    pub fn make_sphere(&self, radius: f64) -> CadResult<Shape> {
        self.make_sphere_at(&Point::ORIGIN, radius)
    }

    /// Sphere around `center`
    pub fn make_sphere_at(&self, center: &Point, radius: f64) -> CadResult<Shape> {
        positive("sphere radius", radius)?;
        finite_point("sphere center", center)?;
        self.delegate("sphere", |k| k.make_sphere(center.to_dvec3(), radius))
    }

    /// Cone or frustum along +Z; `bottom_radius` sits on the origin
    ///
    /// One radius may be zero for a pointed cone.
    pub fn make_cone(&self, bottom_radius: f64, top_radius: f64, height: f64) -> CadResult<Shape> {
        non_negative("cone bottom radius", bottom_radius)?;
        non_negative("cone top radius", top_radius)?;
        positive("cone height", height)?;
        if bottom_radius == 0.0 && top_radius == 0.0 {
            return Err(CadError::InvalidArgument(
                "cone radii cannot both be zero".into(),
            ));
        }
        self.delegate("cone", |k| {
            k.make_cone(&Axis::z(), bottom_radius, top_radius, height)
        })
    }

    /// Torus around +Z centered on the origin
    pub fn make_torus(&self, major_radius: f64, minor_radius: f64) -> CadResult<Shape> {
        positive("torus major radius", major_radius)?;
        positive("torus minor radius", minor_radius)?;
        if minor_radius >= major_radius {
            return Err(CadError::InvalidArgument(format!(
                "torus minor radius {} must be smaller than major radius {}",
                minor_radius, major_radius
            )));
        }
        self.delegate("torus", |k| {
            k.make_torus(&Axis::z(), major_radius, minor_radius)
        })
    }
}
