//! Construction layer: polyline wires, planar faces and sweeps

use glam::{DVec2, DVec3};

use crate::geom::{Axis, DIRECTION_EPSILON, Vector};
use crate::kernel::{CadError, CadResult, Shape};
use crate::modeler::Modeler;

/// Points closer than this are treated as coincident
pub const COINCIDENCE_TOLERANCE: f64 = 1e-7;

/// A polyline wire and the number of degenerate segments left out of it
#[derive(Debug)]
pub struct PolylineWire {
    pub wire: Shape,
    pub skipped_segments: usize,
}

/// Drop points coincident with their predecessor
///
/// For a closed polyline a last point coincident with the first is dropped
/// as well, since the closing edge would be degenerate. Returns the kept
/// points and the number of segments skipped.
fn dedup_polyline(points: &[DVec3], closed: bool) -> (Vec<DVec3>, usize) {
    let mut kept: Vec<DVec3> = Vec::with_capacity(points.len());
    let mut skipped = 0;

    for &point in points {
        match kept.last() {
            Some(last) if last.distance(point) < COINCIDENCE_TOLERANCE => skipped += 1,
            _ => kept.push(point),
        }
    }

    if closed
        && kept.len() > 2
        && let (Some(first), Some(last)) = (kept.first(), kept.last())
        && first.distance(*last) < COINCIDENCE_TOLERANCE
    {
        kept.pop();
        skipped += 1;
    }

    (kept, skipped)
}

fn validate_sweep_vector(vector: &Vector) -> CadResult<DVec3> {
    if !vector.is_finite() {
        return Err(CadError::InvalidArgument(
            "extrusion vector must be finite".into(),
        ));
    }
    if vector.length() < DIRECTION_EPSILON {
        return Err(CadError::InvalidArgument(
            "extrusion vector must not be zero".into(),
        ));
    }
    Ok(vector.to_dvec3())
}

impl Modeler {
    /// Build a wire through points on the XY plane
    pub fn wire_from_points_2d(&self, points: &[DVec2], closed: bool) -> CadResult<PolylineWire> {
        let points: Vec<DVec3> = points.iter().map(|p| p.extend(0.0)).collect();
        self.wire_from_points_3d(&points, closed)
    }

    /// Build a wire of straight edges through 3D points
    ///
    /// Coincident consecutive points are skipped rather than rejected.
    pub fn wire_from_points_3d(&self, points: &[DVec3], closed: bool) -> CadResult<PolylineWire> {
        if points.len() < 2 {
            return Err(CadError::InvalidArgument(format!(
                "a wire needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(CadError::InvalidArgument(format!(
                "wire point {} is not finite",
                bad
            )));
        }

        let (kept, skipped_segments) = dedup_polyline(points, closed);
        if kept.len() < 2 {
            return Err(CadError::InvalidProfile(
                "no non-degenerate edge remains".into(),
            ));
        }
        if skipped_segments > 0 {
            tracing::warn!(
                "Skipped {} degenerate segment(s) while building wire",
                skipped_segments
            );
        }

        let wire = self.delegate("wire", |k| k.polyline_wire(&kept, closed))?;
        Ok(PolylineWire {
            wire,
            skipped_segments,
        })
    }

    /// Build a planar face bounded by a closed wire
    pub fn face_from_wire(&self, wire: &Shape) -> CadResult<Shape> {
        self.delegate("face", |k| k.planar_face(wire))
    }

    /// Extrude the face bounded by `wire` along `vector` into a solid
    pub fn extrude_wire(&self, wire: &Shape, vector: &Vector) -> CadResult<Shape> {
        let vector = validate_sweep_vector(vector)?;
        let face = self.face_from_wire(wire)?;
        let result = self.delegate("extrude", |k| k.extrude(&face, vector));
        self.release(face);
        result
    }

    /// Extrude a face along `vector` into a solid
    pub fn extrude_face(&self, face: &Shape, vector: &Vector) -> CadResult<Shape> {
        let vector = validate_sweep_vector(vector)?;
        self.delegate("extrude", |k| k.extrude(face, vector))
    }

    /// Revolve the face bounded by `wire` by `angle` radians about `axis`
    ///
    /// Angles of a full turn or more give a closed solid of revolution.
    pub fn revolve_wire(&self, wire: &Shape, axis: &Axis, angle: f64) -> CadResult<Shape> {
        if !angle.is_finite() || angle == 0.0 {
            return Err(CadError::InvalidArgument(format!(
                "revolution angle must be finite and non-zero, got {}",
                angle
            )));
        }
        if !axis.origin.is_finite() {
            return Err(CadError::InvalidArgument(
                "revolution axis origin must be finite".into(),
            ));
        }

        let face = self.face_from_wire(wire)?;
        let result = self.delegate("revolve", |k| k.revolve(&face, axis, angle));
        self.release(face);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_skips_coincident_points() {
        let points = [
            DVec3::ZERO,
            DVec3::new(0.0, 0.0, 1e-9),
            DVec3::X,
            DVec3::X,
            DVec3::new(1.0, 1.0, 0.0),
        ];
        let (kept, skipped) = dedup_polyline(&points, false);
        assert_eq!(kept, vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0)]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_dedup_drops_repeated_start_when_closed() {
        let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ZERO];

        let (kept, skipped) = dedup_polyline(&points, true);
        assert_eq!(kept.len(), 3);
        assert_eq!(skipped, 1);

        // An open polyline may return to its start
        let (kept, skipped) = dedup_polyline(&points, false);
        assert_eq!(kept.len(), 4);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_sweep_vector_validation() {
        assert!(validate_sweep_vector(&Vector::new(0.0, 0.0, 1.0)).is_ok());
        assert!(validate_sweep_vector(&Vector::new(0.0, 0.0, 0.0)).is_err());
        assert!(validate_sweep_vector(&Vector::new(f64::NAN, 0.0, 1.0)).is_err());
    }

    #[cfg(feature = "truck")]
    mod kernel {
        use super::*;
        use crate::geom::{Direction, Point};
        use crate::kernel::{ShapeKind, TessellationParams};
        use approx::assert_relative_eq;
        use std::f64::consts::{FRAC_PI_2, PI};

        fn square() -> Vec<DVec2> {
            vec![
                DVec2::new(0.0, 0.0),
                DVec2::new(1.0, 0.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(0.0, 1.0),
            ]
        }

        #[test]
        fn test_wire_from_points_2d() {
            let modeler = Modeler::new();
            let result = modeler.wire_from_points_2d(&square(), true).unwrap();

            assert_eq!(result.skipped_segments, 0);
            assert_eq!(modeler.shape_kind(&result.wire).unwrap(), ShapeKind::Wire);
            assert!(modeler.is_valid(&result.wire));
        }

        #[test]
        fn test_wire_reports_skipped_segments() {
            let modeler = Modeler::new();
            let mut points = square();
            points.insert(1, DVec2::new(0.0, 0.0));
            points.push(DVec2::new(0.0, 1.0));

            let result = modeler.wire_from_points_2d(&points, true).unwrap();
            assert_eq!(result.skipped_segments, 2);
            assert!(modeler.is_valid(&result.wire));
        }

        #[test]
        fn test_wire_rejects_degenerate_input() {
            let modeler = Modeler::new();

            assert!(matches!(
                modeler.wire_from_points_3d(&[DVec3::ZERO], false),
                Err(CadError::InvalidArgument(_))
            ));
            assert!(matches!(
                modeler.wire_from_points_3d(&[DVec3::ZERO, DVec3::splat(1e-9)], false),
                Err(CadError::InvalidProfile(_))
            ));
            assert!(
                modeler
                    .wire_from_points_3d(&[DVec3::ZERO, DVec3::new(f64::NAN, 0.0, 0.0)], false)
                    .is_err()
            );
        }

        #[test]
        fn test_extrude_wire() {
            let modeler = Modeler::new();
            let profile = modeler.wire_from_points_2d(&square(), true).unwrap();
            let before = modeler.live_shapes();

            let prism = modeler
                .extrude_wire(&profile.wire, &Vector::new(0.0, 0.0, 2.0))
                .unwrap();
            assert_eq!(modeler.shape_kind(&prism).unwrap(), ShapeKind::Solid);
            assert!(modeler.is_valid(&prism));

            // Only the prism is new; the intermediate face is gone
            assert_eq!(modeler.live_shapes(), before + 1);
        }

        fn volume(modeler: &Modeler, shape: &Shape) -> f64 {
            modeler
                .tessellate(shape, &TessellationParams::new(0.005, 0.1))
                .unwrap()
                .enclosed_volume()
        }

        #[test]
        fn test_extrude_points_outward() {
            let modeler = Modeler::new();
            let ccw = modeler.wire_from_points_2d(&square(), true).unwrap().wire;
            let mut clockwise_points = square();
            clockwise_points.reverse();
            let cw = modeler
                .wire_from_points_2d(&clockwise_points, true)
                .unwrap()
                .wire;

            let up = Vector::new(0.0, 0.0, 1.0);
            let down = Vector::new(0.0, 0.0, -1.0);
            for (wire, vector) in [(&ccw, &up), (&cw, &up), (&ccw, &down), (&cw, &down)] {
                let prism = modeler.extrude_wire(wire, vector).unwrap();
                assert!(modeler.is_valid(&prism));
                assert_relative_eq!(volume(&modeler, &prism), 1.0, epsilon = 1e-6);
            }
        }

        #[test]
        fn test_extrude_open_wire_fails() {
            let modeler = Modeler::new();
            let profile = modeler.wire_from_points_2d(&square(), false).unwrap();

            assert!(
                modeler
                    .extrude_wire(&profile.wire, &Vector::new(0.0, 0.0, 1.0))
                    .is_err()
            );
        }

        #[test]
        fn test_extrude_zero_vector_fails() {
            let modeler = Modeler::new();
            let profile = modeler.wire_from_points_2d(&square(), true).unwrap();

            assert!(matches!(
                modeler.extrude_wire(&profile.wire, &Vector::new(0.0, 0.0, 0.0)),
                Err(CadError::InvalidArgument(_))
            ));
        }

        #[test]
        fn test_extrude_face() {
            let modeler = Modeler::new();
            let profile = modeler.wire_from_points_2d(&square(), true).unwrap();
            let face = modeler.face_from_wire(&profile.wire).unwrap();
            assert_eq!(modeler.shape_kind(&face).unwrap(), ShapeKind::Face);

            let prism = modeler
                .extrude_face(&face, &Vector::new(0.5, 0.0, 1.0))
                .unwrap();
            assert!(modeler.is_valid(&prism));

            // A wire is not a face
            assert!(matches!(
                modeler.extrude_face(&profile.wire, &Vector::new(0.0, 0.0, 1.0)),
                Err(CadError::InvalidArgument(_))
            ));
        }

        #[test]
        fn test_revolve_wire() {
            let modeler = Modeler::new();
            let profile = [
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(2.0, 0.0, 0.0),
                DVec3::new(2.0, 0.0, 1.0),
                DVec3::new(1.0, 0.0, 1.0),
            ];
            let wire = modeler.wire_from_points_3d(&profile, true).unwrap().wire;
            let axis = Axis::new(Point::ORIGIN, Direction::Z);

            let ring = modeler.revolve_wire(&wire, &axis, 2.0 * PI).unwrap();
            assert_eq!(modeler.shape_kind(&ring).unwrap(), ShapeKind::Solid);
            assert!(modeler.is_valid(&ring));

            let quarter = modeler.revolve_wire(&wire, &axis, FRAC_PI_2).unwrap();
            assert!(modeler.is_valid(&quarter));

            let reversed = modeler.revolve_wire(&wire, &axis, -FRAC_PI_2).unwrap();
            assert_eq!(modeler.shape_kind(&reversed).unwrap(), ShapeKind::Solid);

            // Annulus between radii 1 and 2, one unit high
            assert_relative_eq!(volume(&modeler, &ring), 3.0 * PI, epsilon = 0.05);
            assert_relative_eq!(volume(&modeler, &quarter), 0.75 * PI, epsilon = 0.02);
            assert_relative_eq!(volume(&modeler, &reversed), 0.75 * PI, epsilon = 0.02);
        }

        #[test]
        fn test_revolve_rejects_bad_angle() {
            let modeler = Modeler::new();
            let wire = modeler.wire_from_points_2d(&square(), true).unwrap().wire;

            for angle in [0.0, f64::NAN, f64::INFINITY] {
                assert!(matches!(
                    modeler.revolve_wire(&wire, &Axis::y(), angle),
                    Err(CadError::InvalidArgument(_))
                ));
            }
        }
    }
}
