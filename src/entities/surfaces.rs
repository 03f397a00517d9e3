//! Surface entity payloads (types 108-198).

use crate::entities::entity::EntityContext;
use crate::entities::id::EntityId;
use crate::error::{IgesError, Result};

/// Type 108: Plane
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Coefficients A, B, C, D of A*x + B*y + C*z = D
    pub coefficients: [f64; 4],
    /// Bounding curve for bounded forms
    pub bounding_curve: Option<EntityId>,
    /// Display point location
    pub display_point: [f64; 3],
    /// Display symbol size
    pub display_size: f64,
}

impl Plane {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Plane {
            coefficients: [
                ctx.real_at(0)?,
                ctx.real_at(1)?,
                ctx.real_at(2)?,
                ctx.real_at(3)?,
            ],
            bounding_curve: ctx.optional_pointer_at(4)?,
            display_point: ctx.triple_at(5)?,
            display_size: ctx.real_at(8)?,
        })
    }
}

/// Type 114: Parametric Spline Surface
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricSplineSurface {
    /// Spline type
    pub spline_type: i32,
    /// Patch type
    pub patch_type: i32,
    /// Number of u segments
    pub u_segments: usize,
    /// Number of v segments
    pub v_segments: usize,
    /// u break points
    pub u_breaks: Vec<f64>,
    /// v break points
    pub v_breaks: Vec<f64>,
    /// Patch coefficients: 48 per (u, v) grid cell including the
    /// terminal row and column
    pub coefficients: Vec<f64>,
}

impl ParametricSplineSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let m = usize::try_from(ctx.int_at(2)?).unwrap_or(0);
        let n = usize::try_from(ctx.int_at(3)?).unwrap_or(0);
        let u_breaks = ctx.reals_at(4, m + 1)?;
        let v_breaks = ctx.reals_at(4 + m + 1, n + 1)?;
        let coefficients = ctx.reals_at(4 + (m + 1) + (n + 1), 48 * (m + 1) * (n + 1))?;
        Ok(ParametricSplineSurface {
            spline_type: ctx.int_at(0)?,
            patch_type: ctx.int_at(1)?,
            u_segments: m,
            v_segments: n,
            u_breaks,
            v_breaks,
            coefficients,
        })
    }
}

/// Type 118: Ruled Surface
#[derive(Debug, Clone, PartialEq)]
pub struct RuledSurface {
    /// First rail curve
    pub first: EntityId,
    /// Second rail curve
    pub second: EntityId,
    /// Direction flag: 0 joins first-to-first, 1 joins first-to-last
    pub direction_flag: i32,
    /// Developable flag
    pub developable: i32,
}

impl RuledSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(RuledSurface {
            first: ctx.pointer_at(0)?,
            second: ctx.pointer_at(1)?,
            direction_flag: ctx.int_at(2)?,
            developable: ctx.int_at(3)?,
        })
    }
}

/// Type 120: Surface of Revolution
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceOfRevolution {
    /// Axis of revolution (a line entity)
    pub axis: EntityId,
    /// Generatrix curve
    pub generatrix: EntityId,
    /// Start angle in radians
    pub start_angle: f64,
    /// Terminate angle in radians
    pub end_angle: f64,
}

impl SurfaceOfRevolution {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(SurfaceOfRevolution {
            axis: ctx.pointer_at(0)?,
            generatrix: ctx.pointer_at(1)?,
            start_angle: ctx.real_at(2)?,
            end_angle: ctx.real_at(3)?,
        })
    }
}

/// Type 122: Tabulated Cylinder
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedCylinder {
    /// Directrix curve
    pub directrix: EntityId,
    /// Terminate point of the generatrix through the directrix start
    pub generatrix_end: [f64; 3],
}

impl TabulatedCylinder {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(TabulatedCylinder {
            directrix: ctx.pointer_at(0)?,
            generatrix_end: ctx.triple_at(1)?,
        })
    }
}

/// Type 128: Rational B-Spline Surface
#[derive(Debug, Clone, PartialEq)]
pub struct RationalBSplineSurface {
    /// Upper index of sum in u and v
    pub upper_index: [i32; 2],
    /// Basis degrees in u and v
    pub degree: [i32; 2],
    /// Closed in u / v
    pub closed: [bool; 2],
    /// All weights equal (polynomial form)
    pub polynomial: bool,
    /// Periodic in u / v
    pub periodic: [bool; 2],
    /// u knot sequence
    pub u_knots: Vec<f64>,
    /// v knot sequence
    pub v_knots: Vec<f64>,
    /// Weights in u-major order, (K1+1)*(K2+1) values
    pub weights: Vec<f64>,
    /// Control points in u-major order
    pub control_points: Vec<[f64; 3]>,
    /// Parameter ranges U(0), U(1), V(0), V(1)
    pub parameter_range: [f64; 4],
}

impl RationalBSplineSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let k1 = usize::try_from(ctx.int_at(0)?)
            .map_err(|_| IgesError::DataFormat("negative upper index".to_string()))?;
        let k2 = usize::try_from(ctx.int_at(1)?)
            .map_err(|_| IgesError::DataFormat("negative upper index".to_string()))?;
        let m1 = usize::try_from(ctx.int_at(2)?)
            .map_err(|_| IgesError::DataFormat("negative degree".to_string()))?;
        let m2 = usize::try_from(ctx.int_at(3)?)
            .map_err(|_| IgesError::DataFormat("negative degree".to_string()))?;

        let closed = [ctx.logical_at(4)?, ctx.logical_at(5)?];
        let polynomial = ctx.logical_at(6)?;
        let periodic = [ctx.logical_at(7)?, ctx.logical_at(8)?];

        let u_knot_count = k1 + m1 + 2;
        let v_knot_count = k2 + m2 + 2;
        let u_knots = ctx.reals_at(9, u_knot_count)?;
        let v_knots = ctx.reals_at(9 + u_knot_count, v_knot_count)?;

        let grid = (k1 + 1) * (k2 + 1);
        let weight_base = 9 + u_knot_count + v_knot_count;
        let weights = ctx.reals_at(weight_base, grid)?;

        let point_base = weight_base + grid;
        let mut control_points = Vec::with_capacity(grid);
        for i in 0..grid {
            control_points.push(ctx.triple_at(point_base + 3 * i)?);
        }

        let tail = point_base + 3 * grid;
        Ok(RationalBSplineSurface {
            upper_index: [k1 as i32, k2 as i32],
            degree: [m1 as i32, m2 as i32],
            closed,
            polynomial,
            periodic,
            u_knots,
            v_knots,
            weights,
            control_points,
            parameter_range: [
                ctx.real_at(tail)?,
                ctx.real_at(tail + 1)?,
                ctx.real_at(tail + 2)?,
                ctx.real_at(tail + 3)?,
            ],
        })
    }
}

/// Type 140: Offset Surface
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetSurface {
    /// Offset direction indicator
    pub direction: [f64; 3],
    /// Offset distance
    pub distance: f64,
    /// The surface being offset
    pub surface: EntityId,
}

impl OffsetSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(OffsetSurface {
            direction: ctx.triple_at(0)?,
            distance: ctx.real_at(3)?,
            surface: ctx.pointer_at(4)?,
        })
    }
}

/// One boundary component of a type 141 entity
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryComponent {
    /// Model-space curve
    pub curve: EntityId,
    /// Orientation sense (1 or 2)
    pub sense: i32,
    /// Associated parameter-space curves
    pub parameter_curves: Vec<EntityId>,
}

/// Type 141: Boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Boundary type (0 = model space only, 1 = both spaces)
    pub boundary_type: i32,
    /// Preferred representation flag
    pub preference: i32,
    /// The bounded surface
    pub surface: EntityId,
    /// The boundary components
    pub components: Vec<BoundaryComponent>,
}

impl Boundary {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let boundary_type = ctx.int_at(0)?;
        let preference = ctx.int_at(1)?;
        let surface = ctx.pointer_at(2)?;
        let count = usize::try_from(ctx.int_at(3)?).unwrap_or(0);

        let mut components = Vec::with_capacity(count);
        let mut at = 4usize;
        for _ in 0..count {
            let curve = ctx.pointer_at(at)?;
            let sense = ctx.int_at(at + 1)?;
            let k = usize::try_from(ctx.int_at(at + 2)?).unwrap_or(0);
            let mut parameter_curves = Vec::with_capacity(k);
            for j in 0..k {
                parameter_curves.push(ctx.pointer_at(at + 3 + j)?);
            }
            at += 3 + k;
            components.push(BoundaryComponent {
                curve,
                sense,
                parameter_curves,
            });
        }

        Ok(Boundary {
            boundary_type,
            preference,
            surface,
            components,
        })
    }
}

/// Type 142: Curve on a Parametric Surface
#[derive(Debug, Clone, PartialEq)]
pub struct CurveOnParametricSurface {
    /// How the curve was created
    pub creation_flag: i32,
    /// The surface the curve lies on
    pub surface: EntityId,
    /// The curve in the surface's parameter space
    pub parameter_curve: Option<EntityId>,
    /// The curve in model space
    pub model_curve: Option<EntityId>,
    /// Preferred representation flag
    pub preference: i32,
}

impl CurveOnParametricSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(CurveOnParametricSurface {
            creation_flag: ctx.int_at(0)?,
            surface: ctx.pointer_at(1)?,
            parameter_curve: ctx.optional_pointer_at(2)?,
            model_curve: ctx.optional_pointer_at(3)?,
            preference: ctx.int_at(4)?,
        })
    }
}

/// Type 143: Bounded Surface
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSurface {
    /// Representation type
    pub representation: i32,
    /// The bounded surface
    pub surface: EntityId,
    /// Boundary entities
    pub boundaries: Vec<EntityId>,
}

impl BoundedSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let representation = ctx.int_at(0)?;
        let surface = ctx.pointer_at(1)?;
        let count = usize::try_from(ctx.int_at(2)?).unwrap_or(0);
        let mut boundaries = Vec::with_capacity(count);
        for i in 0..count {
            boundaries.push(ctx.pointer_at(3 + i)?);
        }
        Ok(BoundedSurface {
            representation,
            surface,
            boundaries,
        })
    }
}

/// Type 144: Trimmed (Parametric) Surface
#[derive(Debug, Clone, PartialEq)]
pub struct TrimmedSurface {
    /// The surface being trimmed
    pub surface: EntityId,
    /// 1 when the outer boundary differs from the surface's natural one
    pub has_outer_boundary: i32,
    /// The outer boundary curve, when present
    pub outer_boundary: Option<EntityId>,
    /// Inner boundary curves
    pub inner_boundaries: Vec<EntityId>,
}

impl TrimmedSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let surface = ctx.pointer_at(0)?;
        let has_outer_boundary = ctx.int_at(1)?;
        let inner_count = usize::try_from(ctx.int_at(2)?).unwrap_or(0);
        let outer_boundary = ctx.optional_pointer_at(3)?;
        let mut inner_boundaries = Vec::with_capacity(inner_count);
        for i in 0..inner_count {
            inner_boundaries.push(ctx.pointer_at(4 + i)?);
        }
        Ok(TrimmedSurface {
            surface,
            has_outer_boundary,
            outer_boundary,
            inner_boundaries,
        })
    }
}

/// Type 190: Plane Surface
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSurface {
    /// A point on the plane
    pub location: EntityId,
    /// The plane normal (a direction entity)
    pub normal: EntityId,
    /// Reference direction (parameterized form 1 only)
    pub reference_direction: Option<EntityId>,
}

impl PlaneSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, form: i32) -> Result<Self> {
        Ok(PlaneSurface {
            location: ctx.pointer_at(0)?,
            normal: ctx.pointer_at(1)?,
            reference_direction: if form == 1 {
                Some(ctx.pointer_at(2)?)
            } else {
                None
            },
        })
    }
}

/// Type 192: Right Circular Cylindrical Surface
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalSurface {
    /// A point on the axis
    pub location: EntityId,
    /// Axis direction
    pub axis: EntityId,
    /// Radius
    pub radius: f64,
    /// Reference direction (parameterized form 1 only)
    pub reference_direction: Option<EntityId>,
}

impl CylindricalSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, form: i32) -> Result<Self> {
        Ok(CylindricalSurface {
            location: ctx.pointer_at(0)?,
            axis: ctx.pointer_at(1)?,
            radius: ctx.real_at(2)?,
            reference_direction: if form == 1 {
                Some(ctx.pointer_at(3)?)
            } else {
                None
            },
        })
    }
}

/// Type 194: Right Circular Conical Surface
#[derive(Debug, Clone, PartialEq)]
pub struct ConicalSurface {
    /// A point on the axis
    pub location: EntityId,
    /// Axis direction
    pub axis: EntityId,
    /// Radius at the axis point
    pub radius: f64,
    /// Half angle in degrees
    pub half_angle: f64,
    /// Reference direction (parameterized form 1 only)
    pub reference_direction: Option<EntityId>,
}

impl ConicalSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, form: i32) -> Result<Self> {
        Ok(ConicalSurface {
            location: ctx.pointer_at(0)?,
            axis: ctx.pointer_at(1)?,
            radius: ctx.real_at(2)?,
            half_angle: ctx.real_at(3)?,
            reference_direction: if form == 1 {
                Some(ctx.pointer_at(4)?)
            } else {
                None
            },
        })
    }
}

/// Type 196: Spherical Surface
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalSurface {
    /// Center point
    pub center: EntityId,
    /// Radius
    pub radius: f64,
    /// Axis direction (parameterized form 1 only)
    pub axis: Option<EntityId>,
    /// Reference direction (parameterized form 1 only)
    pub reference_direction: Option<EntityId>,
}

impl SphericalSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, form: i32) -> Result<Self> {
        Ok(SphericalSurface {
            center: ctx.pointer_at(0)?,
            radius: ctx.real_at(1)?,
            axis: if form == 1 {
                Some(ctx.pointer_at(2)?)
            } else {
                None
            },
            reference_direction: if form == 1 {
                Some(ctx.pointer_at(3)?)
            } else {
                None
            },
        })
    }
}

/// Type 198: Toroidal Surface
#[derive(Debug, Clone, PartialEq)]
pub struct ToroidalSurface {
    /// Center point
    pub center: EntityId,
    /// Axis direction
    pub axis: EntityId,
    /// Major radius
    pub major_radius: f64,
    /// Minor radius
    pub minor_radius: f64,
    /// Reference direction (parameterized form 1 only)
    pub reference_direction: Option<EntityId>,
}

impl ToroidalSurface {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, form: i32) -> Result<Self> {
        Ok(ToroidalSurface {
            center: ctx.pointer_at(0)?,
            axis: ctx.pointer_at(1)?,
            major_radius: ctx.real_at(2)?,
            minor_radius: ctx.real_at(3)?,
            reference_direction: if form == 1 {
                Some(ctx.pointer_at(4)?)
            } else {
                None
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::entity::EntityContext;
    use crate::entities::id::{IdGenerator, ObjectKind};
    use crate::model::parameter::classify_token;
    use crate::model::scalar::ParameterVector;
    use std::collections::HashMap;

    fn vector(tokens: &[&str]) -> ParameterVector {
        let mut params = ParameterVector::new();
        for t in tokens {
            let (v, f) = classify_token(t);
            params.push(v, f);
        }
        params
    }

    fn pointer_map(seqs: &[u32]) -> HashMap<u32, crate::entities::id::EntityId> {
        seqs.iter()
            .map(|&s| (s, IdGenerator::generate(ObjectKind::Entity, None)))
            .collect()
    }

    #[test]
    fn test_trimmed_surface_parse() {
        let mut params = vector(&["9", "1", "2", "11", "13", "15"]);
        let map = pointer_map(&[9, 11, 13, 15]);
        let mut ctx = EntityContext::new(&mut params, &map);
        let surface = TrimmedSurface::parse(&mut ctx).unwrap();
        assert_eq!(surface.surface, map[&9]);
        assert_eq!(surface.outer_boundary, Some(map[&11]));
        assert_eq!(surface.inner_boundaries, vec![map[&13], map[&15]]);
        assert_eq!(ctx.refs.len(), 4);
    }

    #[test]
    fn test_trimmed_surface_natural_boundary() {
        let mut params = vector(&["9", "0", "0", "0"]);
        let map = pointer_map(&[9]);
        let mut ctx = EntityContext::new(&mut params, &map);
        let surface = TrimmedSurface::parse(&mut ctx).unwrap();
        assert_eq!(surface.outer_boundary, None);
        assert!(surface.inner_boundaries.is_empty());
    }

    #[test]
    fn test_boundary_components() {
        let mut params = vector(&["1", "2", "9", "2", "11", "1", "1", "13", "15", "2", "0"]);
        let map = pointer_map(&[9, 11, 13, 15]);
        let mut ctx = EntityContext::new(&mut params, &map);
        let boundary = Boundary::parse(&mut ctx).unwrap();
        assert_eq!(boundary.components.len(), 2);
        assert_eq!(boundary.components[0].parameter_curves, vec![map[&13]]);
        assert!(boundary.components[1].parameter_curves.is_empty());
    }

    #[test]
    fn test_plane_surface_forms() {
        let map = pointer_map(&[1, 3, 5]);

        let mut params = vector(&["1", "3"]);
        let mut ctx = EntityContext::new(&mut params, &map);
        let surface = PlaneSurface::parse(&mut ctx, 0).unwrap();
        assert_eq!(surface.reference_direction, None);

        let mut params = vector(&["1", "3", "5"]);
        let mut ctx = EntityContext::new(&mut params, &map);
        let surface = PlaneSurface::parse(&mut ctx, 1).unwrap();
        assert_eq!(surface.reference_direction, Some(map[&5]));
    }

    #[test]
    fn test_bspline_surface_parse() {
        // K1=1, K2=1, M1=1, M2=1: bilinear patch with 4 control points
        let mut tokens: Vec<String> = vec!["1", "1", "1", "1", "0", "0", "1", "0", "0"]
            .into_iter()
            .map(String::from)
            .collect();
        for knot in ["0.", "0.", "1.", "1.", "0.", "0.", "1.", "1."] {
            tokens.push(knot.into());
        }
        for _ in 0..4 {
            tokens.push("1.".into()); // weights
        }
        for point in [
            ["0.", "0.", "0."],
            ["1.", "0.", "0."],
            ["0.", "1.", "0."],
            ["1.", "1.", "0."],
        ] {
            tokens.extend(point.iter().map(|s| s.to_string()));
        }
        for range in ["0.", "1.", "0.", "1."] {
            tokens.push(range.into());
        }

        let refs: Vec<&str> = tokens.iter().map(|s| s.as_str()).collect();
        let mut params = vector(&refs);
        let map = HashMap::new();
        let mut ctx = EntityContext::new(&mut params, &map);
        let surface = RationalBSplineSurface::parse(&mut ctx).unwrap();
        assert_eq!(surface.control_points.len(), 4);
        assert_eq!(surface.u_knots.len(), 4);
        assert!(surface.polynomial);
        assert_eq!(surface.parameter_range, [0.0, 1.0, 0.0, 1.0]);
    }
}
