//! Curve entity payloads (types 100-130).
//!
//! Each payload is a typed view over the entity's parameter vector;
//! pointer-valued parameters are resolved to entity identifiers during
//! construction.

use crate::entities::entity::EntityContext;
use crate::entities::id::EntityId;
use crate::error::{IgesError, Result};

/// Type 100: Circular Arc
#[derive(Debug, Clone, PartialEq)]
pub struct CircularArc {
    /// Displacement of the arc plane along Z
    pub z_displacement: f64,
    /// Arc center in definition space
    pub center: [f64; 2],
    /// Start point
    pub start: [f64; 2],
    /// Terminate point
    pub end: [f64; 2],
}

impl CircularArc {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(CircularArc {
            z_displacement: ctx.real_at(0)?,
            center: [ctx.real_at(1)?, ctx.real_at(2)?],
            start: [ctx.real_at(3)?, ctx.real_at(4)?],
            end: [ctx.real_at(5)?, ctx.real_at(6)?],
        })
    }
}

/// Type 102: Composite Curve
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeCurve {
    /// Constituent curves in order
    pub curves: Vec<EntityId>,
}

impl CompositeCurve {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let count = ctx.int_at(0)?;
        let count = usize::try_from(count).map_err(|_| {
            IgesError::DataFormat(format!("negative constituent count: {}", count))
        })?;
        let mut curves = Vec::with_capacity(count);
        for i in 0..count {
            curves.push(ctx.pointer_at(1 + i)?);
        }
        Ok(CompositeCurve { curves })
    }
}

/// Type 104: Conic Arc
#[derive(Debug, Clone, PartialEq)]
pub struct ConicArc {
    /// Coefficients A, B, C, D, E, F of the conic equation
    pub coefficients: [f64; 6],
    /// Displacement of the arc plane along Z
    pub z_displacement: f64,
    /// Start point
    pub start: [f64; 2],
    /// Terminate point
    pub end: [f64; 2],
}

impl ConicArc {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let c = ctx.reals_at(0, 6)?;
        Ok(ConicArc {
            coefficients: [c[0], c[1], c[2], c[3], c[4], c[5]],
            z_displacement: ctx.real_at(6)?,
            start: [ctx.real_at(7)?, ctx.real_at(8)?],
            end: [ctx.real_at(9)?, ctx.real_at(10)?],
        })
    }
}

/// Type 106: Copious Data
#[derive(Debug, Clone, PartialEq)]
pub struct CopiousData {
    /// Interpretation flag: 1 = x,y pairs with a common Z, 2 = x,y,z
    /// triples, 3 = x,y,z,i,j,k sextuples
    pub interpretation: i32,
    /// Common Z displacement (interpretation 1 only)
    pub common_z: Option<f64>,
    /// Width of one tuple (2, 3 or 6 values)
    pub tuple_width: usize,
    /// The coordinate data, `tuple_width` values per tuple
    pub coordinates: Vec<f64>,
}

impl CopiousData {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let interpretation = ctx.int_at(0)?;
        let count = usize::try_from(ctx.int_at(1)?).unwrap_or(0);
        let (tuple_width, data_start, common_z) = match interpretation {
            1 => (2usize, 3usize, Some(ctx.real_at(2)?)),
            2 => (3, 2, None),
            3 => (6, 2, None),
            other => {
                return Err(IgesError::DataFormat(format!(
                    "copious data interpretation flag must be 1, 2 or 3, found {}",
                    other
                )))
            }
        };
        Ok(CopiousData {
            interpretation,
            common_z,
            tuple_width,
            coordinates: ctx.reals_at(data_start, count * tuple_width)?,
        })
    }

    /// Number of tuples stored
    pub fn len(&self) -> usize {
        self.coordinates.len() / self.tuple_width
    }

    /// True when no tuples are stored
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

/// Type 110: Line
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Start point
    pub start: [f64; 3],
    /// Terminate point
    pub end: [f64; 3],
}

impl Line {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Line {
            start: ctx.triple_at(0)?,
            end: ctx.triple_at(3)?,
        })
    }
}

/// Type 112: Parametric Spline Curve
#[derive(Debug, Clone, PartialEq)]
pub struct ParametricSplineCurve {
    /// Spline type (1 = linear .. 6 = B-spline)
    pub spline_type: i32,
    /// Degree of continuity with respect to arc length
    pub continuity: i32,
    /// Number of dimensions (2 or 3)
    pub dimension: i32,
    /// Number of segments
    pub segment_count: usize,
    /// Break points T(1) .. T(N+1)
    pub break_points: Vec<f64>,
    /// Polynomial coefficients: 12 per segment plus the terminal block
    pub coefficients: Vec<f64>,
}

impl ParametricSplineCurve {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let segment_count = usize::try_from(ctx.int_at(3)?).unwrap_or(0);
        let break_points = ctx.reals_at(4, segment_count + 1)?;
        let coefficients = ctx.reals_at(4 + segment_count + 1, 12 * (segment_count + 1))?;
        Ok(ParametricSplineCurve {
            spline_type: ctx.int_at(0)?,
            continuity: ctx.int_at(1)?,
            dimension: ctx.int_at(2)?,
            segment_count,
            break_points,
            coefficients,
        })
    }
}

/// Type 116: Point
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    /// Coordinates
    pub position: [f64; 3],
    /// Display symbol (a subfigure definition), when given
    pub display_symbol: Option<EntityId>,
}

impl Point {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Point {
            position: ctx.triple_at(0)?,
            display_symbol: ctx.optional_pointer_at(3)?,
        })
    }
}

/// Type 126: Rational B-Spline Curve
#[derive(Debug, Clone, PartialEq)]
pub struct RationalBSplineCurve {
    /// Upper index of sum (number of control points - 1)
    pub upper_index: i32,
    /// Degree of the basis functions
    pub degree: i32,
    /// The curve lies in a plane
    pub planar: bool,
    /// The curve is closed
    pub closed: bool,
    /// All weights equal (polynomial form)
    pub polynomial: bool,
    /// The curve is periodic
    pub periodic: bool,
    /// Knot sequence, `upper_index + degree + 2` values
    pub knots: Vec<f64>,
    /// Weights, one per control point
    pub weights: Vec<f64>,
    /// Control points
    pub control_points: Vec<[f64; 3]>,
    /// Parameter range V(0), V(1)
    pub parameter_range: [f64; 2],
    /// Unit normal of the curve plane (meaningful when planar)
    pub normal: [f64; 3],
}

impl RationalBSplineCurve {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let upper_index = ctx.int_at(0)?;
        let degree = ctx.int_at(1)?;
        let k = usize::try_from(upper_index).map_err(|_| {
            IgesError::DataFormat(format!("negative upper index: {}", upper_index))
        })?;
        let m = usize::try_from(degree)
            .map_err(|_| IgesError::DataFormat(format!("negative degree: {}", degree)))?;

        let planar = ctx.logical_at(2)?;
        let closed = ctx.logical_at(3)?;
        let polynomial = ctx.logical_at(4)?;
        let periodic = ctx.logical_at(5)?;

        let knot_count = k + m + 2;
        let knots = ctx.reals_at(6, knot_count)?;
        let weights = ctx.reals_at(6 + knot_count, k + 1)?;

        let mut control_points = Vec::with_capacity(k + 1);
        let base = 6 + knot_count + (k + 1);
        for i in 0..=k {
            control_points.push(ctx.triple_at(base + 3 * i)?);
        }

        let tail = base + 3 * (k + 1);
        Ok(RationalBSplineCurve {
            upper_index,
            degree,
            planar,
            closed,
            polynomial,
            periodic,
            knots,
            weights,
            control_points,
            parameter_range: [ctx.real_at(tail)?, ctx.real_at(tail + 1)?],
            normal: ctx.triple_at(tail + 2)?,
        })
    }
}

/// Type 130: Offset Curve
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetCurve {
    /// The curve being offset
    pub base_curve: EntityId,
    /// Offset distance flag
    pub distance_flag: i32,
    /// Offset-distance function curve, when flag 2 names one
    pub function: Option<EntityId>,
    /// Index of the function component providing the distance
    pub function_component: i32,
    /// Offset distances and their parameter values (TAU1, D1, TAU2, D2)
    pub distances: [f64; 4],
    /// Unit normal of the offset plane
    pub normal: [f64; 3],
    /// Offset curve parameter range (TT1, TT2)
    pub parameter_range: [f64; 2],
}

impl OffsetCurve {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(OffsetCurve {
            base_curve: ctx.pointer_at(0)?,
            distance_flag: ctx.int_at(1)?,
            function: ctx.optional_pointer_at(2)?,
            function_component: ctx.int_at(3)?,
            distances: [
                ctx.real_at(4)?,
                ctx.real_at(5)?,
                ctx.real_at(6)?,
                ctx.real_at(7)?,
            ],
            normal: ctx.triple_at(8)?,
            parameter_range: [ctx.real_at(11)?, ctx.real_at(12)?],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::entity::EntityContext;
    use crate::model::parameter::classify_token;
    use crate::model::scalar::ParameterVector;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn vector(tokens: &[&str]) -> ParameterVector {
        let mut params = ParameterVector::new();
        for t in tokens {
            let (v, f) = classify_token(t);
            params.push(v, f);
        }
        params
    }

    #[test]
    fn test_circular_arc_parse() {
        let mut params = vector(&["0.", "0.", "0.", "2.", "0.", "-2.", "0."]);
        let map = HashMap::new();
        let mut ctx = EntityContext::new(&mut params, &map);
        let arc = CircularArc::parse(&mut ctx).unwrap();
        assert_relative_eq!(arc.start[0], 2.0);
        assert_relative_eq!(arc.end[0], -2.0);
        assert!(ctx.refs.is_empty());
    }

    #[test]
    fn test_composite_curve_resolves_pointers() {
        use crate::entities::id::{IdGenerator, ObjectKind};
        let mut params = vector(&["3", "1", "3", "5"]);
        let mut map = HashMap::new();
        for seq in [1u32, 3, 5] {
            map.insert(seq, IdGenerator::generate(ObjectKind::Entity, Some(100)));
        }
        let mut ctx = EntityContext::new(&mut params, &map);
        let curve = CompositeCurve::parse(&mut ctx).unwrap();
        assert_eq!(curve.curves.len(), 3);
        assert_eq!(ctx.refs.len(), 3);
        assert_eq!(curve.curves[1], map[&3]);
    }

    #[test]
    fn test_composite_curve_dangling_pointer() {
        let mut params = vector(&["1", "9"]);
        let map = HashMap::new();
        let mut ctx = EntityContext::new(&mut params, &map);
        assert!(CompositeCurve::parse(&mut ctx).is_err());
    }

    #[test]
    fn test_nurbs_curve_parse() {
        let mut params = vector(&[
            "3", "3", "0", "0", "0", "0", "0", "0", "0", "0", "1", "1", "1", "1", "1", "1",
            "1", "1", "-4", "-4", "0", "-1.5", "7", "3.5", "4", "-3", "1", "4", "4", "0",
            "0", "1", "0", "0", "1",
        ]);
        let map = HashMap::new();
        let mut ctx = EntityContext::new(&mut params, &map);
        let curve = RationalBSplineCurve::parse(&mut ctx).unwrap();
        assert_eq!(curve.upper_index, 3);
        assert_eq!(curve.degree, 3);
        assert!(!curve.planar);
        assert_eq!(curve.knots.len(), 8);
        assert_eq!(curve.weights, vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(curve.control_points.len(), 4);
        assert_relative_eq!(curve.control_points[1][1], 7.0);
        assert_eq!(curve.parameter_range, [0.0, 1.0]);
        assert_eq!(curve.normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_copious_data_common_z() {
        let mut params = vector(&["1", "2", "0.5", "0.", "0.", "1.", "1."]);
        let map = HashMap::new();
        let mut ctx = EntityContext::new(&mut params, &map);
        let data = CopiousData::parse(&mut ctx).unwrap();
        assert_eq!(data.common_z, Some(0.5));
        assert_eq!(data.len(), 2);
        assert_eq!(data.tuple_width, 2);
    }
}
