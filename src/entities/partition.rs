//! Parameter-count partition of PD token streams.
//!
//! Every PD record divides into three ordered groups: the
//! entity-specific parameters, an optional associativity/text-pointer
//! group (a count NA followed by NA pointers), and an optional
//! property-pointer group (a count NP followed by NP pointers). The
//! three group sizes always sum to the token count.
//!
//! The entity-specific count is fixed for most types and derived from
//! embedded count fields for the rest (composite curves, splines,
//! copious data, topology lists, ...).

use crate::entities::types::EntityType;
use crate::error::{IgesError, Result};
use crate::model::scalar::ParameterVector;

/// Group sizes of one PD record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// Entity-specific parameters
    pub n_entity: usize,
    /// Associativity/text pointer group including its leading count
    pub n_assoc: usize,
    /// Property/attribute pointer group including its leading count
    pub n_props: usize,
}

impl Partition {
    /// Total number of tokens covered
    pub fn total(&self) -> usize {
        self.n_entity + self.n_assoc + self.n_props
    }
}

fn overrun(entity_type: i32, needed: usize, available: usize) -> IgesError {
    IgesError::DataFormat(format!(
        "entity type {} declares {} parameters but only {} tokens are present",
        entity_type, needed, available
    ))
}

/// Count field at `index`, which must be a non-negative integer
fn count_at(params: &ParameterVector, index: usize, entity_type: i32) -> Result<usize> {
    let value = params.int_at(index).map_err(|_| {
        IgesError::DataFormat(format!(
            "entity type {}: parameter {} must be an integer count",
            entity_type,
            index + 1
        ))
    })?;
    usize::try_from(value).map_err(|_| {
        IgesError::DataFormat(format!(
            "entity type {}: parameter {} is a negative count ({})",
            entity_type,
            index + 1,
            value
        ))
    })
}

/// Entity-specific parameter count for the implemented layouts; `None`
/// for types whose layout this crate does not model (they consume the
/// whole stream).
fn entity_parameter_count(
    ty: EntityType,
    form: i32,
    params: &ParameterVector,
) -> Result<Option<usize>> {
    use EntityType::*;
    let number = ty.number();
    let len = params.len();

    let counted = |index: usize| count_at(params, index, number);

    let n = match ty {
        Null => len,
        CircularArc => 7,
        CompositeCurve => 1 + counted(0)?,
        ConicArc => 11,
        CopiousData => {
            let ip = counted(0)?;
            let n = counted(1)?;
            match ip {
                1 => 2 + 1 + 2 * n,
                2 => 2 + 3 * n,
                3 => 2 + 6 * n,
                other => {
                    return Err(IgesError::DataFormat(format!(
                        "copious data interpretation flag must be 1, 2 or 3, found {}",
                        other
                    )))
                }
            }
        }
        Plane => 9,
        Line => 6,
        ParametricSplineCurve => {
            let n = counted(3)?;
            4 + (n + 1) + 12 * (n + 1)
        }
        ParametricSplineSurface => {
            let m = counted(2)?;
            let n = counted(3)?;
            4 + (m + 1) + (n + 1) + 48 * (m + 1) * (n + 1)
        }
        Point => 4,
        RuledSurface => 4,
        SurfaceOfRevolution => 4,
        TabulatedCylinder => 4,
        Direction => 3,
        TransformationMatrix => 12,
        Flash => {
            if form == 0 {
                3
            } else {
                5
            }
        }
        RationalBSplineCurve => {
            let k = counted(0)?;
            let m = counted(1)?;
            // props 1-4, knots, weights, control points, V(0), V(1) and
            // the unit normal (present whether or not the curve is
            // planar)
            6 + (k + m + 2) + (k + 1) + 3 * (k + 1) + 2 + 3
        }
        RationalBSplineSurface => {
            let k1 = counted(0)?;
            let k2 = counted(1)?;
            let m1 = counted(2)?;
            let m2 = counted(3)?;
            9 + (k1 + m1 + 2) + (k2 + m2 + 2) + 4 * (k1 + 1) * (k2 + 1) + 4
        }
        OffsetCurve => 14,
        OffsetSurface => 5,
        Boundary => {
            let n = counted(3)?;
            let mut at = 4usize;
            for _ in 0..n {
                // curve pointer, sense flag, parameter-curve count
                if at + 2 >= len {
                    return Err(overrun(number, at + 3, len));
                }
                let k = counted(at + 2)?;
                at += 3 + k;
            }
            at
        }
        CurveOnParametricSurface => 5,
        BoundedSurface => 3 + counted(2)?,
        TrimmedSurface => 4 + counted(2)?,
        Block => 12,
        RightAngularWedge => 13,
        RightCircularCylinder => 8,
        RightCircularCone => 9,
        Sphere => 4,
        Torus => 8,
        SolidOfRevolution => 8,
        SolidOfLinearExtrusion => 5,
        Ellipsoid => 12,
        ManifoldSolidBRep => {
            let n = counted(2)?;
            3 + 2 * n
        }
        PlaneSurface => {
            if form == 1 {
                3
            } else {
                2
            }
        }
        RightCircularCylindricalSurface => {
            if form == 1 {
                4
            } else {
                3
            }
        }
        RightCircularConicalSurface => {
            if form == 1 {
                5
            } else {
                4
            }
        }
        SphericalSurface => {
            if form == 1 {
                4
            } else {
                2
            }
        }
        ToroidalSurface => {
            if form == 1 {
                5
            } else {
                4
            }
        }
        SubfigureDefinition => 3 + counted(2)?,
        ColorDefinition => {
            // the color name is optional; a fourth string token is the
            // name, an integer would start a trailing pointer group
            let named = matches!(
                params.value(3),
                Some(crate::model::scalar::ScalarValue::Str(s)) if !s.is_empty()
            );
            if named {
                4
            } else {
                3
            }
        }
        AssociativityInstance => match form {
            1 | 7 | 14 | 15 => 1 + counted(0)?,
            _ => len,
        },
        Drawing => {
            let n = counted(0)?;
            let views = 1 + 3 * n;
            if views > len {
                return Err(overrun(number, views, len));
            }
            // the annotation count may be omitted entirely
            if views == len {
                views
            } else {
                let m = counted(views)?;
                views + 1 + m
            }
        }
        Property => 1 + counted(0)?,
        SingularSubfigureInstance => 5,
        View => {
            if form == 0 {
                8
            } else {
                len
            }
        }
        ExternalReference => {
            if form == 1 {
                1
            } else {
                2
            }
        }
        SolidInstance => 1,
        VertexList => 1 + 3 * counted(0)?,
        EdgeList => 1 + 5 * counted(0)?,
        Loop => {
            let n = counted(0)?;
            let mut at = 1usize;
            for _ in 0..n {
                // edge type, edge pointer, index, orientation, curve count
                if at + 4 >= len {
                    return Err(overrun(number, at + 5, len));
                }
                let k = counted(at + 4)?;
                at += 5 + 2 * k;
            }
            at
        }
        Face => 3 + counted(1)?,
        Shell => 1 + 2 * counted(0)?,
        _ => return Ok(None),
    };
    Ok(Some(n))
}

/// Partition a PD record's tokens into (entity, associativity, property)
/// group sizes. Declared counts that overrun the stream fail with
/// `DataFormat`.
pub fn parameter_partition(
    entity_type: i32,
    form: i32,
    params: &ParameterVector,
) -> Result<Partition> {
    let len = params.len();
    let n_entity = match EntityType::from_number(entity_type)
        .map(|ty| entity_parameter_count(ty, form, params))
        .transpose()?
        .flatten()
    {
        Some(n) => n,
        // unknown layouts own the whole stream
        None => len,
    };
    if n_entity > len {
        return Err(overrun(entity_type, n_entity, len));
    }

    let mut at = n_entity;
    let mut n_assoc = 0usize;
    if at < len {
        // a blank count stands for zero
        let na = if params.is_default_at(at) {
            0
        } else {
            count_at(params, at, entity_type)?
        };
        n_assoc = 1 + na;
        at += n_assoc;
        if at > len {
            return Err(overrun(entity_type, at, len));
        }
    }

    let mut n_props = 0usize;
    if at < len {
        let np = if params.is_default_at(at) {
            0
        } else {
            count_at(params, at, entity_type)?
        };
        n_props = 1 + np;
        at += n_props;
        if at != len {
            return Err(overrun(entity_type, at, len));
        }
    }

    Ok(Partition {
        n_entity,
        n_assoc,
        n_props,
    })
}
