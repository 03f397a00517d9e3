//! Constructive solid geometry and B-rep solid payloads (types 150-430).

use crate::entities::entity::EntityContext;
use crate::entities::id::EntityId;
use crate::error::Result;

/// Type 150: Block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Edge lengths LX, LY, LZ
    pub lengths: [f64; 3],
    /// Corner point
    pub corner: [f64; 3],
    /// Local X axis direction
    pub x_axis: [f64; 3],
    /// Local Z axis direction
    pub z_axis: [f64; 3],
}

impl Block {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Block {
            lengths: ctx.triple_at(0)?,
            corner: ctx.triple_at(3)?,
            x_axis: ctx.triple_at(6)?,
            z_axis: ctx.triple_at(9)?,
        })
    }
}

/// Type 152: Right Angular Wedge
#[derive(Debug, Clone, PartialEq)]
pub struct RightAngularWedge {
    /// Edge lengths LX, LY, LZ
    pub lengths: [f64; 3],
    /// Length of the top face along X
    pub top_length: f64,
    /// Corner point
    pub corner: [f64; 3],
    /// Local X axis direction
    pub x_axis: [f64; 3],
    /// Local Z axis direction
    pub z_axis: [f64; 3],
}

impl RightAngularWedge {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(RightAngularWedge {
            lengths: ctx.triple_at(0)?,
            top_length: ctx.real_at(3)?,
            corner: ctx.triple_at(4)?,
            x_axis: ctx.triple_at(7)?,
            z_axis: ctx.triple_at(10)?,
        })
    }
}

/// Type 154: Right Circular Cylinder
#[derive(Debug, Clone, PartialEq)]
pub struct RightCircularCylinder {
    /// Height
    pub height: f64,
    /// Radius
    pub radius: f64,
    /// Center of the base face
    pub base_center: [f64; 3],
    /// Axis direction
    pub axis: [f64; 3],
}

impl RightCircularCylinder {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(RightCircularCylinder {
            height: ctx.real_at(0)?,
            radius: ctx.real_at(1)?,
            base_center: ctx.triple_at(2)?,
            axis: ctx.triple_at(5)?,
        })
    }
}

/// Type 156: Right Circular Cone
#[derive(Debug, Clone, PartialEq)]
pub struct RightCircularCone {
    /// Height
    pub height: f64,
    /// Radius of the large face
    pub large_radius: f64,
    /// Radius of the small face (0 for an apex)
    pub small_radius: f64,
    /// Center of the large face
    pub base_center: [f64; 3],
    /// Axis direction
    pub axis: [f64; 3],
}

impl RightCircularCone {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(RightCircularCone {
            height: ctx.real_at(0)?,
            large_radius: ctx.real_at(1)?,
            small_radius: ctx.real_at(2)?,
            base_center: ctx.triple_at(3)?,
            axis: ctx.triple_at(6)?,
        })
    }
}

/// Type 158: Sphere
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    /// Radius
    pub radius: f64,
    /// Center point
    pub center: [f64; 3],
}

impl Sphere {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Sphere {
            radius: ctx.real_at(0)?,
            center: ctx.triple_at(1)?,
        })
    }
}

/// Type 160: Torus
#[derive(Debug, Clone, PartialEq)]
pub struct Torus {
    /// Distance from the axis to the tube center
    pub major_radius: f64,
    /// Tube radius
    pub minor_radius: f64,
    /// Center point
    pub center: [f64; 3],
    /// Axis direction
    pub axis: [f64; 3],
}

impl Torus {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Torus {
            major_radius: ctx.real_at(0)?,
            minor_radius: ctx.real_at(1)?,
            center: ctx.triple_at(2)?,
            axis: ctx.triple_at(5)?,
        })
    }
}

/// Type 162: Solid of Revolution
#[derive(Debug, Clone, PartialEq)]
pub struct SolidOfRevolution {
    /// The curve being revolved
    pub curve: EntityId,
    /// Fraction of a full rotation
    pub fraction: f64,
    /// A point on the axis
    pub axis_point: [f64; 3],
    /// Axis direction
    pub axis: [f64; 3],
}

impl SolidOfRevolution {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(SolidOfRevolution {
            curve: ctx.pointer_at(0)?,
            fraction: ctx.real_at(1)?,
            axis_point: ctx.triple_at(2)?,
            axis: ctx.triple_at(5)?,
        })
    }
}

/// Type 164: Solid of Linear Extrusion
#[derive(Debug, Clone, PartialEq)]
pub struct SolidOfLinearExtrusion {
    /// The curve being extruded
    pub curve: EntityId,
    /// Extrusion length
    pub length: f64,
    /// Extrusion direction
    pub direction: [f64; 3],
}

impl SolidOfLinearExtrusion {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(SolidOfLinearExtrusion {
            curve: ctx.pointer_at(0)?,
            length: ctx.real_at(1)?,
            direction: ctx.triple_at(2)?,
        })
    }
}

/// Type 168: Ellipsoid
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    /// Semi-axis lengths
    pub lengths: [f64; 3],
    /// Center point
    pub center: [f64; 3],
    /// Local X axis direction
    pub x_axis: [f64; 3],
    /// Local Z axis direction
    pub z_axis: [f64; 3],
}

impl Ellipsoid {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Ellipsoid {
            lengths: ctx.triple_at(0)?,
            center: ctx.triple_at(3)?,
            x_axis: ctx.triple_at(6)?,
            z_axis: ctx.triple_at(9)?,
        })
    }
}

/// Type 186: Manifold Solid B-Rep Object
#[derive(Debug, Clone, PartialEq)]
pub struct ManifoldSolidBRep {
    /// The outer shell
    pub shell: EntityId,
    /// Orientation of the outer shell with respect to its faces
    pub shell_outward: bool,
    /// Void shells and their orientations
    pub voids: Vec<(EntityId, bool)>,
}

impl ManifoldSolidBRep {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let shell = ctx.pointer_at(0)?;
        let shell_outward = ctx.logical_at(1)?;
        let count = usize::try_from(ctx.int_at(2)?).unwrap_or(0);
        let mut voids = Vec::with_capacity(count);
        for i in 0..count {
            let void_shell = ctx.pointer_at(3 + 2 * i)?;
            let outward = ctx.logical_at(4 + 2 * i)?;
            voids.push((void_shell, outward));
        }
        Ok(ManifoldSolidBRep {
            shell,
            shell_outward,
            voids,
        })
    }
}

/// Type 430: Solid Instance
#[derive(Debug, Clone, PartialEq)]
pub struct SolidInstance {
    /// The solid (or solid instance) being instanced
    pub entity: EntityId,
}

impl SolidInstance {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(SolidInstance {
            entity: ctx.pointer_at(0)?,
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
    fn test_sphere_parse() {
        let mut params = vector(&["2.5", "1.", "0.", "-1."]);
        let map = HashMap::new();
        let mut ctx = EntityContext::new(&mut params, &map);
        let sphere = Sphere::parse(&mut ctx).unwrap();
        assert_relative_eq!(sphere.radius, 2.5);
        assert_eq!(sphere.center, [1.0, 0.0, -1.0]);
    }

    #[test]
    fn test_manifold_brep_voids() {
        let mut params = vector(&["1", "1", "2", "3", "0", "5", "1"]);
        let map: HashMap<u32, _> = [1u32, 3, 5]
            .into_iter()
            .map(|s| (s, IdGenerator::generate(ObjectKind::Entity, Some(514))))
            .collect();
        let mut ctx = EntityContext::new(&mut params, &map);
        let brep = ManifoldSolidBRep::parse(&mut ctx).unwrap();
        assert!(brep.shell_outward);
        assert_eq!(brep.voids.len(), 2);
        assert_eq!(brep.voids[0], (map[&3], false));
        assert_eq!(brep.voids[1], (map[&5], true));
    }
}
