//! Structural and definition payloads: transformations, directions,
//! subfigures, groups, drawings, views and external references.

use crate::entities::entity::EntityContext;
use crate::entities::id::EntityId;
use crate::error::Result;

/// Type 123: Direction
#[derive(Debug, Clone, PartialEq)]
pub struct Direction {
    /// The direction vector (not necessarily unit length)
    pub vector: [f64; 3],
}

impl Direction {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Direction {
            vector: ctx.triple_at(0)?,
        })
    }
}

/// Type 124: Transformation Matrix.
///
/// A 3x3 rotation and a translation vector, stored row-major as the
/// twelve wire values R11 R12 R13 T1 R21 ... T3. The codec treats the
/// aggregate as opaque numbers; geometric interpretation is the
/// consumer's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationMatrix {
    /// Rotation rows
    pub rotation: [[f64; 3]; 3],
    /// Translation vector
    pub translation: [f64; 3],
}

impl TransformationMatrix {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let mut rotation = [[0.0; 3]; 3];
        let mut translation = [0.0; 3];
        for row in 0..3 {
            for col in 0..3 {
                rotation[row][col] = ctx.real_at(4 * row + col)?;
            }
            translation[row] = ctx.real_at(4 * row + 3)?;
        }
        Ok(TransformationMatrix {
            rotation,
            translation,
        })
    }

    /// The identity transform
    pub fn identity() -> Self {
        TransformationMatrix {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }
}

/// Type 308: Subfigure Definition
#[derive(Debug, Clone, PartialEq)]
pub struct SubfigureDefinition {
    /// Nesting depth
    pub depth: i32,
    /// Subfigure name
    pub name: String,
    /// The entities making up the subfigure
    pub entities: Vec<EntityId>,
}

impl SubfigureDefinition {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let depth = ctx.int_at(0)?;
        let name = ctx.str_at(1)?;
        let count = usize::try_from(ctx.int_at(2)?).unwrap_or(0);
        let mut entities = Vec::with_capacity(count);
        for i in 0..count {
            entities.push(ctx.pointer_at(3 + i)?);
        }
        Ok(SubfigureDefinition {
            depth,
            name,
            entities,
        })
    }
}

/// Type 314: Color Definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDefinition {
    /// Red, green, blue as percentages (0.0 - 100.0)
    pub rgb: [f64; 3],
    /// Optional color name
    pub name: Option<String>,
}

impl ColorDefinition {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, n_entity: usize) -> Result<Self> {
        Ok(ColorDefinition {
            rgb: ctx.triple_at(0)?,
            name: if n_entity > 3 {
                Some(ctx.str_at(3)?)
            } else {
                None
            },
        })
    }
}

/// Type 402, forms 1/7/14/15: grouped associativity instances
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group members
    pub entries: Vec<EntityId>,
}

impl Group {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let count = usize::try_from(ctx.int_at(0)?).unwrap_or(0);
        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            entries.push(ctx.pointer_at(1 + i)?);
        }
        Ok(Group { entries })
    }
}

/// One view placement within a type 404 drawing
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingView {
    /// The view entity
    pub view: EntityId,
    /// Drawing-space origin of the view
    pub origin: [f64; 2],
}

/// Type 404: Drawing
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    /// Placed views
    pub views: Vec<DrawingView>,
    /// Annotation entities
    pub annotations: Vec<EntityId>,
}

impl Drawing {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, n_entity: usize) -> Result<Self> {
        let view_count = usize::try_from(ctx.int_at(0)?).unwrap_or(0);
        let mut views = Vec::with_capacity(view_count);
        for i in 0..view_count {
            let at = 1 + 3 * i;
            views.push(DrawingView {
                view: ctx.pointer_at(at)?,
                origin: [ctx.real_at(at + 1)?, ctx.real_at(at + 2)?],
            });
        }

        let mut annotations = Vec::new();
        let after_views = 1 + 3 * view_count;
        if after_views < n_entity {
            let count = usize::try_from(ctx.int_at(after_views)?).unwrap_or(0);
            for i in 0..count {
                annotations.push(ctx.pointer_at(after_views + 1 + i)?);
            }
        }
        Ok(Drawing { views, annotations })
    }
}

/// Type 406: Property. The value layout depends on the form number,
/// so values stay accessible through the entity's parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Number of property values
    pub value_count: usize,
}

impl Property {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(Property {
            value_count: usize::try_from(ctx.int_at(0)?).unwrap_or(0),
        })
    }
}

/// Type 408: Singular Subfigure Instance
#[derive(Debug, Clone, PartialEq)]
pub struct SingularSubfigureInstance {
    /// The subfigure definition
    pub definition: EntityId,
    /// Translation applied to the subfigure
    pub translation: [f64; 3],
    /// Scale factor
    pub scale: f64,
}

impl SingularSubfigureInstance {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        Ok(SingularSubfigureInstance {
            definition: ctx.pointer_at(0)?,
            translation: ctx.triple_at(1)?,
            scale: ctx.real_at(4)?,
        })
    }
}

/// Type 410, form 0: View
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// View number
    pub view_number: i32,
    /// Scale factor
    pub scale: f64,
    /// Clipping planes: left, top, right, bottom, back, front
    pub clipping_planes: [Option<EntityId>; 6],
}

impl View {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let view_number = ctx.int_at(0)?;
        let scale = ctx.real_at(1)?;
        let mut clipping_planes = [None; 6];
        for (i, plane) in clipping_planes.iter_mut().enumerate() {
            *plane = ctx.optional_pointer_at(2 + i)?;
        }
        Ok(View {
            view_number,
            scale,
            clipping_planes,
        })
    }
}

/// Type 416: External Reference
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalReference {
    /// Name of the referenced file
    pub file_name: String,
    /// Symbolic name within the referenced file (absent for form 1,
    /// which references a whole file)
    pub symbol: Option<String>,
}

impl ExternalReference {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>, form: i32) -> Result<Self> {
        Ok(ExternalReference {
            file_name: ctx.str_at(0)?,
            symbol: if form == 1 { None } else { Some(ctx.str_at(1)?) },
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

    #[test]
    fn test_transformation_matrix_layout() {
        let mut params = vector(&[
            "1.", "0.", "0.", "10.", "0.", "1.", "0.", "20.", "0.", "0.", "1.", "30.",
        ]);
        let map = HashMap::new();
        let mut ctx = EntityContext::new(&mut params, &map);
        let matrix = TransformationMatrix::parse(&mut ctx).unwrap();
        assert_eq!(matrix.rotation, TransformationMatrix::identity().rotation);
        assert_eq!(matrix.translation, [10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_group_members() {
        let mut params = vector(&["2", "1", "3"]);
        let map: HashMap<u32, _> = [1u32, 3]
            .into_iter()
            .map(|s| (s, IdGenerator::generate(ObjectKind::Entity, None)))
            .collect();
        let mut ctx = EntityContext::new(&mut params, &map);
        let group = Group::parse(&mut ctx).unwrap();
        assert_eq!(group.entries, vec![map[&1], map[&3]]);
    }

    #[test]
    fn test_color_definition_optional_name() {
        let map = HashMap::new();

        let mut params = vector(&["100.", "0.", "0."]);
        let mut ctx = EntityContext::new(&mut params, &map);
        let color = ColorDefinition::parse(&mut ctx, 3).unwrap();
        assert_eq!(color.name, None);

        let mut params = vector(&["100.", "0.", "0.", "3Hred"]);
        let mut ctx = EntityContext::new(&mut params, &map);
        let color = ColorDefinition::parse(&mut ctx, 4).unwrap();
        assert_eq!(color.name.as_deref(), Some("red"));
    }
}
