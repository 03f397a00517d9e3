//! Entity factory: (type number, form) dispatch to typed payloads.
//!
//! The factory consumes a DE record and a raw PD record, partitions the
//! tokens, constructs the typed payload and resolves every
//! pointer-valued token against the DE-pointer-to-identifier map built
//! in pass 1 of resolution. Types without an implemented layout come
//! back as `Unsupported` with their tokens preserved verbatim.

use std::collections::HashMap;

use crate::entities::entity::{Entity, EntityContext, EntityData};
use crate::entities::id::{EntityId, IdGenerator, ObjectKind};
use crate::entities::partition::parameter_partition;
use crate::entities::types::EntityType;
use crate::entities::{curves, solids, structure, surfaces, topology};
use crate::error::{IgesError, Result};
use crate::model::directory::DirectoryEntry;
use crate::model::parameter::RawParameterData;

fn build_payload(
    ty: Option<EntityType>,
    form: i32,
    n_entity: usize,
    ctx: &mut EntityContext<'_>,
) -> Result<EntityData> {
    use EntityType::*;
    let ty = match ty {
        Some(ty) => ty,
        None => return Ok(EntityData::Unsupported),
    };
    Ok(match ty {
        Null => EntityData::Null,
        CircularArc => EntityData::CircularArc(curves::CircularArc::parse(ctx)?),
        CompositeCurve => EntityData::CompositeCurve(curves::CompositeCurve::parse(ctx)?),
        ConicArc => EntityData::ConicArc(curves::ConicArc::parse(ctx)?),
        CopiousData => EntityData::CopiousData(curves::CopiousData::parse(ctx)?),
        Line => EntityData::Line(curves::Line::parse(ctx)?),
        ParametricSplineCurve => {
            EntityData::ParametricSplineCurve(curves::ParametricSplineCurve::parse(ctx)?)
        }
        Point => EntityData::Point(curves::Point::parse(ctx)?),
        RationalBSplineCurve => {
            EntityData::RationalBSplineCurve(curves::RationalBSplineCurve::parse(ctx)?)
        }
        OffsetCurve => EntityData::OffsetCurve(curves::OffsetCurve::parse(ctx)?),
        Plane => EntityData::Plane(surfaces::Plane::parse(ctx)?),
        ParametricSplineSurface => {
            EntityData::ParametricSplineSurface(surfaces::ParametricSplineSurface::parse(ctx)?)
        }
        RuledSurface => EntityData::RuledSurface(surfaces::RuledSurface::parse(ctx)?),
        SurfaceOfRevolution => {
            EntityData::SurfaceOfRevolution(surfaces::SurfaceOfRevolution::parse(ctx)?)
        }
        TabulatedCylinder => {
            EntityData::TabulatedCylinder(surfaces::TabulatedCylinder::parse(ctx)?)
        }
        RationalBSplineSurface => {
            EntityData::RationalBSplineSurface(surfaces::RationalBSplineSurface::parse(ctx)?)
        }
        OffsetSurface => EntityData::OffsetSurface(surfaces::OffsetSurface::parse(ctx)?),
        Boundary => EntityData::Boundary(surfaces::Boundary::parse(ctx)?),
        CurveOnParametricSurface => EntityData::CurveOnParametricSurface(
            surfaces::CurveOnParametricSurface::parse(ctx)?,
        ),
        BoundedSurface => EntityData::BoundedSurface(surfaces::BoundedSurface::parse(ctx)?),
        TrimmedSurface => EntityData::TrimmedSurface(surfaces::TrimmedSurface::parse(ctx)?),
        PlaneSurface => EntityData::PlaneSurface(surfaces::PlaneSurface::parse(ctx, form)?),
        RightCircularCylindricalSurface => {
            EntityData::CylindricalSurface(surfaces::CylindricalSurface::parse(ctx, form)?)
        }
        RightCircularConicalSurface => {
            EntityData::ConicalSurface(surfaces::ConicalSurface::parse(ctx, form)?)
        }
        SphericalSurface => {
            EntityData::SphericalSurface(surfaces::SphericalSurface::parse(ctx, form)?)
        }
        ToroidalSurface => {
            EntityData::ToroidalSurface(surfaces::ToroidalSurface::parse(ctx, form)?)
        }
        Block => EntityData::Block(solids::Block::parse(ctx)?),
        RightAngularWedge => EntityData::RightAngularWedge(solids::RightAngularWedge::parse(ctx)?),
        RightCircularCylinder => {
            EntityData::RightCircularCylinder(solids::RightCircularCylinder::parse(ctx)?)
        }
        RightCircularCone => EntityData::RightCircularCone(solids::RightCircularCone::parse(ctx)?),
        Sphere => EntityData::Sphere(solids::Sphere::parse(ctx)?),
        Torus => EntityData::Torus(solids::Torus::parse(ctx)?),
        SolidOfRevolution => EntityData::SolidOfRevolution(solids::SolidOfRevolution::parse(ctx)?),
        SolidOfLinearExtrusion => {
            EntityData::SolidOfLinearExtrusion(solids::SolidOfLinearExtrusion::parse(ctx)?)
        }
        Ellipsoid => EntityData::Ellipsoid(solids::Ellipsoid::parse(ctx)?),
        ManifoldSolidBRep => EntityData::ManifoldSolidBRep(solids::ManifoldSolidBRep::parse(ctx)?),
        SolidInstance => EntityData::SolidInstance(solids::SolidInstance::parse(ctx)?),
        VertexList => EntityData::VertexList(topology::VertexList::parse(ctx)?),
        EdgeList => EntityData::EdgeList(topology::EdgeList::parse(ctx)?),
        Loop => EntityData::Loop(topology::Loop::parse(ctx)?),
        Face => EntityData::Face(topology::Face::parse(ctx)?),
        Shell => EntityData::Shell(topology::Shell::parse(ctx)?),
        Direction => EntityData::Direction(structure::Direction::parse(ctx)?),
        TransformationMatrix => {
            EntityData::TransformationMatrix(structure::TransformationMatrix::parse(ctx)?)
        }
        SubfigureDefinition => {
            EntityData::SubfigureDefinition(structure::SubfigureDefinition::parse(ctx)?)
        }
        ColorDefinition => {
            EntityData::ColorDefinition(structure::ColorDefinition::parse(ctx, n_entity)?)
        }
        AssociativityInstance => match form {
            1 | 7 | 14 | 15 => EntityData::Group(structure::Group::parse(ctx)?),
            _ => EntityData::Unsupported,
        },
        Drawing => EntityData::Drawing(structure::Drawing::parse(ctx, n_entity)?),
        Property => EntityData::Property(structure::Property::parse(ctx)?),
        SingularSubfigureInstance => EntityData::SingularSubfigureInstance(
            structure::SingularSubfigureInstance::parse(ctx)?,
        ),
        View => {
            if form == 0 {
                EntityData::View(structure::View::parse(ctx)?)
            } else {
                EntityData::Unsupported
            }
        }
        ExternalReference => {
            EntityData::ExternalReference(structure::ExternalReference::parse(ctx, form)?)
        }
        _ => EntityData::Unsupported,
    })
}

/// Resolve the trailing associativity and property pointer groups
fn resolve_trailer_groups(
    ctx: &mut EntityContext<'_>,
    n_entity: usize,
    n_assoc: usize,
    n_props: usize,
) -> Result<()> {
    if n_assoc > 1 {
        for index in n_entity + 1..n_entity + n_assoc {
            ctx.pointer_at(index)?;
        }
    }
    if n_props > 1 {
        let base = n_entity + n_assoc;
        for index in base + 1..base + n_props {
            ctx.pointer_at(index)?;
        }
    }
    Ok(())
}

/// Construct one entity from its DE and PD records.
///
/// `pointer_to_id` maps DE sequence numbers to reserved identifiers;
/// `file` is the owning session. When the DE's sequence number has a
/// reservation, the entity claims it; otherwise a fresh identifier is
/// generated.
pub fn create_entity(
    de: &DirectoryEntry,
    pd: &RawParameterData,
    pointer_to_id: &HashMap<u32, EntityId>,
    file: EntityId,
) -> Result<Entity> {
    if de.entity_type != pd.entity_type {
        return Err(IgesError::DataFormat(format!(
            "directory entry {} has type {} but its parameter data has type {}",
            de.sequence_number, de.entity_type, pd.entity_type
        )));
    }

    let mut params = pd.params.clone();
    let partition = parameter_partition(de.entity_type, de.form_number, &params)?;
    let ty = EntityType::from_number(de.entity_type);

    let mut ctx = EntityContext::new(&mut params, pointer_to_id);
    let data = build_payload(ty, de.form_number, partition.n_entity, &mut ctx).map_err(|e| {
        IgesError::DataFormat(format!(
            "entity at DE sequence number {}: {}",
            de.sequence_number, e
        ))
    })?;
    resolve_trailer_groups(
        &mut ctx,
        partition.n_entity,
        partition.n_assoc,
        partition.n_props,
    )?;
    let refs = std::mem::take(&mut ctx.refs);
    drop(ctx);

    let id = IdGenerator::claim(file, de.sequence_number)
        .unwrap_or_else(|| IdGenerator::generate(ObjectKind::Entity, Some(de.entity_type)));

    Ok(Entity::new(id, de.clone(), params, partition, refs, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parameter::classify_token;
    use crate::model::scalar::{ParameterVector, ScalarValue};

    fn raw_pd(entity_type: i32, tokens: &[&str]) -> RawParameterData {
        let mut params = ParameterVector::new();
        for t in tokens {
            let (v, f) = classify_token(t);
            params.push(v, f);
        }
        RawParameterData {
            entity_type,
            de_pointer: 1,
            sequence_number: 1,
            params,
        }
    }

    fn de(entity_type: i32, form: i32) -> DirectoryEntry {
        DirectoryEntry {
            entity_type,
            sequence_number: 1,
            parameter_data_pointer: 1,
            parameter_line_count: 1,
            form_number: form,
            ..DirectoryEntry::default()
        }
    }

    #[test]
    fn test_factory_builds_typed_payload() {
        let file = IdGenerator::generate(ObjectKind::File, None);
        let pd = raw_pd(100, &["0.", "0.", "0.", "2.", "0.", "-2.", "0."]);
        let entity = create_entity(&de(100, 0), &pd, &HashMap::new(), file).unwrap();
        assert!(matches!(entity.data(), EntityData::CircularArc(_)));
        assert!(entity.is_supported());
        assert!(entity.validate().is_ok());
    }

    #[test]
    fn test_factory_unknown_type_is_preserved() {
        let file = IdGenerator::generate(ObjectKind::File, None);
        let pd = raw_pd(999, &["1", "2", "3.14", "5H hello", "0"]);
        let entity = create_entity(&de(999, 0), &pd, &HashMap::new(), file).unwrap();
        assert!(!entity.is_supported());
        assert_eq!(entity.parameters().len(), 5);
        assert_eq!(
            entity.parameters().value(3),
            Some(&ScalarValue::Str(" hello".to_string()))
        );
    }

    #[test]
    fn test_factory_claims_reserved_id() {
        let file = IdGenerator::generate(ObjectKind::File, None);
        let reserved = IdGenerator::reserve(file, Some(100), 1);
        let pd = raw_pd(100, &["0.", "0.", "0.", "2.", "0.", "-2.", "0."]);
        let entity = create_entity(&de(100, 0), &pd, &HashMap::new(), file).unwrap();
        assert_eq!(entity.id(), reserved);
        IdGenerator::release_file(file);
    }

    #[test]
    fn test_factory_type_mismatch() {
        let file = IdGenerator::generate(ObjectKind::File, None);
        let pd = raw_pd(110, &["0.", "0.", "0.", "1.", "1.", "1."]);
        assert!(create_entity(&de(100, 0), &pd, &HashMap::new(), file).is_err());
    }

    #[test]
    fn test_factory_resolves_trailer_pointers() {
        let file = IdGenerator::generate(ObjectKind::File, None);
        let target = IdGenerator::generate(ObjectKind::Entity, Some(406));
        let mut map = HashMap::new();
        map.insert(9u32, target);
        // a line with one trailing property pointer
        let pd = raw_pd(110, &["0.", "0.", "0.", "1.", "1.", "1.", "0", "1", "9"]);
        let entity = create_entity(&de(110, 0), &pd, &map, file).unwrap();
        assert_eq!(entity.referenced_ids(), vec![target]);
    }
}
