//! Resolved entities.
//!
//! An [`Entity`] couples the parsed Directory Entry view, the full
//! parameter vector (kept verbatim for round-trip fidelity), the typed
//! payload, and the reference table mapping pointer-valued tokens to
//! entity identifiers. The payload enumeration carries one case per
//! implemented entity layout plus `Unsupported`, which preserves unknown
//! types byte-for-byte.

use std::collections::HashMap;

use crate::entities::id::EntityId;
use crate::entities::partition::Partition;
use crate::entities::{curves, solids, structure, surfaces, topology};
use crate::error::{IgesError, Result};
use crate::model::directory::DirectoryEntry;
use crate::model::parameter::RawParameterData;
use crate::model::scalar::{ParameterVector, ScalarValue, ValueFormat};

/// One pointer-valued token and the identifier it resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Token index within the parameter vector
    pub index: usize,
    /// Target entity
    pub target: EntityId,
}

/// Construction context handed to payload parsers: the token vector,
/// the DE-pointer-to-identifier map and the growing reference table.
pub(crate) struct EntityContext<'a> {
    pub params: &'a mut ParameterVector,
    pub pointer_to_id: &'a HashMap<u32, EntityId>,
    pub refs: Vec<Reference>,
}

impl<'a> EntityContext<'a> {
    pub fn new(
        params: &'a mut ParameterVector,
        pointer_to_id: &'a HashMap<u32, EntityId>,
    ) -> Self {
        EntityContext {
            params,
            pointer_to_id,
            refs: Vec::new(),
        }
    }

    /// Resolve the token at `index` as a required pointer into the file
    pub fn pointer_at(&mut self, index: usize) -> Result<EntityId> {
        let value = self.params.coerce_pointer(index)?;
        if value <= 0 {
            return Err(IgesError::DataFormat(format!(
                "parameter {} must be a DE pointer, found {}",
                index + 1,
                value
            )));
        }
        let id = self
            .pointer_to_id
            .get(&(value as u32))
            .copied()
            .ok_or_else(|| {
                IgesError::DataFormat(format!(
                    "pointer to DE sequence number {} does not match any directory entry",
                    value
                ))
            })?;
        self.refs.push(Reference { index, target: id });
        Ok(id)
    }

    /// Resolve the token at `index` as an optional pointer; 0 or a
    /// blank field mean "absent"
    pub fn optional_pointer_at(&mut self, index: usize) -> Result<Option<EntityId>> {
        if self.params.is_default_at(index) {
            return Ok(None);
        }
        let value = self.params.int_at(index)?;
        if value == 0 {
            return Ok(None);
        }
        self.pointer_at(index).map(Some)
    }

    pub fn int_at(&self, index: usize) -> Result<i32> {
        self.params.int_at(index)
    }

    pub fn real_at(&self, index: usize) -> Result<f64> {
        self.params.real_at(index)
    }

    pub fn str_at(&self, index: usize) -> Result<String> {
        self.params.str_at(index).map(|s| s.to_string())
    }

    pub fn logical_at(&mut self, index: usize) -> Result<bool> {
        self.params.coerce_logical(index)
    }

    /// Read `count` reals starting at `index`
    pub fn reals_at(&self, index: usize, count: usize) -> Result<Vec<f64>> {
        (index..index + count).map(|i| self.real_at(i)).collect()
    }

    /// Read a coordinate triple starting at `index`
    pub fn triple_at(&self, index: usize) -> Result<[f64; 3]> {
        Ok([
            self.real_at(index)?,
            self.real_at(index + 1)?,
            self.real_at(index + 2)?,
        ])
    }
}

/// Typed payload of a resolved entity
#[derive(Debug, Clone, PartialEq)]
pub enum EntityData {
    /// Type 0
    Null,
    /// Type 100
    CircularArc(curves::CircularArc),
    /// Type 102
    CompositeCurve(curves::CompositeCurve),
    /// Type 104
    ConicArc(curves::ConicArc),
    /// Type 106
    CopiousData(curves::CopiousData),
    /// Type 110
    Line(curves::Line),
    /// Type 112
    ParametricSplineCurve(curves::ParametricSplineCurve),
    /// Type 116
    Point(curves::Point),
    /// Type 126
    RationalBSplineCurve(curves::RationalBSplineCurve),
    /// Type 130
    OffsetCurve(curves::OffsetCurve),
    /// Type 108
    Plane(surfaces::Plane),
    /// Type 114
    ParametricSplineSurface(surfaces::ParametricSplineSurface),
    /// Type 118
    RuledSurface(surfaces::RuledSurface),
    /// Type 120
    SurfaceOfRevolution(surfaces::SurfaceOfRevolution),
    /// Type 122
    TabulatedCylinder(surfaces::TabulatedCylinder),
    /// Type 128
    RationalBSplineSurface(surfaces::RationalBSplineSurface),
    /// Type 140
    OffsetSurface(surfaces::OffsetSurface),
    /// Type 141
    Boundary(surfaces::Boundary),
    /// Type 142
    CurveOnParametricSurface(surfaces::CurveOnParametricSurface),
    /// Type 143
    BoundedSurface(surfaces::BoundedSurface),
    /// Type 144
    TrimmedSurface(surfaces::TrimmedSurface),
    /// Type 190
    PlaneSurface(surfaces::PlaneSurface),
    /// Type 192
    CylindricalSurface(surfaces::CylindricalSurface),
    /// Type 194
    ConicalSurface(surfaces::ConicalSurface),
    /// Type 196
    SphericalSurface(surfaces::SphericalSurface),
    /// Type 198
    ToroidalSurface(surfaces::ToroidalSurface),
    /// Type 150
    Block(solids::Block),
    /// Type 152
    RightAngularWedge(solids::RightAngularWedge),
    /// Type 154
    RightCircularCylinder(solids::RightCircularCylinder),
    /// Type 156
    RightCircularCone(solids::RightCircularCone),
    /// Type 158
    Sphere(solids::Sphere),
    /// Type 160
    Torus(solids::Torus),
    /// Type 162
    SolidOfRevolution(solids::SolidOfRevolution),
    /// Type 164
    SolidOfLinearExtrusion(solids::SolidOfLinearExtrusion),
    /// Type 168
    Ellipsoid(solids::Ellipsoid),
    /// Type 186
    ManifoldSolidBRep(solids::ManifoldSolidBRep),
    /// Type 430
    SolidInstance(solids::SolidInstance),
    /// Type 502
    VertexList(topology::VertexList),
    /// Type 504
    EdgeList(topology::EdgeList),
    /// Type 508
    Loop(topology::Loop),
    /// Type 510
    Face(topology::Face),
    /// Type 514
    Shell(topology::Shell),
    /// Type 123
    Direction(structure::Direction),
    /// Type 124
    TransformationMatrix(structure::TransformationMatrix),
    /// Type 308
    SubfigureDefinition(structure::SubfigureDefinition),
    /// Type 314
    ColorDefinition(structure::ColorDefinition),
    /// Type 402, forms 1/7/14/15
    Group(structure::Group),
    /// Type 404
    Drawing(structure::Drawing),
    /// Type 406
    Property(structure::Property),
    /// Type 408
    SingularSubfigureInstance(structure::SingularSubfigureInstance),
    /// Type 410
    View(structure::View),
    /// Type 416
    ExternalReference(structure::ExternalReference),
    /// Any type without an implemented layout; the raw token list is
    /// preserved verbatim
    Unsupported,
}

impl EntityData {
    /// True for every payload except `Unsupported`
    pub fn is_supported(&self) -> bool {
        !matches!(self, EntityData::Unsupported)
    }
}

/// A resolved entity
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    directory: DirectoryEntry,
    params: ParameterVector,
    partition: Partition,
    refs: Vec<Reference>,
    data: EntityData,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        directory: DirectoryEntry,
        params: ParameterVector,
        partition: Partition,
        refs: Vec<Reference>,
        data: EntityData,
    ) -> Self {
        Entity {
            id,
            directory,
            params,
            partition,
            refs,
            data,
        }
    }

    /// Entity type number
    pub fn entity_type(&self) -> i32 {
        self.directory.entity_type
    }

    /// Form number from the DE record
    pub fn form_number(&self) -> i32 {
        self.directory.form_number
    }

    /// The entity's identifier; stable for the life of the session
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The parsed Directory Entry view
    pub fn directory_entry(&self) -> &DirectoryEntry {
        &self.directory
    }

    /// The full parameter vector, including pointer and trailer tokens
    pub fn parameters(&self) -> &ParameterVector {
        &self.params
    }

    /// The (entity, associativity, property) group sizes
    pub fn partition(&self) -> Partition {
        self.partition
    }

    /// Typed payload
    pub fn data(&self) -> &EntityData {
        &self.data
    }

    /// True unless the payload is `Unsupported`
    pub fn is_supported(&self) -> bool {
        self.data.is_supported()
    }

    /// Identifiers of every entity this one references
    pub fn referenced_ids(&self) -> Vec<EntityId> {
        self.refs.iter().map(|r| r.target).collect()
    }

    /// The reference table (token index, target id)
    pub fn references(&self) -> &[Reference] {
        &self.refs
    }

    /// Re-bind the pointer token at `index` to another entity
    pub fn resolve_reference(&mut self, index: usize, target: EntityId) -> Result<()> {
        let reference = self
            .refs
            .iter_mut()
            .find(|r| r.index == index)
            .ok_or_else(|| {
                IgesError::DataFormat(format!(
                    "parameter {} of entity type {} is not a reference",
                    index + 1,
                    self.directory.entity_type
                ))
            })?;
        reference.target = target;
        Ok(())
    }

    /// Self-consistency check: the partition must cover the parameter
    /// vector and every reference index must fall inside it
    pub fn validate(&self) -> Result<()> {
        if self.partition.total() != self.params.len() {
            return Err(IgesError::Implementation(format!(
                "partition {:?} does not cover {} parameters",
                self.partition,
                self.params.len()
            )));
        }
        for reference in &self.refs {
            if reference.index >= self.params.len() {
                return Err(IgesError::Implementation(format!(
                    "reference index {} outside the parameter vector",
                    reference.index
                )));
            }
        }
        Ok(())
    }

    /// Rebuild the raw PD record, rewriting every reference through the
    /// given identifier-to-DE-pointer map. Fails when a referenced
    /// entity is not part of the model being written.
    pub fn to_raw_pd(&self, id_to_pointer: &HashMap<EntityId, u32>) -> Result<RawParameterData> {
        let mut params = self.params.clone();
        for reference in &self.refs {
            let pointer = id_to_pointer.get(&reference.target).ok_or_else(|| {
                IgesError::DataFormat(format!(
                    "entity {} references {} which is not part of the model",
                    self.id, reference.target
                ))
            })?;
            let format = params
                .format(reference.index)
                .unwrap_or_else(ValueFormat::pointer);
            params.set(
                reference.index,
                ScalarValue::Pointer(*pointer as i32),
                format,
            )?;
        }
        Ok(RawParameterData::new(self.directory.entity_type, params))
    }
}
