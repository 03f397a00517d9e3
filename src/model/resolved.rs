//! The resolved (entity-graph) model.
//!
//! Entities are addressed by opaque identifiers; inter-entity pointers
//! become identifiers during two-pass construction (reserve one id per
//! DE record, then build every entity against the complete map), so
//! forward references never dangle. Dropping the model releases any
//! identifiers still reserved for it.

use std::collections::{HashMap, HashSet};

use crate::entities::entity::Entity;
use crate::entities::factory::create_entity;
use crate::entities::id::{EntityId, IdGenerator, ObjectKind};
use crate::error::{IgesError, Result};
use crate::model::directory::SubordinateSwitch;
use crate::model::global::GlobalRecord;
use crate::model::intermediate::IntermediateModel;

/// A fully cross-referenced file
#[derive(Debug)]
pub struct ResolvedModel {
    id: EntityId,
    /// Start section text
    pub start: String,
    /// Global section
    pub global: GlobalRecord,
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,
}

impl ResolvedModel {
    /// An empty model (for building files in memory)
    pub fn new(global: GlobalRecord, start: String) -> Self {
        ResolvedModel {
            id: IdGenerator::generate(ObjectKind::File, None),
            start,
            global,
            entities: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The model's own identifier
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when the model holds no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity by identifier
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable entity by identifier
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Entity identifiers in file order
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    /// Entities in file order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Add an in-memory entity
    pub fn insert(&mut self, entity: Entity) {
        let id = entity.id();
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
        }
    }

    /// True when any entity is an unsupported (raw) payload
    pub fn contains_unsupported(&self) -> bool {
        self.iter().any(|e| !e.is_supported())
    }

    /// Referenced identifiers that name no entity in the model. Empty
    /// after a successful two-pass read; useful as a diagnostic when
    /// models are assembled or edited in memory.
    pub fn unresolved_references(&self) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for entity in self.iter() {
            for target in entity.referenced_ids() {
                if !self.entities.contains_key(&target) && seen.insert(target) {
                    missing.push(target);
                }
            }
        }
        missing
    }

    /// Children of an entity under the given dependency class: the
    /// referenced entities whose subordinate switch carries that class
    pub fn children_of(&self, id: EntityId, class: SubordinateSwitch) -> Vec<EntityId> {
        let entity = match self.entities.get(&id) {
            Some(e) => e,
            None => return Vec::new(),
        };
        entity
            .referenced_ids()
            .into_iter()
            .filter(|child| {
                self.entities
                    .get(child)
                    .map(|c| {
                        let switch = c.directory_entry().status.subordinate;
                        match class {
                            SubordinateSwitch::Independent => {
                                switch == SubordinateSwitch::Independent
                            }
                            SubordinateSwitch::PhysicallyDependent => matches!(
                                switch,
                                SubordinateSwitch::PhysicallyDependent | SubordinateSwitch::Both
                            ),
                            SubordinateSwitch::LogicallyDependent => matches!(
                                switch,
                                SubordinateSwitch::LogicallyDependent | SubordinateSwitch::Both
                            ),
                            SubordinateSwitch::Both => switch == SubordinateSwitch::Both,
                        }
                    })
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Build the graph from an intermediate model.
    ///
    /// Pass 1 reserves one identifier per DE record; pass 2 constructs
    /// every entity against the completed pointer map, so references may
    /// point forward in the file.
    pub fn from_intermediate(intermediate: &IntermediateModel) -> Result<Self> {
        intermediate.check_consistency()?;

        let file = IdGenerator::generate(ObjectKind::File, None);

        // pass 1: reserve identifiers keyed by DE sequence number
        let mut pointer_to_id: HashMap<u32, EntityId> = HashMap::new();
        for de in &intermediate.directory {
            if pointer_to_id.contains_key(&de.sequence_number) {
                IdGenerator::release_file(file);
                return Err(IgesError::DataFormat(format!(
                    "duplicate DE sequence number: {}",
                    de.sequence_number
                )));
            }
            let id = IdGenerator::reserve(file, Some(de.entity_type), de.sequence_number);
            pointer_to_id.insert(de.sequence_number, id);
        }

        // pass 2: construct entities against the complete map
        let mut model = ResolvedModel {
            id: file,
            start: intermediate.start.clone(),
            global: intermediate.global.clone(),
            entities: HashMap::with_capacity(intermediate.directory.len()),
            order: Vec::with_capacity(intermediate.directory.len()),
        };
        for de in &intermediate.directory {
            let pd = intermediate
                .parameters
                .iter()
                .find(|pd| {
                    pd.de_pointer == de.sequence_number
                        || (pd.sequence_number != 0
                            && pd.sequence_number == de.parameter_data_pointer)
                })
                .ok_or_else(|| {
                    IgesError::DataFormat(format!(
                        "no parameter data record at line {} for DE sequence number {}",
                        de.parameter_data_pointer, de.sequence_number
                    ))
                })?;

            let entity = match create_entity(de, pd, &pointer_to_id, file) {
                Ok(entity) => entity,
                Err(e) => {
                    IdGenerator::release_file(file);
                    return Err(e);
                }
            };
            model.order.push(entity.id());
            model.entities.insert(entity.id(), entity);
        }

        // any leftover reservations belong to records that were never
        // constructed
        IdGenerator::release_file(file);

        log::debug!("resolved {} entities", model.len());
        Ok(model)
    }

    /// Flatten the graph back to an intermediate model.
    ///
    /// DE sequence numbers are reassigned as the odd progression in file
    /// order. With `save_unsupported` false, any unsupported entity
    /// fails the conversion before a writer can produce bytes.
    pub fn to_intermediate(&self, save_unsupported: bool) -> Result<IntermediateModel> {
        if !save_unsupported {
            if let Some(entity) = self.iter().find(|e| !e.is_supported()) {
                return Err(IgesError::TypeConversion(format!(
                    "the model contains an unsupported entity (type {} at {}); \
                     pass save_unsupported to include it",
                    entity.entity_type(),
                    entity.id()
                )));
            }
        }

        let mut id_to_pointer: HashMap<EntityId, u32> = HashMap::new();
        for (i, id) in self.order.iter().enumerate() {
            id_to_pointer.insert(*id, 2 * i as u32 + 1);
        }

        let mut intermediate = IntermediateModel {
            start: self.start.clone(),
            global: self.global.clone(),
            ..IntermediateModel::default()
        };
        for (i, entity) in self.iter().enumerate() {
            let sequence_number = 2 * i as u32 + 1;
            let mut de = entity.directory_entry().clone();
            de.sequence_number = sequence_number;

            let mut pd = entity.to_raw_pd(&id_to_pointer)?;
            pd.de_pointer = sequence_number;

            // the writer recomputes the PD pointer and line count; keep
            // the stored values consistent in the meantime
            de.parameter_data_pointer = 0;
            intermediate.directory.push(de);
            intermediate.parameters.push(pd);
        }
        Ok(intermediate)
    }
}

impl Drop for ResolvedModel {
    fn drop(&mut self) {
        IdGenerator::release_file(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::directory::DirectoryEntry;
    use crate::model::parameter::{classify_token, RawParameterData};
    use crate::model::scalar::ParameterVector;

    fn pd(entity_type: i32, de_pointer: u32, seq: u32, tokens: &[&str]) -> RawParameterData {
        let mut params = ParameterVector::new();
        for t in tokens {
            let (v, f) = classify_token(t);
            params.push(v, f);
        }
        RawParameterData {
            entity_type,
            de_pointer,
            sequence_number: seq,
            params,
        }
    }

    fn de(entity_type: i32, seq: u32, pd_pointer: u32) -> DirectoryEntry {
        DirectoryEntry {
            entity_type,
            sequence_number: seq,
            parameter_data_pointer: pd_pointer,
            parameter_line_count: 1,
            ..DirectoryEntry::default()
        }
    }

    fn composite_model() -> IntermediateModel {
        IntermediateModel {
            start: "composite".to_string(),
            global: GlobalRecord::default(),
            directory: vec![
                de(100, 1, 1),
                de(100, 3, 2),
                de(100, 5, 3),
                de(102, 7, 4),
            ],
            parameters: vec![
                pd(100, 1, 1, &["0.", "0.", "0.", "1.", "0.", "0.", "1."]),
                pd(100, 3, 2, &["0.", "0.", "0.", "1.", "0.", "0.", "1."]),
                pd(100, 5, 3, &["0.", "0.", "0.", "1.", "0.", "0.", "1."]),
                pd(102, 7, 4, &["3", "1", "3", "5"]),
            ],
            terminate: [1, 3, 8, 4],
        }
    }

    #[test]
    fn test_two_pass_resolution() {
        let model = ResolvedModel::from_intermediate(&composite_model()).unwrap();
        assert_eq!(model.len(), 4);
        assert!(model.unresolved_references().is_empty());

        let composite = model.iter().find(|e| e.entity_type() == 102).unwrap();
        let arcs: Vec<EntityId> = model
            .iter()
            .filter(|e| e.entity_type() == 100)
            .map(|e| e.id())
            .collect();
        assert_eq!(composite.referenced_ids(), arcs);
    }

    #[test]
    fn test_dangling_pointer_fails() {
        let mut intermediate = composite_model();
        // the composite now points at a DE record that does not exist
        intermediate.parameters[3] = pd(102, 7, 4, &["3", "1", "3", "9"]);
        assert!(matches!(
            ResolvedModel::from_intermediate(&intermediate),
            Err(IgesError::DataFormat(_))
        ));
    }

    #[test]
    fn test_ids_are_stable_and_unique() {
        let model = ResolvedModel::from_intermediate(&composite_model()).unwrap();
        let ids: HashSet<EntityId> = model.ids().iter().copied().collect();
        assert_eq!(ids.len(), model.len());
        for entity in model.iter() {
            assert_eq!(model.get(entity.id()).unwrap().id(), entity.id());
        }
    }

    #[test]
    fn test_round_trip_to_intermediate() {
        let model = ResolvedModel::from_intermediate(&composite_model()).unwrap();
        let back = model.to_intermediate(false).unwrap();
        assert_eq!(back.directory.len(), 4);
        let seqs: Vec<u32> = back.directory.iter().map(|d| d.sequence_number).collect();
        assert_eq!(seqs, vec![1, 3, 5, 7]);
        // the composite's pointers still name the three arcs
        let composite = &back.parameters[3];
        assert_eq!(composite.params.int_at(1).unwrap(), 1);
        assert_eq!(composite.params.int_at(2).unwrap(), 3);
        assert_eq!(composite.params.int_at(3).unwrap(), 5);
    }

    #[test]
    fn test_unsupported_entity_blocks_conversion() {
        let intermediate = IntermediateModel {
            start: String::new(),
            global: GlobalRecord::default(),
            directory: vec![de(999, 1, 1)],
            parameters: vec![pd(999, 1, 1, &["1", "2", "3.14", "5H hello", "0"])],
            terminate: [1, 1, 2, 1],
        };
        let model = ResolvedModel::from_intermediate(&intermediate).unwrap();
        assert!(model.contains_unsupported());
        assert!(matches!(
            model.to_intermediate(false),
            Err(IgesError::TypeConversion(_))
        ));
        assert!(model.to_intermediate(true).is_ok());
    }
}
