//! B-rep topology payloads (types 502-514).

use crate::entities::entity::EntityContext;
use crate::entities::id::EntityId;
use crate::error::Result;

/// Type 502: Vertex List
#[derive(Debug, Clone, PartialEq)]
pub struct VertexList {
    /// Vertex coordinates; PD pointers into this entity are 1-based
    /// (pointer, index) pairs
    pub vertices: Vec<[f64; 3]>,
}

impl VertexList {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let count = usize::try_from(ctx.int_at(0)?).unwrap_or(0);
        let mut vertices = Vec::with_capacity(count);
        for i in 0..count {
            vertices.push(ctx.triple_at(1 + 3 * i)?);
        }
        Ok(VertexList { vertices })
    }
}

/// One edge of a type 504 list
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// The model-space curve of the edge
    pub curve: EntityId,
    /// Vertex list holding the start vertex
    pub start_list: EntityId,
    /// 1-based index of the start vertex in its list
    pub start_index: i32,
    /// Vertex list holding the terminate vertex
    pub end_list: EntityId,
    /// 1-based index of the terminate vertex in its list
    pub end_index: i32,
}

/// Type 504: Edge List
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeList {
    /// The edges
    pub edges: Vec<Edge>,
}

impl EdgeList {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let count = usize::try_from(ctx.int_at(0)?).unwrap_or(0);
        let mut edges = Vec::with_capacity(count);
        for i in 0..count {
            let at = 1 + 5 * i;
            edges.push(Edge {
                curve: ctx.pointer_at(at)?,
                start_list: ctx.pointer_at(at + 1)?,
                start_index: ctx.int_at(at + 2)?,
                end_list: ctx.pointer_at(at + 3)?,
                end_index: ctx.int_at(at + 4)?,
            });
        }
        Ok(EdgeList { edges })
    }
}

/// One edge use within a type 508 loop
#[derive(Debug, Clone, PartialEq)]
pub struct LoopEdge {
    /// 0 for an edge, 1 for a vertex
    pub edge_type: i32,
    /// The edge list (or vertex list) entity
    pub element: EntityId,
    /// 1-based index into the list
    pub index: i32,
    /// Orientation of the edge within the loop
    pub orientation: bool,
    /// Underlying parameter-space curves: (isoparametric flag, curve)
    pub parameter_curves: Vec<(bool, EntityId)>,
}

/// Type 508: Loop
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    /// The edge uses of the loop
    pub edges: Vec<LoopEdge>,
}

impl Loop {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let count = usize::try_from(ctx.int_at(0)?).unwrap_or(0);
        let mut edges = Vec::with_capacity(count);
        let mut at = 1usize;
        for _ in 0..count {
            let edge_type = ctx.int_at(at)?;
            let element = ctx.pointer_at(at + 1)?;
            let index = ctx.int_at(at + 2)?;
            let orientation = ctx.logical_at(at + 3)?;
            let k = usize::try_from(ctx.int_at(at + 4)?).unwrap_or(0);
            let mut parameter_curves = Vec::with_capacity(k);
            for j in 0..k {
                let iso = ctx.logical_at(at + 5 + 2 * j)?;
                let curve = ctx.pointer_at(at + 6 + 2 * j)?;
                parameter_curves.push((iso, curve));
            }
            at += 5 + 2 * k;
            edges.push(LoopEdge {
                edge_type,
                element,
                index,
                orientation,
                parameter_curves,
            });
        }
        Ok(Loop { edges })
    }
}

/// Type 510: Face
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// The underlying surface
    pub surface: EntityId,
    /// True when the outer loop is present (it is the first loop)
    pub has_outer_loop: bool,
    /// The face's loops
    pub loops: Vec<EntityId>,
}

impl Face {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let surface = ctx.pointer_at(0)?;
        let count = usize::try_from(ctx.int_at(1)?).unwrap_or(0);
        let has_outer_loop = ctx.logical_at(2)?;
        let mut loops = Vec::with_capacity(count);
        for i in 0..count {
            loops.push(ctx.pointer_at(3 + i)?);
        }
        Ok(Face {
            surface,
            has_outer_loop,
            loops,
        })
    }
}

/// Type 514: Shell
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    /// Faces and their orientation flags
    pub faces: Vec<(EntityId, bool)>,
}

impl Shell {
    pub(crate) fn parse(ctx: &mut EntityContext<'_>) -> Result<Self> {
        let count = usize::try_from(ctx.int_at(0)?).unwrap_or(0);
        let mut faces = Vec::with_capacity(count);
        for i in 0..count {
            let face = ctx.pointer_at(1 + 2 * i)?;
            let orientation = ctx.logical_at(2 + 2 * i)?;
            faces.push((face, orientation));
        }
        Ok(Shell { faces })
    }
}
