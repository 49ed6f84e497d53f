//! The AST container: two arenas addressed by signed indices (spec §3).
//!
//! Positive indices address the constants arena (all non-`VAR` fields:
//! literals and operators); negative indices address the variables arena
//! (`VAR` fields only); zero means "no such field". Both arenas are filled
//! once during parsing and never mutated afterward, except for the
//! temporary variable-resolution swap performed by the evaluator
//! (see [`crate::evaluator`]).

use crate::field::Field;

/// A signed reference into one of [`Expression`]'s two arenas.
///
/// Positive values (1-based) index the constants arena; negative values
/// (also 1-based, by magnitude) index the variables arena; zero is the
/// reserved "no such field" sentinel and never appears as a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(i32);

impl NodeId {
    pub const NONE: NodeId = NodeId(0);

    pub(crate) fn constant(index: usize) -> NodeId {
        NodeId(i32::try_from(index + 1).expect("constants arena overflow"))
    }

    pub(crate) fn variable(index: usize) -> NodeId {
        NodeId(-i32::try_from(index + 1).expect("variables arena overflow"))
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    fn arena_index(self) -> Option<(Arena, usize)> {
        match self.0.cmp(&0) {
            std::cmp::Ordering::Greater => Some((Arena::Constants, (self.0 - 1) as usize)),
            std::cmp::Ordering::Less => Some((Arena::Variables, (-self.0 - 1) as usize)),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arena {
    Constants,
    Variables,
}

/// The whole parsed tree: a constants arena and a variables arena.
///
/// The root is always `NodeId::constant(0)`: fields are appended to the
/// constants arena in source order, an operator always precedes its
/// children (§4.2's ordering rule), so the outermost field — the root — is
/// necessarily the first one the parser sees and the first one appended.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    pub(crate) constants: Vec<Field>,
    pub(crate) variables: Vec<Field>,
}

impl Expression {
    pub(crate) fn new() -> Self {
        Expression {
            constants: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub(crate) fn push_constant(&mut self, field: Field) -> NodeId {
        let id = NodeId::constant(self.constants.len());
        self.constants.push(field);
        id
    }

    pub(crate) fn push_variable(&mut self, field: Field) -> NodeId {
        let id = NodeId::variable(self.variables.len());
        self.variables.push(field);
        id
    }

    /// The root field: the first field appended to the constants arena.
    pub fn root(&self) -> NodeId {
        NodeId::constant(0)
    }

    /// Resolves `id` to its field. Panics on `NodeId::NONE` or an
    /// out-of-range index — both indicate a bug in the parser, since a
    /// well-formed `Expression` never contains a dangling reference
    /// (spec §3 invariant: every child index resolves to an existing
    /// field created earlier in the same arena).
    pub fn get(&self, id: NodeId) -> &Field {
        let (arena, index) = id.arena_index().expect("NodeId::NONE has no field");
        match arena {
            Arena::Constants => &self.constants[index],
            Arena::Variables => &self.variables[index],
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Field {
        let (arena, index) = id.arena_index().expect("NodeId::NONE has no field");
        match arena {
            Arena::Constants => &mut self.constants[index],
            Arena::Variables => &mut self.variables[index],
        }
    }

    /// Number of variable fields (`VAR`) in the tree.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of constant fields (literals and operators) in the tree.
    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Iterates the variables arena in arena order, yielding each one's
    /// `NodeId` alongside its field. Used by the evaluator to build the
    /// resolved-value array and by callers inspecting which variables an
    /// expression references. Per spec §9, variable names are not assumed
    /// unique — duplicates are iterated (and resolved) independently.
    pub fn variables(&self) -> impl Iterator<Item = (NodeId, &Field)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, f)| (NodeId::variable(i), f))
    }

    pub(crate) fn swap_variables(&mut self, replacement: Vec<Field>) -> Vec<Field> {
        std::mem::replace(&mut self.variables, replacement)
    }
}
