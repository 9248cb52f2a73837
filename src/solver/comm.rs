mod highlevel;
mod lowlevel;

pub(super) use highlevel::{Conflict, ConflictType, ConstraintSet, HighLevelOpenNode};
pub(super) use lowlevel::LowLevelOpenNode;

#[cfg(test)]
pub(super) use highlevel::{EdgeConstraint, VertexConstraint};
