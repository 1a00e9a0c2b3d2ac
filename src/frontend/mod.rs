//! Support for generating R1CS
//!
//! Circuits are written against `bellpepper_core`'s [`ConstraintSystem`] and
//! run on an [`AssignmentCS`], which records constraints and a witness side by
//! side.

mod assignment_cs;
pub mod gadgets;

pub use assignment_cs::{AssignmentCS, Constraint};
pub use bellpepper_core::{
  boolean::AllocatedBit, num::AllocatedNum, Circuit, ConstraintSystem, Index, LinearCombination,
  Namespace, SynthesisError, Variable,
};
pub use gadgets::{alloc_bits_le, alloc_constant, Assignment};
