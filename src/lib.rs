//! R1CS gadgets for twisted Edwards curves and a compiler for Pinocchio
//! arithmetic circuits.
//!
//! Both are built on `bellpepper_core` through [`frontend`]: gadgets and circuits
//! are written against [`frontend::ConstraintSystem`] and run on an
//! [`frontend::AssignmentCS`], which keeps the constraints next to a witness
//! that can be checked.
#![deny(future_incompatible)]
#![forbid(unsafe_code)]

pub mod edwards;
pub mod frontend;
pub mod gadgets;
pub mod reader;

mod errors;

pub use errors::CircuitError;
