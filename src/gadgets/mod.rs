//! Gadgets over the frontend's constraint systems.
pub mod edwards;
