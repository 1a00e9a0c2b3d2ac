//! Small helpers on top of the `bellpepper_core` number and bit gadgets.

use ff::{PrimeField, PrimeFieldBits};

use super::{AllocatedBit, AllocatedNum, ConstraintSystem, SynthesisError};

/// A trait for representing an assignment to a variable.
pub trait Assignment<T> {
  /// Get the value of the assigned variable.
  fn get(&self) -> Result<&T, SynthesisError>;
}

impl<T> Assignment<T> for Option<T> {
  fn get(&self) -> Result<&T, SynthesisError> {
    self.as_ref().ok_or(SynthesisError::AssignmentMissing)
  }
}

/// Allocates a number pinned to the constant `value` by `num * 1 = value`.
pub fn alloc_constant<Scalar, CS>(mut cs: CS, value: Scalar) -> Result<AllocatedNum<Scalar>, SynthesisError>
where
  Scalar: PrimeField,
  CS: ConstraintSystem<Scalar>,
{
  let num = AllocatedNum::alloc(cs.namespace(|| "value"), || Ok(value))?;
  cs.enforce(
    || "constant",
    |lc| lc + num.get_variable(),
    |lc| lc + CS::one(),
    |lc| lc + (value, CS::one()),
  );
  Ok(num)
}

/// Allocates the `num_bits` low bits of `value`, least significant first.
///
/// Bits are only constrained to be boolean; nothing ties them to a field
/// element, so callers that need that recompose them themselves.
pub fn alloc_bits_le<Scalar, CS>(
  mut cs: CS,
  value: Option<Scalar>,
  num_bits: usize,
) -> Result<Vec<AllocatedBit>, SynthesisError>
where
  Scalar: PrimeFieldBits,
  CS: ConstraintSystem<Scalar>,
{
  let values = match value {
    Some(value) => {
      let bits = value.to_le_bits();
      (0..num_bits)
        .map(|i| Some(bits.get(i).map(|b| *b).unwrap_or(false)))
        .collect::<Vec<_>>()
    }
    None => vec![None; num_bits],
  };

  values
    .into_iter()
    .enumerate()
    .map(|(i, b)| AllocatedBit::alloc(cs.namespace(|| format!("bit {i}")), b))
    .collect()
}
