//! Twisted Edwards point gadgets.
//!
//! Points are affine `(x, y)` pairs of [`AllocatedNum`]s on a curve
//! `a*x^2 + y^2 = 1 + d*x^2*y^2`. Every gadget allocates fresh output
//! coordinates and computes their witness from the operands' values.
use ff::{Field, PrimeField};

use crate::{
  edwards::{EdwardsParams, EdwardsPoint},
  frontend::{
    alloc_constant, AllocatedBit, AllocatedNum, Assignment, ConstraintSystem, SynthesisError,
  },
};

/// Which constraint encoding to use for point addition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdditionLaw {
  /// Every product of the addition law as its own variable, followed by a
  /// curve-membership check of the result.
  #[default]
  Checked,
  /// Addition alone, seven constraints.
  Fast,
}

/// A point on a twisted Edwards curve, allocated in a constraint system.
#[derive(Debug, Clone)]
pub struct AllocatedPoint<F: PrimeField> {
  pub(crate) x: AllocatedNum<F>,
  pub(crate) y: AllocatedNum<F>,
}

impl<F: PrimeField> AllocatedPoint<F> {
  /// Wraps already allocated coordinates.
  pub fn new(x: AllocatedNum<F>, y: AllocatedNum<F>) -> Self {
    Self { x, y }
  }

  /// Allocates both coordinates as private variables.
  pub fn alloc<CS: ConstraintSystem<F>>(
    mut cs: CS,
    value: Option<EdwardsPoint<F>>,
  ) -> Result<Self, SynthesisError> {
    let x = AllocatedNum::alloc(cs.namespace(|| "x"), || Ok(value.get()?.x))?;
    let y = AllocatedNum::alloc(cs.namespace(|| "y"), || Ok(value.get()?.y))?;
    Ok(Self::new(x, y))
  }

  /// The neutral element `(0, 1)`, pinned by equality constraints.
  pub fn identity<CS: ConstraintSystem<F>>(mut cs: CS) -> Result<Self, SynthesisError> {
    let x = alloc_constant(cs.namespace(|| "x"), F::ZERO)?;
    let y = alloc_constant(cs.namespace(|| "y"), F::ONE)?;
    Ok(Self::new(x, y))
  }

  /// The x coordinate
  pub fn x(&self) -> &AllocatedNum<F> {
    &self.x
  }

  /// The y coordinate
  pub fn y(&self) -> &AllocatedNum<F> {
    &self.y
  }

  /// The point's value, if both coordinates are known.
  pub fn get_value(&self) -> Option<EdwardsPoint<F>> {
    Some(EdwardsPoint::new(self.x.get_value()?, self.y.get_value()?))
  }

  /// Constrains the point to satisfy `a*x^2 + y^2 = 1 + d*x^2*y^2`.
  ///
  /// Uses five constraints. An off-curve witness does not fail here; it
  /// leaves the last constraint unsatisfied.
  pub fn enforce_on_curve<CS: ConstraintSystem<F>>(
    &self,
    mut cs: CS,
    params: &EdwardsParams<F>,
  ) -> Result<(), SynthesisError> {
    let xx = self.x.square(cs.namespace(|| "x^2"))?;
    let yy = self.y.square(cs.namespace(|| "y^2"))?;

    let dxxyy = AllocatedNum::alloc(cs.namespace(|| "d * x^2 * y^2"), || {
      Ok(params.d * xx.get_value().get()? * yy.get_value().get()?)
    })?;
    cs.enforce(
      || "d * x^2 * y^2 is correct",
      |lc| lc + (params.d, xx.get_variable()),
      |lc| lc + yy.get_variable(),
      |lc| lc + dxxyy.get_variable(),
    );

    let lhs = AllocatedNum::alloc(cs.namespace(|| "a * x^2 + y^2"), || {
      Ok(params.a * xx.get_value().get()? + yy.get_value().get()?)
    })?;
    cs.enforce(
      || "a * x^2 + y^2 is correct",
      |lc| lc + (params.a, xx.get_variable()) + yy.get_variable(),
      |lc| lc + CS::one(),
      |lc| lc + lhs.get_variable(),
    );

    cs.enforce(
      || "curve equation",
      |lc| lc + lhs.get_variable(),
      |lc| lc + CS::one(),
      |lc| lc + CS::one() + dxxyy.get_variable(),
    );

    Ok(())
  }

  /// `self + other`, with every product of the addition law materialised
  /// and the result checked to lie on the curve.
  ///
  /// Fourteen constraints: nine for the law itself and five for the closure
  /// check.
  pub fn add<CS: ConstraintSystem<F>>(
    &self,
    mut cs: CS,
    other: &Self,
    params: &EdwardsParams<F>,
  ) -> Result<Self, SynthesisError> {
    let x1x2 = self.x.mul(cs.namespace(|| "x1x2"), &other.x)?;
    let x1y2 = self.x.mul(cs.namespace(|| "x1y2"), &other.y)?;
    let y1y2 = self.y.mul(cs.namespace(|| "y1y2"), &other.y)?;
    let y1x2 = self.y.mul(cs.namespace(|| "y1x2"), &other.x)?;
    let x1x2y1y2 = x1x2.mul(cs.namespace(|| "x1x2y1y2"), &y1y2)?;

    let dx1x2y1y2 = AllocatedNum::alloc(cs.namespace(|| "dx1x2y1y2"), || {
      Ok(params.d * x1x2y1y2.get_value().get()?)
    })?;
    cs.enforce(
      || "dx1x2y1y2 is correct",
      |lc| lc + (params.d, x1x2y1y2.get_variable()),
      |lc| lc + CS::one(),
      |lc| lc + dx1x2y1y2.get_variable(),
    );

    let ax1x2 = AllocatedNum::alloc(cs.namespace(|| "ax1x2"), || {
      Ok(params.a * x1x2.get_value().get()?)
    })?;
    cs.enforce(
      || "ax1x2 is correct",
      |lc| lc + (params.a, x1x2.get_variable()),
      |lc| lc + CS::one(),
      |lc| lc + ax1x2.get_variable(),
    );

    let x = AllocatedNum::alloc(cs.namespace(|| "x3"), || {
      let den = F::ONE + dx1x2y1y2.get_value().get()?;
      let inv = Option::<F>::from(den.invert()).ok_or(SynthesisError::DivisionByZero)?;
      Ok((*x1y2.get_value().get()? + y1x2.get_value().get()?) * inv)
    })?;
    cs.enforce(
      || "x3 * (1 + dx1x2y1y2) = x1y2 + y1x2",
      |lc| lc + x.get_variable(),
      |lc| lc + CS::one() + dx1x2y1y2.get_variable(),
      |lc| lc + x1y2.get_variable() + y1x2.get_variable(),
    );

    let y = AllocatedNum::alloc(cs.namespace(|| "y3"), || {
      let den = F::ONE - dx1x2y1y2.get_value().get()?;
      let inv = Option::<F>::from(den.invert()).ok_or(SynthesisError::DivisionByZero)?;
      Ok((*y1y2.get_value().get()? - ax1x2.get_value().get()?) * inv)
    })?;
    cs.enforce(
      || "y3 * (1 - dx1x2y1y2) = y1y2 - ax1x2",
      |lc| lc + y.get_variable(),
      |lc| lc + CS::one() - dx1x2y1y2.get_variable(),
      |lc| lc + y1y2.get_variable() - ax1x2.get_variable(),
    );

    let sum = Self::new(x, y);
    sum.enforce_on_curve(cs.namespace(|| "closure"), params)?;
    Ok(sum)
  }

  /// `self + other` using the unified addition law directly:
  ///
  /// x3 * (1 + d*tau) = x1*y2 + y1*x2
  /// y3 * (1 - d*tau) = y1*y2 - a*x1*x2
  ///
  /// where `tau = x1*x2*y1*y2`.
  pub fn add_fast<CS: ConstraintSystem<F>>(
    &self,
    mut cs: CS,
    other: &Self,
    params: &EdwardsParams<F>,
  ) -> Result<Self, SynthesisError> {
    let beta = self.x.mul(cs.namespace(|| "x1 * y2"), &other.y)?;
    let gamma = self.y.mul(cs.namespace(|| "y1 * x2"), &other.x)?;
    let delta = self.y.mul(cs.namespace(|| "y1 * y2"), &other.y)?;
    let epsilon = self.x.mul(cs.namespace(|| "x1 * x2"), &other.x)?;
    let tau = delta.mul(cs.namespace(|| "tau"), &epsilon)?;

    let x = AllocatedNum::alloc(cs.namespace(|| "x3"), || {
      let den = F::ONE + params.d * tau.get_value().get()?;
      let inv = Option::<F>::from(den.invert()).ok_or(SynthesisError::DivisionByZero)?;
      Ok((*beta.get_value().get()? + gamma.get_value().get()?) * inv)
    })?;
    cs.enforce(
      || "x3 is correct",
      |lc| lc + x.get_variable(),
      |lc| lc + CS::one() + (params.d, tau.get_variable()),
      |lc| lc + beta.get_variable() + gamma.get_variable(),
    );

    let y = AllocatedNum::alloc(cs.namespace(|| "y3"), || {
      let den = F::ONE - params.d * tau.get_value().get()?;
      let inv = Option::<F>::from(den.invert()).ok_or(SynthesisError::DivisionByZero)?;
      Ok((*delta.get_value().get()? - params.a * epsilon.get_value().get()?) * inv)
    })?;
    cs.enforce(
      || "y3 is correct",
      |lc| lc + y.get_variable(),
      |lc| lc + CS::one() - (params.d, tau.get_variable()),
      |lc| lc + delta.get_variable() - (params.a, epsilon.get_variable()),
    );

    Ok(Self::new(x, y))
  }

  /// Addition with the selected encoding.
  pub fn add_with<CS: ConstraintSystem<F>>(
    &self,
    cs: CS,
    other: &Self,
    params: &EdwardsParams<F>,
    law: AdditionLaw,
  ) -> Result<Self, SynthesisError> {
    match law {
      AdditionLaw::Checked => self.add(cs, other, params),
      AdditionLaw::Fast => self.add_fast(cs, other, params),
    }
  }

  /// `self + other` if `condition` is set, `self` otherwise.
  ///
  /// `other` is blended with the identity before a regular addition, so the
  /// constraints are the same for both values of the condition.
  pub fn conditionally_add<CS: ConstraintSystem<F>>(
    &self,
    mut cs: CS,
    other: &Self,
    condition: &AllocatedBit,
    params: &EdwardsParams<F>,
    law: AdditionLaw,
  ) -> Result<Self, SynthesisError> {
    let c = condition.get_variable();
    let flag = || -> Result<F, SynthesisError> {
      Ok(if *condition.get_value().get()? {
        F::ONE
      } else {
        F::ZERO
      })
    };

    let x_to_add = AllocatedNum::alloc(cs.namespace(|| "x to add"), || {
      Ok(flag()? * other.x.get_value().get()?)
    })?;
    cs.enforce(
      || "x to add is correct",
      |lc| lc + c,
      |lc| lc + other.x.get_variable(),
      |lc| lc + x_to_add.get_variable(),
    );

    let y_blend = AllocatedNum::alloc(cs.namespace(|| "y blend"), || {
      Ok(flag()? * other.y.get_value().get()?)
    })?;
    cs.enforce(
      || "y blend is correct",
      |lc| lc + c,
      |lc| lc + other.y.get_variable(),
      |lc| lc + y_blend.get_variable(),
    );

    // y_to_add = c * y2 + (1 - c)
    let y_to_add = AllocatedNum::alloc(cs.namespace(|| "y to add"), || {
      Ok(*y_blend.get_value().get()? + F::ONE - flag()?)
    })?;
    cs.enforce(
      || "y to add is correct",
      |lc| lc + y_blend.get_variable() + CS::one() - c,
      |lc| lc + CS::one(),
      |lc| lc + y_to_add.get_variable(),
    );

    let to_add = Self::new(x_to_add, y_to_add);
    self.add_with(cs.namespace(|| "add"), &to_add, params, law)
  }

  /// `k * self`, where `bits` are the little-endian bits of `k`.
  ///
  /// Walks the bits from the least significant one, adding the running power
  /// `2^i * self` into the accumulator when bit `i` is set. The constraint
  /// count depends only on `bits.len()`.
  pub fn scalar_mul<CS: ConstraintSystem<F>>(
    &self,
    mut cs: CS,
    bits: &[AllocatedBit],
    params: &EdwardsParams<F>,
    law: AdditionLaw,
  ) -> Result<Self, SynthesisError> {
    let mut acc = Self::identity(cs.namespace(|| "identity"))?;
    let mut pow = self.clone();

    for (i, bit) in bits.iter().enumerate() {
      acc = acc.conditionally_add(
        cs.namespace(|| format!("{i}: conditional add")),
        &pow,
        bit,
        params,
        law,
      )?;

      if i + 1 < bits.len() {
        pow = pow.add_with(cs.namespace(|| format!("{i}: double")), &pow, params, law)?;
      }
    }

    Ok(acc)
  }
}
