//! Native arithmetic on twisted Edwards curves `a*x^2 + y^2 = 1 + d*x^2*y^2`.
//!
//! This is the out-of-circuit counterpart of [`crate::gadgets::edwards`]; the
//! gadgets compute their witnesses with it and the tests use it as a reference.

use ff::{Field, PrimeField, PrimeFieldBits};
use rand_core::RngCore;

/// Curve parameters `a` and `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdwardsParams<F: PrimeField> {
  /// Coefficient of `x^2`
  pub a: F,
  /// Coefficient of `x^2 * y^2`
  pub d: F,
}

impl<F: PrimeField> EdwardsParams<F> {
  /// Parameters for an arbitrary curve.
  pub fn new(a: F, d: F) -> Self {
    Self { a, d }
  }

  /// Baby Jubjub, defined over the BN254 scalar field.
  pub fn baby_jubjub() -> Self {
    Self::new(F::from(168700), F::from(168696))
  }
}

/// An affine point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdwardsPoint<F: PrimeField> {
  /// The x coordinate
  pub x: F,
  /// The y coordinate
  pub y: F,
}

impl<F: PrimeField> EdwardsPoint<F> {
  /// A point from its coordinates, unchecked.
  pub fn new(x: F, y: F) -> Self {
    Self { x, y }
  }

  /// The neutral element `(0, 1)`.
  pub fn identity() -> Self {
    Self::new(F::ZERO, F::ONE)
  }

  /// Whether the point satisfies the curve equation.
  pub fn is_on_curve(&self, params: &EdwardsParams<F>) -> bool {
    let xx = self.x.square();
    let yy = self.y.square();
    params.a * xx + yy == F::ONE + params.d * xx * yy
  }

  /// Unified addition:
  ///
  /// x3 = (x1*y2 + y1*x2) / (1 + d*x1*x2*y1*y2)
  /// y3 = (y1*y2 - a*x1*x2) / (1 - d*x1*x2*y1*y2)
  ///
  /// Returns `None` when a denominator vanishes, which cannot happen for
  /// points on a complete curve.
  pub fn add(&self, other: &Self, params: &EdwardsParams<F>) -> Option<Self> {
    let x1x2 = self.x * other.x;
    let y1y2 = self.y * other.y;
    let tau = params.d * x1x2 * y1y2;

    let x_den: Option<F> = (F::ONE + tau).invert().into();
    let y_den: Option<F> = (F::ONE - tau).invert().into();

    Some(Self::new(
      (self.x * other.y + self.y * other.x) * x_den?,
      (y1y2 - params.a * x1x2) * y_den?,
    ))
  }

  /// `self + self`.
  pub fn double(&self, params: &EdwardsParams<F>) -> Option<Self> {
    self.add(self, params)
  }

  /// Multiplies by the scalar whose little-endian bits are given.
  pub fn mul_bits_le(&self, bits: &[bool], params: &EdwardsParams<F>) -> Option<Self> {
    let mut acc = Self::identity();
    let mut pow = *self;
    for (i, bit) in bits.iter().enumerate() {
      if *bit {
        acc = acc.add(&pow, params)?;
      }
      if i + 1 < bits.len() {
        pow = pow.double(params)?;
      }
    }
    Some(acc)
  }

  /// Multiplies by the integer value of `scalar`.
  pub fn mul(&self, scalar: &F, params: &EdwardsParams<F>) -> Option<Self>
  where
    F: PrimeFieldBits,
  {
    let bits: Vec<bool> = scalar.to_le_bits().iter().map(|b| *b).collect();
    self.mul_bits_le(&bits, params)
  }

  /// Samples a random point by picking `x` and solving for `y`.
  pub fn random_vartime(params: &EdwardsParams<F>, mut rng: impl RngCore) -> Self {
    loop {
      let x = F::random(&mut rng);
      let xx = x.square();
      // y^2 = (1 - a*x^2) / (1 - d*x^2)
      let den: Option<F> = (F::ONE - params.d * xx).invert().into();
      let Some(den) = den else {
        continue;
      };
      let y: Option<F> = ((F::ONE - params.a * xx) * den).sqrt().into();
      if let Some(y) = y {
        return Self::new(x, y);
      }
    }
  }
}
