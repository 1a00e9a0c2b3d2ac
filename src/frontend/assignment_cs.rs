//! A constraint system that keeps both the constraints and a concrete assignment.
//!
//! Every variable receives a value when it is allocated; values can be
//! overwritten afterwards with [`AssignmentCS::set_witness`], which is how
//! witnesses that are only known once the whole circuit has been laid out get
//! filled in.

use std::collections::HashSet;

use ff::PrimeField;
use tracing::warn;

use crate::frontend::{ConstraintSystem, Index, LinearCombination, SynthesisError, Variable};

/// A single rank-1 constraint `a * b = c` together with its namespace path.
#[derive(Clone, Debug)]
pub struct Constraint<Scalar: PrimeField> {
  /// Left factor
  pub a: LinearCombination<Scalar>,
  /// Right factor
  pub b: LinearCombination<Scalar>,
  /// Product
  pub c: LinearCombination<Scalar>,
  /// Full namespace path of the constraint
  pub annotation: String,
}

impl<Scalar: PrimeField> Constraint<Scalar> {
  fn is_satisfied(&self, inputs: &[Scalar], aux: &[Scalar]) -> bool {
    eval_lc(&self.a, inputs, aux) * eval_lc(&self.b, inputs, aux) == eval_lc(&self.c, inputs, aux)
  }
}

fn eval_lc<Scalar: PrimeField>(lc: &LinearCombination<Scalar>, inputs: &[Scalar], aux: &[Scalar]) -> Scalar {
  lc.iter().fold(Scalar::ZERO, |acc, (var, coeff)| {
    let value = match var.get_unchecked() {
      Index::Input(i) => inputs[i],
      Index::Aux(i) => aux[i],
    };
    acc + value * coeff
  })
}

/// Constraint system with a witness assignment attached.
#[derive(Debug)]
pub struct AssignmentCS<Scalar: PrimeField> {
  paths: HashSet<String>,
  current_namespace: Vec<String>,
  constraints: Vec<Constraint<Scalar>>,
  inputs: Vec<Scalar>,
  input_names: Vec<String>,
  aux: Vec<Scalar>,
  aux_names: Vec<String>,
}

impl<Scalar: PrimeField> Default for AssignmentCS<Scalar> {
  fn default() -> Self {
    let mut paths = HashSet::new();
    paths.insert("ONE".to_string());

    AssignmentCS {
      paths,
      current_namespace: vec![],
      constraints: vec![],
      inputs: vec![Scalar::ONE],
      input_names: vec!["ONE".to_string()],
      aux: vec![],
      aux_names: vec![],
    }
  }
}

impl<Scalar: PrimeField> AssignmentCS<Scalar> {
  /// Create an empty constraint system holding only the one-variable.
  pub fn new() -> Self {
    Default::default()
  }

  /// Number of public variables, including the one-variable.
  pub fn num_inputs(&self) -> usize {
    self.inputs.len()
  }

  /// Number of private variables.
  pub fn num_aux(&self) -> usize {
    self.aux.len()
  }

  /// Get the number of constraints
  pub fn num_constraints(&self) -> usize {
    self.constraints.len()
  }

  /// The constraints in the order they were enforced.
  pub fn constraints(&self) -> &[Constraint<Scalar>] {
    &self.constraints
  }

  /// The annotation path a variable was allocated under.
  pub fn name(&self, var: Variable) -> &str {
    match var.get_unchecked() {
      Index::Input(i) => &self.input_names[i],
      Index::Aux(i) => &self.aux_names[i],
    }
  }

  /// Current assignment of `var`.
  pub fn witness(&self, var: Variable) -> Scalar {
    match var.get_unchecked() {
      Index::Input(i) => self.inputs[i],
      Index::Aux(i) => self.aux[i],
    }
  }

  /// Overwrite the assignment of `var`.
  ///
  /// # Panics
  ///
  /// Panics when asked to overwrite the one-variable.
  pub fn set_witness(&mut self, var: Variable, value: Scalar) {
    match var.get_unchecked() {
      Index::Input(0) => panic!("the one-variable cannot be reassigned"),
      Index::Input(i) => self.inputs[i] = value,
      Index::Aux(i) => self.aux[i] = value,
    }
  }

  /// Evaluate a linear combination under the current assignment.
  pub fn eval(&self, lc: &LinearCombination<Scalar>) -> Scalar {
    eval_lc(lc, &self.inputs, &self.aux)
  }

  /// Public part of the assignment, starting with the one-variable.
  pub fn input_assignment(&self) -> &[Scalar] {
    &self.inputs
  }

  /// Private part of the assignment.
  pub fn aux_assignment(&self) -> &[Scalar] {
    &self.aux
  }

  /// Get path which is unsatisfied
  pub fn which_is_unsatisfied(&self) -> Option<&str> {
    self
      .constraints
      .iter()
      .find(|constraint| !constraint.is_satisfied(&self.inputs, &self.aux))
      .map(|constraint| constraint.annotation.as_str())
  }

  /// Check if the constraint system is satisfied.
  pub fn is_satisfied(&self) -> bool {
    match self.which_is_unsatisfied() {
      Some(path) => {
        warn!(constraint = path, "constraint not satisfied");
        false
      }
      None => true,
    }
  }

  fn register_path(&mut self, path: &str) {
    assert!(
      self.paths.insert(path.to_string()),
      "tried to create object at existing path: {path}"
    );
  }
}

fn compute_path(ns: &[String], this: &str) -> String {
  assert!(!this.contains('/'), "'/' is not allowed in names");

  if ns.is_empty() {
    return this.to_string();
  }

  format!("{}/{this}", ns.join("/"))
}

impl<Scalar: PrimeField> ConstraintSystem<Scalar> for AssignmentCS<Scalar> {
  type Root = Self;

  fn alloc<F, A, AR>(&mut self, annotation: A, f: F) -> Result<Variable, SynthesisError>
  where
    F: FnOnce() -> Result<Scalar, SynthesisError>,
    A: FnOnce() -> AR,
    AR: Into<String>,
  {
    let path = compute_path(&self.current_namespace, &annotation().into());
    let value = f()?;
    self.register_path(&path);

    self.aux.push(value);
    self.aux_names.push(path);
    Ok(Variable::new_unchecked(Index::Aux(self.aux.len() - 1)))
  }

  fn alloc_input<F, A, AR>(&mut self, annotation: A, f: F) -> Result<Variable, SynthesisError>
  where
    F: FnOnce() -> Result<Scalar, SynthesisError>,
    A: FnOnce() -> AR,
    AR: Into<String>,
  {
    let path = compute_path(&self.current_namespace, &annotation().into());
    let value = f()?;
    self.register_path(&path);

    self.inputs.push(value);
    self.input_names.push(path);
    Ok(Variable::new_unchecked(Index::Input(self.inputs.len() - 1)))
  }

  fn enforce<A, AR, LA, LB, LC>(&mut self, annotation: A, a: LA, b: LB, c: LC)
  where
    A: FnOnce() -> AR,
    AR: Into<String>,
    LA: FnOnce(LinearCombination<Scalar>) -> LinearCombination<Scalar>,
    LB: FnOnce(LinearCombination<Scalar>) -> LinearCombination<Scalar>,
    LC: FnOnce(LinearCombination<Scalar>) -> LinearCombination<Scalar>,
  {
    let path = compute_path(&self.current_namespace, &annotation().into());
    self.register_path(&path);

    self.constraints.push(Constraint {
      a: a(LinearCombination::zero()),
      b: b(LinearCombination::zero()),
      c: c(LinearCombination::zero()),
      annotation: path,
    });
  }

  fn push_namespace<NR, N>(&mut self, name_fn: N)
  where
    NR: Into<String>,
    N: FnOnce() -> NR,
  {
    let name = name_fn().into();
    let path = compute_path(&self.current_namespace, &name);
    self.register_path(&path);
    self.current_namespace.push(name);
  }

  fn pop_namespace(&mut self) {
    assert!(self.current_namespace.pop().is_some());
  }

  fn get_root(&mut self) -> &mut Self::Root {
    self
  }
}
