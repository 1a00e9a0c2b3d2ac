//! Translation of a circuit into rank-1 constraints.
//!
//! Linear gates (`add`, `const-mul`, `const-mul-neg`) allocate nothing; their
//! output wire is bound to a linear combination over earlier variables. Every
//! other gate allocates its outputs and emits its constraints inside a
//! namespace named after the gate's line, so an unsatisfied constraint points
//! back at the file.
use std::collections::HashMap;

use ff::{Field, PrimeFieldBits};
use tracing::{debug, instrument};

use super::program::{ArithCircuit, DeclKind, Gate, Opcode, Statement, Wire};
use crate::frontend::{Circuit, ConstraintSystem, LinearCombination, SynthesisError, Variable};

/// A `zerop` auxiliary whose value is only known once the input wire is.
#[derive(Clone, Copy, Debug)]
pub struct ZeroCheck {
  /// The wire being tested against zero
  pub input: Wire,
  /// The variable that must hold the input's inverse, or zero
  pub aux: Variable,
}

/// How the wires of a circuit map onto a constraint system.
#[derive(Clone, Debug, Default)]
pub struct WireBindings<F: PrimeFieldBits> {
  variables: HashMap<Wire, Variable>,
  lcs: HashMap<Wire, LinearCombination<F>>,
  outputs: Vec<(Wire, Variable)>,
  zero_checks: Vec<ZeroCheck>,
}

impl<F: PrimeFieldBits> WireBindings<F> {
  /// The variable allocated for `wire`, if the wire has one of its own.
  pub fn variable(&self, wire: Wire) -> Option<Variable> {
    self.variables.get(&wire).copied()
  }

  /// All wires that own a variable.
  pub fn variables(&self) -> impl Iterator<Item = (Wire, Variable)> + '_ {
    self.variables.iter().map(|(w, v)| (*w, *v))
  }

  /// The linear combination that carries `wire`, or `AssignmentMissing` when
  /// nothing has bound it yet.
  pub fn wire_lc(&self, wire: Wire) -> Result<&LinearCombination<F>, SynthesisError> {
    self.lcs.get(&wire).ok_or(SynthesisError::AssignmentMissing)
  }

  /// Public output variables with the wire each one mirrors, in declaration order.
  pub fn outputs(&self) -> &[(Wire, Variable)] {
    &self.outputs
  }

  /// Deferred `zerop` auxiliaries, in gate order.
  pub fn zero_checks(&self) -> &[ZeroCheck] {
    &self.zero_checks
  }

  fn bind_variable(&mut self, wire: Wire, var: Variable) {
    self.variables.insert(wire, var);
    self.lcs.insert(wire, LinearCombination::zero() + var);
  }

  fn bind_lc(&mut self, wire: Wire, lc: LinearCombination<F>) {
    self.lcs.insert(wire, lc);
  }
}

/// Emits the constraints of `circuit` into `cs`.
///
/// Allocated variables get a zero placeholder; the real witness is written
/// afterwards from the evaluated wire values.
#[instrument(skip_all, name = "reader::synthesize")]
pub fn synthesize<F, CS>(
  circuit: &ArithCircuit<F>,
  cs: &mut CS,
) -> Result<WireBindings<F>, SynthesisError>
where
  F: PrimeFieldBits,
  CS: ConstraintSystem<F>,
{
  let mut bindings = WireBindings::default();
  let mut outputs = Vec::new();

  for statement in circuit.statements() {
    match statement {
      Statement::Declaration(decl) => match decl.kind {
        DeclKind::Input => {
          let var = cs.alloc_input(|| format!("input {}", decl.wire), || Ok(F::ZERO))?;
          bindings.bind_variable(decl.wire, var);
        }
        DeclKind::NizkInput => {
          let var = cs.alloc(|| format!("nizkinput {}", decl.wire), || Ok(F::ZERO))?;
          bindings.bind_variable(decl.wire, var);
        }
        DeclKind::Output => outputs.push(decl),
      },
      Statement::Gate(gate) => {
        let mut cs = cs.namespace(|| format!("line {} {}", gate.line, gate.opcode));
        synthesize_gate(&mut cs, gate, &mut bindings)?;
      }
    }
  }

  // outputs are bound last so they may be declared ahead of the gate that computes them
  for decl in outputs {
    let mut cs = cs.namespace(|| format!("line {} output", decl.line));
    let out = cs.alloc_input(|| format!("output {}", decl.wire), || Ok(F::ZERO))?;
    let lc = bindings.wire_lc(decl.wire)?;
    cs.enforce(
      || "output binding",
      |z| z + out,
      |z| z + CS::one(),
      |z| z + lc,
    );
    bindings.outputs.push((decl.wire, out));
  }

  debug!(
    num_variables = bindings.variables.len(),
    num_zero_checks = bindings.zero_checks.len(),
    "translated constraints"
  );
  Ok(bindings)
}

fn synthesize_gate<F, CS>(
  cs: &mut CS,
  gate: &Gate<F>,
  bindings: &mut WireBindings<F>,
) -> Result<(), SynthesisError>
where
  F: PrimeFieldBits,
  CS: ConstraintSystem<F>,
{
  let input = |i: usize| bindings.wire_lc(gate.inputs[i]).cloned();

  match &gate.opcode {
    Opcode::Add => {
      let mut sum = LinearCombination::zero();
      for wire in &gate.inputs {
        sum = sum + bindings.wire_lc(*wire)?;
      }
      bindings.bind_lc(gate.outputs[0], sum);
    }
    Opcode::ConstMul(c) => {
      let scaled = LinearCombination::zero() + (*c, &input(0)?);
      bindings.bind_lc(gate.outputs[0], scaled);
    }
    Opcode::ConstMulNeg(c) => {
      let scaled = LinearCombination::zero() - (*c, &input(0)?);
      bindings.bind_lc(gate.outputs[0], scaled);
    }
    Opcode::Mul => {
      let (l1, l2) = (input(0)?, input(1)?);
      let out = cs.alloc(|| "out", || Ok(F::ZERO))?;
      cs.enforce(|| "l1 * l2 = out", |z| z + &l1, |z| z + &l2, |z| z + out);
      bindings.bind_variable(gate.outputs[0], out);
    }
    Opcode::Xor => {
      let (l1, l2) = (input(0)?, input(1)?);
      let out = cs.alloc(|| "out", || Ok(F::ZERO))?;
      // a xor b = a + b - 2ab
      cs.enforce(
        || "2 * l1 * l2 = l1 + l2 - out",
        |z| z + (F::ONE.double(), &l1),
        |z| z + &l2,
        |z| z + &l1 + &l2 - out,
      );
      bindings.bind_variable(gate.outputs[0], out);
    }
    Opcode::Or => {
      let (l1, l2) = (input(0)?, input(1)?);
      let out = cs.alloc(|| "out", || Ok(F::ZERO))?;
      // a or b = a + b - ab
      cs.enforce(
        || "l1 * l2 = l1 + l2 - out",
        |z| z + &l1,
        |z| z + &l2,
        |z| z + &l1 + &l2 - out,
      );
      bindings.bind_variable(gate.outputs[0], out);
    }
    Opcode::Assert => {
      let (l1, l2) = (input(0)?, input(1)?);
      let l3 = bindings.wire_lc(gate.outputs[0])?;
      cs.enforce(|| "l1 * l2 = l3", |z| z + &l1, |z| z + &l2, |z| z + l3);
    }
    Opcode::Split => {
      let value = input(0)?;
      let mut sum = LinearCombination::zero();
      let mut two_i = F::ONE;
      for (i, wire) in gate.outputs.iter().enumerate() {
        let bit = cs.alloc(|| format!("bit {i}"), || Ok(F::ZERO))?;
        cs.enforce(
          || format!("bit {i} is boolean"),
          |z| z + CS::one() - bit,
          |z| z + bit,
          |z| z,
        );
        sum = sum + (two_i, bit);
        two_i = two_i.double();
        bindings.bind_variable(*wire, bit);
      }
      cs.enforce(
        || "recomposition",
        |z| z + &value,
        |z| z + CS::one(),
        |z| z + &sum,
      );
    }
    Opcode::Pack => {
      let mut sum = LinearCombination::zero();
      let mut two_i = F::ONE;
      for wire in &gate.inputs {
        sum = sum + (two_i, bindings.wire_lc(*wire)?);
        two_i = two_i.double();
      }
      let out = cs.alloc(|| "out", || Ok(F::ZERO))?;
      cs.enforce(|| "packing", |z| z + out, |z| z + CS::one(), |z| z + &sum);
      bindings.bind_variable(gate.outputs[0], out);
    }
    Opcode::ZeroP => {
      // y = (x != 0), with m = 1/x when x != 0:
      //   x * (1 - y) = 0
      //   x * m = y
      let x = input(0)?;
      let y = cs.alloc(|| "y", || Ok(F::ZERO))?;
      let m = cs.alloc(|| "m", || Ok(F::ZERO))?;
      cs.enforce(
        || "x * (1 - y) = 0",
        |z| z + &x,
        |z| z + CS::one() - y,
        |z| z,
      );
      cs.enforce(|| "x * m = y", |z| z + &x, |z| z + m, |z| z + y);
      bindings.bind_variable(gate.outputs[1], y);
      bindings.bind_variable(gate.outputs[0], m);
      bindings.zero_checks.push(ZeroCheck {
        input: gate.inputs[0],
        aux: m,
      });
    }
  }

  Ok(())
}

impl<F: PrimeFieldBits> Circuit<F> for &ArithCircuit<F> {
  fn synthesize<CS: ConstraintSystem<F>>(self, cs: &mut CS) -> Result<(), SynthesisError> {
    synthesize(self, cs).map(|_| ())
  }
}
