//! A compiler for Pinocchio arithmetic circuits (`.arith`).
//!
//! [`CircuitReader`] runs the whole pipeline: the circuit is parsed once,
//! evaluated on the inputs, translated into constraints, and the evaluated
//! wire values are then written into the constraint system as its witness.
use std::{fs, path::Path};

use ff::{Field, PrimeFieldBits};
use tracing::{info, info_span, warn};

use crate::{errors::CircuitError, frontend::AssignmentCS};

pub mod eval;
pub mod program;
pub mod synthesize;

pub use eval::evaluate;
pub use program::{parse_inputs, ArithCircuit, DeclKind, Declaration, Gate, Opcode, Statement, Wire};
pub use synthesize::{synthesize, WireBindings, ZeroCheck};

/// A compiled circuit together with its constraint system.
#[derive(Debug)]
pub struct CircuitReader<F: PrimeFieldBits> {
  circuit: ArithCircuit<F>,
  cs: AssignmentCS<F>,
  bindings: WireBindings<F>,
  values: Option<Vec<F>>,
}

impl<F: PrimeFieldBits> CircuitReader<F> {
  /// Compiles a circuit from its text.
  ///
  /// With `inputs`, the circuit is also evaluated, the witness is assigned and
  /// the constraint system must be satisfied. Without, only the constraints
  /// are produced and every variable holds zero.
  pub fn compile(circuit: &str, inputs: Option<&str>) -> Result<Self, CircuitError> {
    let circuit = {
      let _span = info_span!("parse circuit").entered();
      ArithCircuit::parse(circuit)?
    };

    let values = inputs
      .map(|text| {
        let _span = info_span!("evaluate").entered();
        let inputs = parse_inputs(text, circuit.num_wires())?;
        Ok::<_, CircuitError>(evaluate(&circuit, &inputs))
      })
      .transpose()?;

    let mut cs = AssignmentCS::new();
    let bindings = {
      let _span = info_span!("translate constraints").entered();
      synthesize(&circuit, &mut cs)?
    };

    if let Some(values) = &values {
      let _span = info_span!("assign values").entered();
      assign_values(&mut cs, &bindings, values)?;
    }

    info!(
      wires = circuit.num_wires(),
      constraints = cs.num_constraints(),
      inputs = cs.num_inputs() - 1,
      aux = cs.num_aux(),
      "compiled circuit"
    );

    Ok(CircuitReader {
      circuit,
      cs,
      bindings,
      values,
    })
  }

  /// Reads and compiles a circuit file and, optionally, its inputs file.
  pub fn from_files(circuit: &Path, inputs: Option<&Path>) -> Result<Self, CircuitError> {
    let circuit_text = read(circuit)?;
    let inputs_text = inputs.map(read).transpose()?;
    Self::compile(&circuit_text, inputs_text.as_deref())
  }

  /// The parsed circuit.
  pub fn circuit(&self) -> &ArithCircuit<F> {
    &self.circuit
  }

  /// The constraint system, with its witness when inputs were given.
  pub fn cs(&self) -> &AssignmentCS<F> {
    &self.cs
  }

  /// How wires map onto variables.
  pub fn bindings(&self) -> &WireBindings<F> {
    &self.bindings
  }

  /// Get the number of constraints
  pub fn num_constraints(&self) -> usize {
    self.cs.num_constraints()
  }

  /// The evaluated value of `wire`, when inputs were given and the circuit
  /// mentions the wire.
  pub fn wire_value(&self, wire: Wire) -> Option<F> {
    self.values.as_ref()?.get(wire).copied()
  }

  /// Values of the declared outputs, in declaration order.
  pub fn output_values(&self) -> Vec<(Wire, F)> {
    self
      .bindings
      .outputs()
      .iter()
      .map(|(wire, var)| (*wire, self.cs.witness(*var)))
      .collect()
  }
}

fn read(path: &Path) -> Result<String, CircuitError> {
  fs::read_to_string(path).map_err(|source| CircuitError::Io {
    path: path.to_path_buf(),
    source,
  })
}

/// Writes the evaluated wire values into `cs`, resolves the deferred `zerop`
/// inverses and checks the result.
fn assign_values<F: PrimeFieldBits>(
  cs: &mut AssignmentCS<F>,
  bindings: &WireBindings<F>,
  values: &[F],
) -> Result<(), CircuitError> {
  for (wire, var) in bindings.variables() {
    cs.set_witness(var, values[wire]);
  }
  for (wire, var) in bindings.outputs() {
    cs.set_witness(*var, values[*wire]);
  }

  for check in bindings.zero_checks() {
    let x = cs.eval(bindings.wire_lc(check.input)?);
    let m = Option::<F>::from(x.invert()).unwrap_or(F::ZERO);
    cs.set_witness(check.aux, m);
  }

  if let Some(constraint) = cs.which_is_unsatisfied() {
    warn!(constraint, "constraint not satisfied");
    return Err(CircuitError::Unsatisfied {
      constraint: constraint.to_string(),
    });
  }
  Ok(())
}
