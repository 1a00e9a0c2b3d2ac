//! This module defines errors returned by the library.
use std::path::PathBuf;

use crate::frontend::SynthesisError;
use thiserror::Error;

/// Errors returned while reading, evaluating or compiling an arithmetic circuit
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
  /// returned if a circuit or inputs file cannot be read
  #[error("cannot read {}: {source}", path.display())]
  Io {
    /// The file that failed
    path: PathBuf,
    /// The underlying I/O error
    source: std::io::Error,
  },
  /// returned if the first line is not `total <n>`
  #[error("line {line}: expected `total <number of wires>`")]
  Header {
    /// Line of the offending header
    line: usize,
  },
  /// returned if a line is neither a declaration nor a gate
  #[error("line {line}: {message}")]
  Syntax {
    /// Line of the error
    line: usize,
    /// What the parser expected
    message: String,
  },
  /// returned if a gate names an operation that does not exist
  #[error("line {line}: unknown operation `{name}`")]
  UnknownOpcode {
    /// Line of the gate
    line: usize,
    /// The operation as written
    name: String,
  },
  /// returned if a constant in a `const-mul` operation is not a valid hex field element
  #[error("line {line}: invalid constant `{text}`")]
  InvalidConstant {
    /// Line of the gate
    line: usize,
    /// The constant as written
    text: String,
  },
  /// returned if a gate's declared wire count differs from the number of wires listed
  #[error("line {line}: {port} declares {declared} wires but lists {actual}")]
  ArityMismatch {
    /// Line of the gate
    line: usize,
    /// `in` or `out`
    port: &'static str,
    /// The count written before the list
    declared: usize,
    /// The number of wires in the list
    actual: usize,
  },
  /// returned if a gate has the wrong number of wires for its operation
  #[error("line {line}: `{opcode}` expects {expected} {port} wires, got {actual}")]
  OpcodeArity {
    /// Line of the gate
    line: usize,
    /// The operation
    opcode: String,
    /// `in` or `out`
    port: &'static str,
    /// What the operation accepts
    expected: &'static str,
    /// The number of wires given
    actual: usize,
  },
  /// returned if a wire id is not below the declared total
  #[error("line {line}: wire {wire} is out of range (total {total})")]
  WireOutOfRange {
    /// Line of the reference
    line: usize,
    /// The wire id
    wire: usize,
    /// The declared number of wires
    total: usize,
  },
  /// returned if a wire is used before any declaration or gate defines it
  #[error("line {line}: wire {wire} is used before it is defined")]
  UndefinedWire {
    /// Line of the use
    line: usize,
    /// The wire id
    wire: usize,
  },
  /// returned if a wire is defined twice
  #[error("line {line}: wire {wire} is already defined")]
  WireRedefined {
    /// Line of the second definition
    line: usize,
    /// The wire id
    wire: usize,
  },
  /// returned if a line of the inputs file is not `<wire> <hex>`
  #[error("inputs line {line}: {message}")]
  InputSyntax {
    /// Line in the inputs file
    line: usize,
    /// What is wrong with it
    message: String,
  },
  /// returned if the inputs file assigns a wire outside the circuit
  #[error("inputs line {line}: wire {wire} is out of range (total {total})")]
  InputOutOfRange {
    /// Line in the inputs file
    line: usize,
    /// The wire id
    wire: usize,
    /// The declared number of wires
    total: usize,
  },
  /// returned when error during synthesis
  #[error("synthesis failed: {0}")]
  Synthesis(#[from] SynthesisError),
  /// returned if the completed witness does not satisfy the constraint system
  #[error("constraint `{constraint}` is not satisfied")]
  Unsatisfied {
    /// Namespace path of the first failing constraint
    constraint: String,
  },
}
