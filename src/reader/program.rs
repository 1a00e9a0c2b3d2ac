//! The arithmetic circuit IR and its parser.
//!
//! A circuit file starts with `total <n>`, the number of wires, followed by
//! one statement per line:
//!
//! ```text
//! input 0                      # public
//! nizkinput 1                  # private
//! mul in 2 <0 1> out 1 <2>
//! output 2
//! ```
//!
//! Everything after a `#` is a comment. Parsing also checks that the file
//! describes a forward-only DAG: every wire is in range, defined once, and
//! defined before it is read.
use std::{collections::HashSet, fmt};

use ff::PrimeField;
use num_bigint::BigUint;
use num_traits::Num;
use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use crate::errors::CircuitError;

#[derive(Parser)]
#[grammar = "reader/arith.pest"]
struct ArithParser;

/// Identifier of a wire, below the circuit's `total`.
pub type Wire = usize;

/// How a declaration exposes its wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
  /// Public input
  Input,
  /// Private (witness) input
  NizkInput,
  /// Public output, bound once the wire has been computed
  Output,
}

/// An `input`, `nizkinput` or `output` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
  /// Kind of declaration
  pub kind: DeclKind,
  /// The declared wire
  pub wire: Wire,
  /// 1-based line in the circuit file
  pub line: usize,
}

/// Number of wires a gate port accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Arity {
  One,
  Two,
  OneOrMore,
}

impl Arity {
  fn accepts(self, n: usize) -> bool {
    match self {
      Arity::One => n == 1,
      Arity::Two => n == 2,
      Arity::OneOrMore => n >= 1,
    }
  }

  fn describe(self) -> &'static str {
    match self {
      Arity::One => "exactly 1",
      Arity::Two => "exactly 2",
      Arity::OneOrMore => "at least 1",
    }
  }
}

/// Gate operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Opcode<F: PrimeField> {
  /// Sum of all inputs
  Add,
  /// Product of two inputs
  Mul,
  /// Boolean xor of two bits
  Xor,
  /// Boolean or of two bits
  Or,
  /// `in0 * in1 = out`, where `out` is an existing wire
  Assert,
  /// `sum in_i * 2^i`
  Pack,
  /// Little-endian bit decomposition
  Split,
  /// Zero test: `outputs[1]` is 1 iff the input is non-zero, `outputs[0]` is
  /// the auxiliary inverse
  ZeroP,
  /// Multiplication by a constant
  ConstMul(F),
  /// Multiplication by the negation of a constant; holds the constant as written
  ConstMulNeg(F),
}

impl<F: PrimeField> Opcode<F> {
  fn parse(name: &str, line: usize) -> Result<Self, CircuitError> {
    let opcode = match name {
      "add" => Opcode::Add,
      "mul" => Opcode::Mul,
      "xor" => Opcode::Xor,
      "or" => Opcode::Or,
      "assert" => Opcode::Assert,
      "pack" => Opcode::Pack,
      "split" => Opcode::Split,
      "zerop" => Opcode::ZeroP,
      _ => {
        if let Some(hex) = name.strip_prefix("const-mul-neg-") {
          Opcode::ConstMulNeg(field_from_hex(hex).ok_or_else(|| CircuitError::InvalidConstant {
            line,
            text: hex.to_string(),
          })?)
        } else if let Some(hex) = name.strip_prefix("const-mul-") {
          Opcode::ConstMul(field_from_hex(hex).ok_or_else(|| CircuitError::InvalidConstant {
            line,
            text: hex.to_string(),
          })?)
        } else {
          return Err(CircuitError::UnknownOpcode {
            line,
            name: name.to_string(),
          });
        }
      }
    };
    Ok(opcode)
  }

  fn arity(&self) -> (Arity, Arity) {
    match self {
      Opcode::Mul | Opcode::Xor | Opcode::Or | Opcode::Assert => (Arity::Two, Arity::One),
      Opcode::ConstMul(_) | Opcode::ConstMulNeg(_) => (Arity::One, Arity::One),
      Opcode::ZeroP => (Arity::One, Arity::Two),
      Opcode::Add | Opcode::Pack => (Arity::OneOrMore, Arity::One),
      Opcode::Split => (Arity::One, Arity::OneOrMore),
    }
  }

  /// The factor applied by `const-mul` and `const-mul-neg`.
  pub fn constant(&self) -> Option<F> {
    match self {
      Opcode::ConstMul(c) => Some(*c),
      Opcode::ConstMulNeg(c) => Some(-*c),
      _ => None,
    }
  }
}

impl<F: PrimeField> fmt::Display for Opcode<F> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Opcode::Add => "add",
      Opcode::Mul => "mul",
      Opcode::Xor => "xor",
      Opcode::Or => "or",
      Opcode::Assert => "assert",
      Opcode::Pack => "pack",
      Opcode::Split => "split",
      Opcode::ZeroP => "zerop",
      Opcode::ConstMul(_) => "const-mul",
      Opcode::ConstMulNeg(_) => "const-mul-neg",
    };
    f.write_str(name)
  }
}

/// A gate line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gate<F: PrimeField> {
  /// The operation
  pub opcode: Opcode<F>,
  /// Wires read by the gate
  pub inputs: Vec<Wire>,
  /// Wires written by the gate; for `assert`, the wire compared against
  pub outputs: Vec<Wire>,
  /// 1-based line in the circuit file
  pub line: usize,
}

/// One line of a circuit, in file order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement<F: PrimeField> {
  /// `input`, `nizkinput` or `output`
  Declaration(Declaration),
  /// Any gate
  Gate(Gate<F>),
}

/// A parsed and validated arithmetic circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArithCircuit<F: PrimeField> {
  num_wires: usize,
  wire_span: usize,
  statements: Vec<Statement<F>>,
}

impl<F: PrimeField> ArithCircuit<F> {
  /// Parses a circuit file.
  pub fn parse(text: &str) -> Result<Self, CircuitError> {
    let mut lines = meaningful_lines(text);

    let (header_line, header) = lines.next().ok_or(CircuitError::Header { line: 1 })?;
    let num_wires = ArithParser::parse(Rule::header, header)
      .ok()
      .and_then(|mut pairs| pairs.next())
      .and_then(|pair| pair.into_inner().next())
      .and_then(|n| n.as_str().parse::<usize>().ok())
      .ok_or(CircuitError::Header { line: header_line })?;

    let mut validator = Validator::new(num_wires);
    let mut statements = Vec::new();
    for (line, content) in lines {
      let statement = parse_statement(content, line)?;
      validator.check(&statement)?;
      statements.push(statement);
    }
    let wire_span = validator.finish()?;

    Ok(ArithCircuit {
      num_wires,
      wire_span,
      statements,
    })
  }

  /// The declared `total`.
  pub fn num_wires(&self) -> usize {
    self.num_wires
  }

  /// One past the highest wire any statement mentions; never more than
  /// [`Self::num_wires`].
  pub fn wire_span(&self) -> usize {
    self.wire_span
  }

  /// All statements in file order.
  pub fn statements(&self) -> &[Statement<F>] {
    &self.statements
  }

  /// All gates in file order.
  pub fn gates(&self) -> impl Iterator<Item = &Gate<F>> + '_ {
    self.statements.iter().filter_map(|s| match s {
      Statement::Gate(gate) => Some(gate),
      Statement::Declaration(_) => None,
    })
  }

  fn declared(&self, kind: DeclKind) -> impl Iterator<Item = Wire> + '_ {
    self.statements.iter().filter_map(move |s| match s {
      Statement::Declaration(d) if d.kind == kind => Some(d.wire),
      _ => None,
    })
  }

  /// Wires declared `input`.
  pub fn inputs(&self) -> Vec<Wire> {
    self.declared(DeclKind::Input).collect()
  }

  /// Wires declared `nizkinput`.
  pub fn nizk_inputs(&self) -> Vec<Wire> {
    self.declared(DeclKind::NizkInput).collect()
  }

  /// Wires declared `output`.
  pub fn outputs(&self) -> Vec<Wire> {
    self.declared(DeclKind::Output).collect()
  }
}

/// Parses an inputs file: one `<wire> <hex value>` pair per line.
pub fn parse_inputs<F: PrimeField>(
  text: &str,
  num_wires: usize,
) -> Result<Vec<(Wire, F)>, CircuitError> {
  meaningful_lines(text)
    .map(|(line, content)| {
      let mut pairs = ArithParser::parse(Rule::assignment, content).map_err(|e| {
        CircuitError::InputSyntax {
          line,
          message: e.variant.message().into_owned(),
        }
      })?;
      let mut inner = pairs
        .next()
        .map(|p| p.into_inner())
        .ok_or_else(|| CircuitError::InputSyntax {
          line,
          message: "empty assignment".to_string(),
        })?;

      let (wire, value) = match (inner.next(), inner.next()) {
        (Some(wire), Some(value)) => (wire.as_str(), value.as_str()),
        _ => {
          return Err(CircuitError::InputSyntax {
            line,
            message: "expected `<wire> <hex value>`".to_string(),
          })
        }
      };
      let wire = wire.parse::<Wire>().map_err(|e| CircuitError::InputSyntax {
        line,
        message: e.to_string(),
      })?;
      if wire >= num_wires {
        return Err(CircuitError::InputOutOfRange {
          line,
          wire,
          total: num_wires,
        });
      }
      let value = field_from_hex(value).ok_or_else(|| CircuitError::InputSyntax {
        line,
        message: format!("invalid value `{value}`"),
      })?;
      Ok((wire, value))
    })
    .collect()
}

/// Reads a hexadecimal integer into the field, reducing it modulo the field order.
pub fn field_from_hex<F: PrimeField>(hex: &str) -> Option<F> {
  let n = BigUint::from_str_radix(hex, 16).ok()?;
  F::from_str_vartime(&n.to_str_radix(10))
}

/// Non-empty lines with comments removed, numbered from 1.
fn meaningful_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
  text.lines().enumerate().filter_map(|(i, line)| {
    let content = line.split('#').next().unwrap_or_default().trim();
    (!content.is_empty()).then_some((i + 1, content))
  })
}

fn parse_number(pair: Pair<'_, Rule>, line: usize) -> Result<usize, CircuitError> {
  pair.as_str().parse().map_err(|_| CircuitError::Syntax {
    line,
    message: format!("number `{}` is too large", pair.as_str()),
  })
}

fn parse_wires(pair: Pair<'_, Rule>, line: usize) -> Result<Vec<Wire>, CircuitError> {
  pair.into_inner().map(|w| parse_number(w, line)).collect()
}

fn syntax_error(line: usize, message: &str) -> CircuitError {
  CircuitError::Syntax {
    line,
    message: message.to_string(),
  }
}

fn parse_statement<F: PrimeField>(content: &str, line: usize) -> Result<Statement<F>, CircuitError> {
  let statement = ArithParser::parse(Rule::statement, content)
    .map_err(|e| CircuitError::Syntax {
      line,
      message: e.variant.message().into_owned(),
    })?
    .next()
    .and_then(|s| s.into_inner().next())
    .ok_or_else(|| syntax_error(line, "empty statement"))?;

  match statement.as_rule() {
    Rule::declaration => {
      let mut inner = statement.into_inner();
      let (kind, wire) = match (inner.next(), inner.next()) {
        (Some(kind), Some(wire)) => (kind, wire),
        _ => return Err(syntax_error(line, "malformed declaration")),
      };
      let kind = match kind.as_str() {
        "input" => DeclKind::Input,
        "nizkinput" => DeclKind::NizkInput,
        _ => DeclKind::Output,
      };
      Ok(Statement::Declaration(Declaration {
        kind,
        wire: parse_number(wire, line)?,
        line,
      }))
    }
    Rule::gate => {
      let mut inner = statement.into_inner();
      let mut next = |what: &str| {
        inner
          .next()
          .ok_or_else(|| syntax_error(line, &format!("gate is missing its {what}")))
      };
      let name = next("operation")?;
      let num_inputs = parse_number(next("input count")?, line)?;
      let inputs = parse_wires(next("input wires")?, line)?;
      let num_outputs = parse_number(next("output count")?, line)?;
      let outputs = parse_wires(next("output wires")?, line)?;

      let opcode = Opcode::parse(name.as_str(), line)?;
      for (port, declared, actual) in [
        ("in", num_inputs, inputs.len()),
        ("out", num_outputs, outputs.len()),
      ] {
        if declared != actual {
          return Err(CircuitError::ArityMismatch {
            line,
            port,
            declared,
            actual,
          });
        }
      }

      let (in_arity, out_arity) = opcode.arity();
      for (port, arity, actual) in [("in", in_arity, inputs.len()), ("out", out_arity, outputs.len())]
      {
        if !arity.accepts(actual) {
          return Err(CircuitError::OpcodeArity {
            line,
            opcode: opcode.to_string(),
            port,
            expected: arity.describe(),
            actual,
          });
        }
      }

      Ok(Statement::Gate(Gate {
        opcode,
        inputs,
        outputs,
        line,
      }))
    }
    _ => Err(syntax_error(line, "expected a declaration or a gate")),
  }
}

/// Tracks which wires are defined while statements are read in order.
///
/// Only wires that are actually mentioned are recorded, so the declared
/// `total` costs nothing up front.
struct Validator {
  total: usize,
  defined: HashSet<Wire>,
  outputs: Vec<(Wire, usize)>,
  span: usize,
}

impl Validator {
  fn new(total: usize) -> Self {
    Validator {
      total,
      defined: HashSet::new(),
      outputs: Vec::new(),
      span: 0,
    }
  }

  fn in_range(&mut self, wire: Wire, line: usize) -> Result<(), CircuitError> {
    if wire >= self.total {
      return Err(CircuitError::WireOutOfRange {
        line,
        wire,
        total: self.total,
      });
    }
    self.span = self.span.max(wire + 1);
    Ok(())
  }

  fn read(&mut self, wire: Wire, line: usize) -> Result<(), CircuitError> {
    self.in_range(wire, line)?;
    if !self.defined.contains(&wire) {
      return Err(CircuitError::UndefinedWire { line, wire });
    }
    Ok(())
  }

  fn define(&mut self, wire: Wire, line: usize) -> Result<(), CircuitError> {
    self.in_range(wire, line)?;
    if !self.defined.insert(wire) {
      return Err(CircuitError::WireRedefined { line, wire });
    }
    Ok(())
  }

  fn check<F: PrimeField>(&mut self, statement: &Statement<F>) -> Result<(), CircuitError> {
    match statement {
      Statement::Declaration(Declaration {
        kind: DeclKind::Output,
        wire,
        line,
      }) => {
        self.in_range(*wire, *line)?;
        self.outputs.push((*wire, *line));
      }
      Statement::Declaration(Declaration { wire, line, .. }) => self.define(*wire, *line)?,
      Statement::Gate(gate) => {
        for wire in &gate.inputs {
          self.read(*wire, gate.line)?;
        }
        if gate.opcode == Opcode::Assert {
          self.read(gate.outputs[0], gate.line)?;
        } else {
          for wire in &gate.outputs {
            self.define(*wire, gate.line)?;
          }
        }
      }
    }
    Ok(())
  }

  /// Checks the outputs and returns one past the highest wire mentioned.
  fn finish(mut self) -> Result<usize, CircuitError> {
    for (wire, line) in std::mem::take(&mut self.outputs) {
      self.read(wire, line)?;
    }
    Ok(self.span)
  }
}
