//! Direct evaluation of a circuit on concrete inputs.
use ff::{Field, PrimeFieldBits};
use tracing::{debug, instrument};

use super::program::{ArithCircuit, Gate, Opcode, Statement, Wire};

/// Computes the value of every wire the circuit mentions.
///
/// The result is indexed by wire and has [`ArithCircuit::wire_span`] entries.
/// Wires start at zero, `inputs` are loaded on top, and gates run in file
/// order. Inputs for wires the circuit never mentions have nothing to feed
/// and are dropped. `assert` produces no value; `zerop` writes its 0/1 result
/// and the inverse (or zero) that witnesses it.
#[instrument(skip_all, name = "reader::evaluate")]
pub fn evaluate<F: PrimeFieldBits>(circuit: &ArithCircuit<F>, inputs: &[(Wire, F)]) -> Vec<F> {
  let mut values = vec![F::ZERO; circuit.wire_span()];
  for (wire, value) in inputs {
    if let Some(slot) = values.get_mut(*wire) {
      *slot = *value;
    }
  }

  let mut num_gates = 0;
  for statement in circuit.statements() {
    if let Statement::Gate(gate) = statement {
      eval_gate(gate, &mut values);
      num_gates += 1;
    }
  }
  debug!(num_gates, num_inputs = inputs.len(), "evaluated circuit");

  values
}

fn bool_to_field<F: Field>(b: bool) -> F {
  if b {
    F::ONE
  } else {
    F::ZERO
  }
}

fn eval_gate<F: PrimeFieldBits>(gate: &Gate<F>, values: &mut [F]) {
  let ins: Vec<F> = gate.inputs.iter().map(|w| values[*w]).collect();
  let out = gate.outputs[0];

  match &gate.opcode {
    Opcode::Add => values[out] = ins.iter().sum(),
    Opcode::Mul => values[out] = ins[0] * ins[1],
    Opcode::Xor => values[out] = bool_to_field(ins[0] != ins[1]),
    Opcode::Or => {
      values[out] = bool_to_field(!(ins[0].is_zero_vartime() && ins[1].is_zero_vartime()))
    }
    Opcode::Assert => {}
    Opcode::ZeroP => {
      values[gate.outputs[1]] = bool_to_field(!ins[0].is_zero_vartime());
      values[gate.outputs[0]] = Option::<F>::from(ins[0].invert()).unwrap_or(F::ZERO);
    }
    Opcode::Pack => {
      let mut sum = F::ZERO;
      let mut two_i = F::ONE;
      for v in &ins {
        sum += *v * two_i;
        two_i = two_i.double();
      }
      values[out] = sum;
    }
    Opcode::Split => {
      let bits = ins[0].to_le_bits();
      for (i, wire) in gate.outputs.iter().enumerate() {
        values[*wire] = bool_to_field(bits.get(i).map(|b| *b).unwrap_or(false));
      }
    }
    Opcode::ConstMul(c) => values[out] = ins[0] * c,
    Opcode::ConstMulNeg(c) => values[out] = -(ins[0] * c),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::reader::program::parse_inputs;
  use halo2curves::bn256::Fr;

  fn run(text: &str, inputs: &str) -> Vec<Fr> {
    let circuit = ArithCircuit::<Fr>::parse(text).unwrap();
    let inputs = parse_inputs(inputs, circuit.num_wires()).unwrap();
    evaluate(&circuit, &inputs)
  }

  #[test]
  fn test_arithmetic_gates() {
    let values = run(
      "total 7\n\
       input 0\ninput 1\nnizkinput 2\n\
       mul in 2 <1 2> out 1 <3>\n\
       add in 3 <0 1 3> out 1 <4>\n\
       const-mul-3 in 1 <4> out 1 <5>\n\
       const-mul-neg-2 in 1 <5> out 1 <6>\n",
      "0 1\n1 3\n2 4\n",
    );
    assert_eq!(values[3], Fr::from(12));
    assert_eq!(values[4], Fr::from(16));
    assert_eq!(values[5], Fr::from(48));
    assert_eq!(values[6], -Fr::from(96));
  }

  #[test]
  fn test_boolean_gates() {
    let values = run(
      "total 8\n\
       input 0\ninput 1\ninput 2\n\
       xor in 2 <0 1> out 1 <3>\n\
       xor in 2 <0 0> out 1 <4>\n\
       or in 2 <1 2> out 1 <5>\n\
       zerop in 1 <0> out 2 <6 7>\n",
      "0 1\n1 0\n2 0\n",
    );
    assert_eq!(values[3], Fr::ONE);
    assert_eq!(values[4], Fr::ZERO);
    assert_eq!(values[5], Fr::ZERO);
    assert_eq!(values[6], Fr::ONE);
    assert_eq!(values[7], Fr::ONE);
  }

  #[test]
  fn test_zerop_writes_inverse() {
    let text = "total 4\ninput 0\nzerop in 1 <0> out 2 <1 2>\nmul in 2 <1 0> out 1 <3>\n";

    let values = run(text, "0 7\n");
    assert_eq!(values[1], Fr::from(7).invert().unwrap());
    assert_eq!(values[2], Fr::ONE);
    assert_eq!(values[3], Fr::ONE);

    let values = run(text, "0 0\n");
    assert_eq!(values[1], Fr::ZERO);
    assert_eq!(values[2], Fr::ZERO);
    assert_eq!(values[3], Fr::ZERO);
  }

  #[test]
  fn test_values_cover_mentioned_wires() {
    let circuit =
      ArithCircuit::<Fr>::parse("total 100\ninput 0\ninput 1\nmul in 2 <0 1> out 1 <2>\n").unwrap();
    assert_eq!(circuit.wire_span(), 3);

    // wire 50 is in range but no statement mentions it
    let values = evaluate(&circuit, &[(0, Fr::from(3)), (1, Fr::from(4)), (50, Fr::ONE)]);
    assert_eq!(values, vec![Fr::from(3), Fr::from(4), Fr::from(12)]);
  }

  #[test]
  fn test_split_and_pack() {
    let values = run(
      "total 7\n\
       input 0\n\
       split in 1 <0> out 4 <1 2 3 4>\n\
       pack in 3 <1 2 3> out 1 <5>\n\
       assert in 2 <0 0> out 1 <0>\n",
      "0 d\n",
    );
    let bits: Vec<_> = values[1..5].to_vec();
    assert_eq!(bits, vec![Fr::ONE, Fr::ZERO, Fr::ONE, Fr::ONE]);
    assert_eq!(values[5], Fr::from(5));
    assert_eq!(values[6], Fr::ZERO);
  }
}
