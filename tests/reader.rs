use std::{fs, path::PathBuf};

use ff::Field;
use halo2curves::bn256::Fr;
use jubjub_circuits::{
  reader::{evaluate, ArithCircuit, CircuitReader},
  CircuitError,
};
use proptest::prelude::*;

const MUL: &str = "total 3\ninput 0\ninput 1\nmul in 2 <0 1> out 1 <2>\n";

fn compile(circuit: &str, inputs: &str) -> Result<CircuitReader<Fr>, CircuitError> {
  CircuitReader::compile(circuit, Some(inputs))
}

#[test]
fn test_mul() {
  let reader = compile(MUL, "0 3\n1 4\n").unwrap();
  assert_eq!(reader.wire_value(2), Some(Fr::from(12)));
  assert_eq!(reader.num_constraints(), 1);
  assert!(reader.cs().is_satisfied());
}

#[test]
fn test_linear_chain_is_free() {
  let circuit = "total 7\n\
                 input 0\ninput 1\n\
                 add in 2 <0 1> out 1 <2>\n\
                 const-mul-2 in 1 <2> out 1 <3>\n\
                 const-mul-neg-3 in 1 <3> out 1 <4>\n\
                 add in 3 <2 3 4> out 1 <5>\n\
                 mul in 2 <5 0> out 1 <6>\n";
  let reader = compile(circuit, "0 1\n1 2\n").unwrap();

  // 3 + 6 - 18 = -9
  assert_eq!(reader.wire_value(5), Some(-Fr::from(9)));
  assert_eq!(reader.wire_value(6), Some(-Fr::from(9)));
  assert_eq!(reader.num_constraints(), 1);
  assert_eq!(reader.cs().num_aux(), 1);
}

#[test]
fn test_outputs_are_public() {
  let circuit = "total 4\n\
                 input 0\n\
                 nizkinput 1\n\
                 output 3\n\
                 mul in 2 <0 1> out 1 <2>\n\
                 const-mul-5 in 1 <2> out 1 <3>\n";
  let reader = compile(circuit, "0 2\n1 3\n").unwrap();
  assert_eq!(reader.output_values(), vec![(3, Fr::from(30))]);
  // one, input 0, output 3
  assert_eq!(reader.cs().num_inputs(), 3);
}

#[test]
fn test_zerop() {
  let circuit = "total 4\n\
                 input 0\n\
                 zerop in 1 <0> out 2 <1 2>\n\
                 mul in 2 <2 2> out 1 <3>\n";

  let reader = compile(circuit, "0 7\n").unwrap();
  assert_eq!(reader.wire_value(2), Some(Fr::ONE));
  let m = reader.bindings().variable(1).unwrap();
  assert_eq!(reader.cs().witness(m), Fr::from(7).invert().unwrap());

  let reader = compile(circuit, "0 0\n").unwrap();
  assert_eq!(reader.wire_value(2), Some(Fr::ZERO));
  let m = reader.bindings().variable(1).unwrap();
  assert_eq!(reader.cs().witness(m), Fr::ZERO);
}

#[test]
fn test_zerop_inverse_feeds_later_gates() {
  let circuit = "total 4\n\
                 input 0\n\
                 zerop in 1 <0> out 2 <1 2>\n\
                 mul in 2 <1 0> out 1 <3>\n";

  let reader = compile(circuit, "0 7\n").unwrap();
  assert_eq!(reader.wire_value(3), Some(Fr::ONE));
  assert!(reader.cs().is_satisfied());

  let reader = compile(circuit, "0 0\n").unwrap();
  assert_eq!(reader.wire_value(3), Some(Fr::ZERO));
}

#[test]
fn test_huge_total() {
  let circuit = format!(
    "total {}\ninput 0\ninput 1\nmul in 2 <0 1> out 1 <2>\n",
    usize::MAX
  );
  let reader = compile(&circuit, "0 3\n1 4\n").unwrap();
  assert_eq!(reader.circuit().wire_span(), 3);
  assert_eq!(reader.wire_value(2), Some(Fr::from(12)));

  let empty = format!("total {}\n", usize::MAX);
  assert!(CircuitReader::<Fr>::compile(&empty, None).is_ok());

  let overflow = format!("total {}0\n", usize::MAX);
  assert!(matches!(
    CircuitReader::<Fr>::compile(&overflow, None),
    Err(CircuitError::Header { line: 1 })
  ));
}

#[test]
fn test_boolean_gates() {
  let circuit = "total 6\n\
                 input 0\ninput 1\n\
                 xor in 2 <0 1> out 1 <2>\n\
                 or in 2 <0 1> out 1 <3>\n\
                 assert in 2 <2 3> out 1 <2>\n";
  for (a, b) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
    let reader = compile(circuit, &format!("0 {a}\n1 {b}\n")).unwrap();
    assert_eq!(reader.wire_value(2), Some(Fr::from((a ^ b) as u64)));
    assert_eq!(reader.wire_value(3), Some(Fr::from((a | b) as u64)));
  }
}

#[test]
fn test_xor_on_non_boolean_inputs() {
  // xor does not constrain its inputs to bits; only the final check notices
  let circuit = "total 3\ninput 0\ninput 1\nxor in 2 <0 1> out 1 <2>\n";
  match compile(circuit, "0 2\n1 3\n") {
    Err(CircuitError::Unsatisfied { constraint }) => {
      assert_eq!(constraint, "line 4 xor/2 * l1 * l2 = l1 + l2 - out")
    }
    other => panic!("expected an unsatisfied constraint, got {other:?}"),
  }
}

#[test]
fn test_failed_assertion() {
  let circuit = "total 4\n\
                 input 0\ninput 1\ninput 2\n\
                 assert in 2 <0 1> out 1 <2>\n";
  assert!(compile(circuit, "0 3\n1 4\n2 c\n").is_ok());
  assert!(matches!(
    compile(circuit, "0 3\n1 4\n2 d\n"),
    Err(CircuitError::Unsatisfied { .. })
  ));
}

#[test]
fn test_hex_constants() {
  let circuit = "total 3\n\
                 input 0\n\
                 const-mul-ff in 1 <0> out 1 <1>\n\
                 const-mul-neg-10 in 1 <1> out 1 <2>\n";
  let reader = compile(circuit, "0 2\n").unwrap();
  assert_eq!(reader.wire_value(1), Some(Fr::from(510)));
  assert_eq!(reader.wire_value(2), Some(-Fr::from(510 * 16)));
}

#[test]
fn test_without_inputs() {
  let reader = CircuitReader::<Fr>::compile(MUL, None).unwrap();
  assert_eq!(reader.num_constraints(), 1);
  assert_eq!(reader.wire_value(2), None);
}

#[test]
fn test_malformed_files() {
  assert!(matches!(
    CircuitReader::<Fr>::compile("totale 3\n", None),
    Err(CircuitError::Header { line: 1 })
  ));
  assert!(matches!(
    CircuitReader::<Fr>::compile("total 2\ninput 0\nsqrt in 1 <0> out 1 <1>\n", None),
    Err(CircuitError::UnknownOpcode { line: 3, .. })
  ));
  assert!(matches!(
    CircuitReader::<Fr>::compile("total 3\ninput 0\ninput 1\nmul in 2 <0 1> out 1 <2 3>\n", None),
    Err(CircuitError::ArityMismatch { port: "out", declared: 1, actual: 2, .. })
  ));
  assert!(matches!(
    compile(MUL, "0 3\n1 zz\n"),
    Err(CircuitError::InputSyntax { line: 2, .. })
  ));
  assert!(matches!(
    compile(MUL, "5 1\n"),
    Err(CircuitError::InputOutOfRange { wire: 5, .. })
  ));
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
  let path = std::env::temp_dir().join(format!("jubjub-circuits-{}-{name}", std::process::id()));
  fs::write(&path, contents).unwrap();
  path
}

#[test]
fn test_from_files() {
  let circuit = temp_file("mul.arith", MUL);
  let inputs = temp_file("mul.in", "0 5\n1 6\n");

  let reader = CircuitReader::<Fr>::from_files(&circuit, Some(inputs.as_path())).unwrap();
  assert_eq!(reader.wire_value(2), Some(Fr::from(30)));

  let missing = circuit.with_extension("missing");
  match CircuitReader::<Fr>::from_files(&missing, None) {
    Err(CircuitError::Io { path, .. }) => assert_eq!(path, missing),
    other => panic!("expected an I/O error, got {other:?}"),
  }

  fs::remove_file(circuit).unwrap();
  fs::remove_file(inputs).unwrap();
}

proptest! {
  #[test]
  fn test_split_then_pack(value in any::<u64>(), num_bits in 1usize..=64) {
    let outs = (2..num_bits + 2).map(|w| w.to_string()).collect::<Vec<_>>().join(" ");
    let circuit = format!(
      "total {}\ninput 0\ninput 1\nsplit in 1 <1> out {num_bits} <{outs}>\npack in {num_bits} <{outs}> out 1 <{}>\n",
      num_bits + 3,
      num_bits + 2,
    );
    let mask = if num_bits == 64 { u64::MAX } else { (1u64 << num_bits) - 1 };

    // the interpreter truncates to the low bits
    let parsed = ArithCircuit::<Fr>::parse(&circuit).unwrap();
    let values = evaluate(&parsed, &[(0, Fr::ONE), (1, Fr::from(value))]);
    prop_assert_eq!(values[num_bits + 2], Fr::from(value & mask));

    // the constraints only accept values that fit
    let reader = compile(&circuit, &format!("0 1\n1 {:x}\n", value & mask)).unwrap();
    prop_assert_eq!(reader.wire_value(num_bits + 2), Some(Fr::from(value & mask)));
    if value > mask {
      let overflow = compile(&circuit, &format!("0 1\n1 {value:x}\n"));
      prop_assert!(matches!(overflow, Err(CircuitError::Unsatisfied { .. })), "expected Unsatisfied, got {:?}", overflow);
    }
  }
}
