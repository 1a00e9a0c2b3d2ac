//! Benchmarks the circuit reader on a generated circuit: a long chain of
//! multiplications interleaved with bit decompositions.
use core::time::Duration;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use halo2curves::bn256::Fr;
use jubjub_circuits::reader::CircuitReader;

criterion_group! {
name = reader;
config = Criterion::default().warm_up_time(Duration::from_millis(3000)).sample_size(10);
targets = bench_compile
}

criterion_main!(reader);

/// `steps` rounds of `acc = (acc * x) mod 2^32` expressed with `mul`, `split` and `pack`.
fn chain(steps: usize) -> String {
  let mut lines = Vec::new();
  let mut next = 2;
  let mut acc = 1;
  lines.push("input 0".to_string());
  lines.push("input 1".to_string());

  for _ in 0..steps {
    let product = next;
    lines.push(format!("mul in 2 <{acc} 1> out 1 <{product}>"));
    let bits: Vec<String> = (product + 1..product + 65).map(|w| w.to_string()).collect();
    lines.push(format!("split in 1 <{product}> out 64 <{}>", bits.join(" ")));
    let packed = product + 65;
    lines.push(format!("pack in 32 <{}> out 1 <{packed}>", bits[..32].join(" ")));
    acc = packed;
    next = packed + 1;
  }
  lines.push(format!("output {acc}"));

  format!("total {next}\n{}\n", lines.join("\n"))
}

fn bench_compile(c: &mut Criterion) {
  let mut group = c.benchmark_group("CircuitReader-compile");
  for steps in [1 << 6, 1 << 8, 1 << 10] {
    let circuit = chain(steps);
    group.bench_with_input(BenchmarkId::from_parameter(steps), &circuit, |b, circuit| {
      b.iter(|| {
        CircuitReader::<Fr>::compile(black_box(circuit), Some("0 1\n1 deadbeef\n")).unwrap()
      })
    });
  }
  group.finish();
}
