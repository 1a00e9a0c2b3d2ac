use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use halo2curves::bn256::Fr;
use itertools::Itertools;
use jubjub_circuits::reader::CircuitReader;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Compile a Pinocchio arithmetic circuit to R1CS and check it against its inputs.
#[derive(Debug, Parser)]
#[command(name = "circuit-reader", version, about)]
struct Args {
  /// Path to the `.arith` circuit file
  circuit: PathBuf,

  /// Path to the inputs file, one `<wire> <hex value>` per line
  inputs: Option<PathBuf>,

  /// Do not print the summary, and only log warnings
  #[arg(short, long)]
  quiet: bool,
}

fn main() -> ExitCode {
  let args = Args::parse();

  let level = if args.quiet {
    LevelFilter::WARN
  } else {
    LevelFilter::INFO
  };
  let _ = tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .with(level)
    .try_init();

  let reader = match CircuitReader::<Fr>::from_files(&args.circuit, args.inputs.as_deref()) {
    Ok(reader) => reader,
    Err(err) => {
      eprintln!("error: {err}");
      return ExitCode::FAILURE;
    }
  };

  if !args.quiet {
    let cs = reader.cs();
    println!("wires:       {}", reader.circuit().num_wires());
    println!("constraints: {}", cs.num_constraints());
    println!("public:      {}", cs.num_inputs() - 1);
    println!("private:     {}", cs.num_aux());
    if args.inputs.is_some() {
      let outputs = reader
        .output_values()
        .into_iter()
        .map(|(wire, value)| format!("{wire}={value:?}"))
        .join(", ");
      println!("outputs:     {outputs}");
      println!("satisfied:   true");
    }
  }

  ExitCode::SUCCESS
}
