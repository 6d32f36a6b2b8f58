use std::{collections::BTreeMap, io::{self, stdout}, process::ExitCode};

use chat_widget_oidc::config::{Config, EnvKey};
use clap::{Parser, ValueEnum};

#[derive(Parser)]
struct Args {
  #[arg(value_enum)]
  output: Output
}

#[derive(ValueEnum, Clone)]
enum Output {
  /// Output the result in json format
  Json,
  /// Output the result in .env format
  Env,
}

/// Takes a json object of configuration values from stdin, checks it the
/// same way the worker does, and outputs either `wrangler secret bulk`
/// or .env compatible values
fn main() -> ExitCode {
  let Args{ output } = Args::parse();

  let values = match serde_json::from_reader::<_, BTreeMap<String, String>>(
    io::stdin().lock()
  ) {
    Ok(values) => values,
    Err(e) => {
      eprintln!("stdin is not a json object of strings: {e}");
      return ExitCode::FAILURE
    }
  };

  if let Err(e) = Config::from_lookup(|key| values.get(key).cloned()) {
    eprintln!("{e}");
    return ExitCode::FAILURE
  }

  // drop anything the worker wouldn't read
  let values = values.into_iter()
    .filter(|(k, _)| EnvKey::ALL.iter().any(|key| key.as_str() == k))
    .collect::<BTreeMap<_, _>>();

  match output {
    // json
    Output::Json => if let Err(e) = serde_json::to_writer(stdout(), &values) {
      eprintln!("{e}");
      return ExitCode::FAILURE
    },
    // env
    Output::Env => print!(
      "{}",
      values.iter()
        .map(|(k, v)| format!("{k}='{v}'"))
        .collect::<Vec<_>>()
        .join("\n")
    )
  }

  ExitCode::SUCCESS
}
