/// Wordbook Parser Tracer - Shows every value a file parses into
///
/// Usage: cargo run --bin trace_parser [--json] <file>
///
/// Set RUST_LOG=wordbook_dsl=debug to see parser events on stderr.
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wordbook_dsl::parse_file;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn usage() -> ExitCode {
    eprintln!("Usage: cargo run --bin trace_parser [--json] <file>");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  cargo run --bin trace_parser go.mod");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    init_logging();

    let mut json = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            _ if path.is_none() => path = Some(arg),
            _ => return usage(),
        }
    }
    let Some(path) = path else {
        return usage();
    };

    let values = match parse_file(&path) {
        Ok(values) => values,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&values) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("failed to encode values: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        for value in &values {
            println!("{}:{}: {}", value.source(), value.line(), value);
        }
        println!("{} values", values.len());
    }

    ExitCode::SUCCESS
}
