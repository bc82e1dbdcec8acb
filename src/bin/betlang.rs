//! BetLang command-line interface.
//!
//! Usage:
//!   betlang run FILE [--seed N] [--limit STEPS] [--safety=on|off]
//!   betlang check FILE
//!   betlang repl
//!   betlang fmt FILE

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use betlang::diagnostics::Diagnostic;
use betlang::driver::{self, exit_code, DriverConfig};
use betlang::prng::PrngState;
use betlang::runtime::environment::Environment;
use betlang::runtime::evaluator::Evaluator;
use betlang::safety::cooloff::CoolOffState;
use betlang::span::SourceMap;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "betlang")]
#[command(author = "BetLang Contributors")]
#[command(version)]
#[command(about = "BetLang - a ternary probabilistic programming language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SafetyFlag {
    On,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, elaborate, and evaluate a file; print the value of the last
    /// top-level expression.
    Run {
        file: PathBuf,
        /// Overrides BETLANG_SEED.
        #[arg(long)]
        seed: Option<u64>,
        /// Step budget; evaluation aborts past this many evaluated nodes.
        #[arg(long)]
        limit: Option<u64>,
        /// Toggles the cool-off safety gate.
        #[arg(long, default_value = "on")]
        safety: SafetyFlag,
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Parse and elaborate a file; no evaluation.
    Check {
        file: PathBuf,
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Interactive read-eval-print loop.
    Repl,
    /// Round-trip a file through the parser and pretty-print it in the
    /// keyword form.
    Fmt { file: PathBuf },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        None | Some(Commands::Repl) => {
            repl();
            ExitCode::from(exit_code::SUCCESS as u8)
        }
        Some(Commands::Run {
            file,
            seed,
            limit,
            safety,
            format,
        }) => run_cmd(&file, seed, limit, safety, format),
        Some(Commands::Check { file, format }) => check_cmd(&file, format),
        Some(Commands::Fmt { file }) => fmt_cmd(&file),
    }
}

fn read_source(path: &PathBuf) -> Result<String, ExitCode> {
    std::fs::read_to_string(path).map_err(|e| {
        eprintln!("error: could not read {}: {}", path.display(), e);
        ExitCode::from(exit_code::USAGE_ERROR as u8)
    })
}

fn run_cmd(
    path: &PathBuf,
    seed: Option<u64>,
    limit: Option<u64>,
    safety: SafetyFlag,
    format: OutputFormat,
) -> ExitCode {
    let source = match read_source(path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let map = SourceMap::new(path.display().to_string(), source.clone());
    let mut config = DriverConfig::default();
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.max_steps = limit;
    config.safety_enabled = matches!(safety, SafetyFlag::On);

    let mut cooloff = CoolOffState::new();
    match driver::run(&source, &config, &mut cooloff) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::from(exit_code::SUCCESS as u8)
        }
        Err(err) => {
            let owned: Vec<Diagnostic> = err.diagnostics().into_iter().cloned().collect();
            print_diagnostics(&owned, &map, format == OutputFormat::Json);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn check_cmd(path: &PathBuf, format: OutputFormat) -> ExitCode {
    let source = match read_source(path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let map = SourceMap::new(path.display().to_string(), source.clone());
    match driver::check(&source) {
        Ok(()) => {
            println!("OK");
            ExitCode::from(exit_code::SUCCESS as u8)
        }
        Err(diagnostics) => {
            print_diagnostics(&diagnostics, &map, format == OutputFormat::Json);
            ExitCode::from(exit_code::FRONTEND_ERROR as u8)
        }
    }
}

fn fmt_cmd(path: &PathBuf) -> ExitCode {
    let source = match read_source(path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let map = SourceMap::new(path.display().to_string(), source.clone());
    match driver::fmt(&source) {
        Ok(formatted) => {
            print!("{}", formatted);
            ExitCode::from(exit_code::SUCCESS as u8)
        }
        Err(diagnostics) => {
            print_diagnostics(&diagnostics, &map, false);
            ExitCode::from(exit_code::FRONTEND_ERROR as u8)
        }
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic], map: &SourceMap, json: bool) {
    for d in diagnostics {
        if json {
            println!("{}", d.to_json_line());
        } else {
            let rendered = d.render_line(map);
            match d.severity {
                betlang::diagnostics::Severity::Error => eprintln!("{}", rendered.red()),
                betlang::diagnostics::Severity::Warning => eprintln!("{}", rendered.yellow()),
                betlang::diagnostics::Severity::Note => eprintln!("{}", rendered),
            }
        }
    }
}

/// `betlang repl`: each entered line is a complete expression or top-level
/// form. `:help`, `:quit`, `:seed N`, `:reset` are meta-commands; all other
/// state (the environment, the running PRNG stream, cool-off counters)
/// persists across lines for the lifetime of the session.
fn repl() {
    println!("BetLang {} - interactive REPL", env!("CARGO_PKG_VERSION"));
    println!("Type an expression and press Enter. :help for meta-commands, :quit to exit.");

    let mut config = DriverConfig::default();
    let mut env = Evaluator::global_env();
    let mut prng = PrngState::seed(config.seed);
    let mut cooloff = CoolOffState::new();

    loop {
        print!("betlang> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("error reading input: {}", e);
                continue;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix(':') {
            match handle_meta(rest, &mut config, &mut env, &mut prng, &mut cooloff) {
                MetaOutcome::Continue => continue,
                MetaOutcome::Quit => break,
            }
        }

        let map = SourceMap::new("<repl>", line.to_string());
        match driver::front_end(line) {
            Ok((_, ir)) => match driver::run_ir(&ir, env.clone(), &config, prng, &mut cooloff) {
                Ok((value, next_env, next_prng)) => {
                    env = next_env;
                    prng = next_prng;
                    println!("=> {}", value);
                }
                Err(e) => {
                    let d = Diagnostic::from_error(&e);
                    eprintln!("{}", d.render_line(&map).red());
                }
            },
            Err(diagnostics) => print_diagnostics(&diagnostics, &map, false),
        }
    }
    println!("goodbye");
}

enum MetaOutcome {
    Continue,
    Quit,
}

fn handle_meta(
    rest: &str,
    config: &mut DriverConfig,
    env: &mut Environment,
    prng: &mut PrngState,
    cooloff: &mut CoolOffState,
) -> MetaOutcome {
    let mut parts = rest.split_whitespace();
    match parts.next() {
        Some("help") => {
            println!(":help          show this message");
            println!(":quit          exit the REPL");
            println!(":seed N        reseed the PRNG stream to N");
            println!(":reset         clear bindings, cool-off state, and reseed to the default seed");
        }
        Some("quit") => return MetaOutcome::Quit,
        Some("seed") => match parts.next().and_then(|s| s.parse::<u64>().ok()) {
            Some(n) => {
                config.seed = n;
                *prng = PrngState::seed(n);
                println!("seed set to {}", n);
            }
            None => eprintln!("usage: :seed N"),
        },
        Some("reset") => {
            *env = Evaluator::global_env();
            *cooloff = CoolOffState::new();
            *prng = PrngState::seed(config.seed);
            println!("environment, cool-off state, and PRNG stream reset");
        }
        Some(other) => eprintln!("unknown meta-command ':{}' (try :help)", other),
        None => eprintln!("unknown meta-command (try :help)"),
    }
    MetaOutcome::Continue
}
