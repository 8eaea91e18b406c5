//! Handlers CLI: run and inspect configured handler chains.
//!
//! Usage:
//!   handlers run --chain <name> [--input text] [--config path]
//!   handlers inspect [--json] [--config path]
//!   handlers chains [--config path]

use clap::{Parser, Subcommand};
use handlers::{
    AdapterCache, ChainRegistry, ChainsConfig, Completion, Handler, HandlerCatalog, Operations,
    Seed, Value, ValueStore,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "handlers", version, about = "Type-indexed handler chains")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the chains YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a chain and print its reply
    Run {
        /// Name of the chain to run
        #[arg(long)]
        chain: String,
        /// Text seeded into the store before the run
        #[arg(long)]
        input: Option<String>,
    },
    /// Show the operation bound for every configured handler
    Inspect {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List configured chains
    Chains,
}

/// Chains used when no configuration file exists.
const BUILTIN_CHAINS: &str = "
chains:
  - name: greet
    handlers: [hello, upper, reply]
  - name: echo
    handlers: [read, reply]
  - name: shout
    handlers: [read, trim, upper, reply]
  - name: mirror
    handlers: [read, reverse, reply]
";

// === Built-in handlers ===

/// Text supplied on the command line.
#[derive(Clone, Debug)]
struct Input(String);
impl Value for Input {}

/// Working text passed between handlers.
#[derive(Clone, Debug)]
struct Text(String);
impl Value for Text {}

/// Final output; its presence ends a run.
#[derive(Clone, Debug)]
struct Reply(String);
impl Value for Reply {}

struct Read;

impl Read {
    fn process(&self, input: Option<Input>) -> Option<Text> {
        input.map(|i| Text(i.0))
    }
}

impl Handler for Read {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(Self::process);
    }
}

struct Hello;

impl Hello {
    fn process(&self, name: Option<Input>) -> Text {
        match name {
            Some(Input(name)) => Text(format!("hello, {}", name)),
            None => Text("hello".to_string()),
        }
    }
}

impl Handler for Hello {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(Self::process);
    }
}

struct Upper;

impl Handler for Upper {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|_upper: &Upper, text: Text| Text(text.0.to_uppercase()));
    }
}

struct Trim;

impl Handler for Trim {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|_trim: &Trim, text: Text| Text(text.0.trim().to_string()));
    }
}

struct Reverse;

impl Handler for Reverse {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|_reverse: &Reverse, text: Text| Text(text.0.chars().rev().collect()));
    }
}

struct Respond;

impl Handler for Respond {
    fn declare(ops: &mut Operations<Self>) {
        ops.process(|_respond: &Respond, text: Text| Reply(text.0));
    }
}

fn builtin_catalog() -> HandlerCatalog {
    let mut catalog = HandlerCatalog::new();
    catalog
        .insert("read", Read)
        .insert("hello", Hello)
        .insert("upper", Upper)
        .insert("trim", Trim)
        .insert("reverse", Reverse)
        .insert("reply", Respond);
    catalog
}

// === Setup ===

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `--config`, else the default file if present, else the built-in chains.
fn load_config(path: Option<PathBuf>) -> Result<ChainsConfig, String> {
    let path = match path {
        Some(p) => p,
        None => {
            let default = handlers::config::default_path();
            if !default.exists() {
                tracing::debug!(path = %default.display(), "no config file, using built-in chains");
                return ChainsConfig::from_yaml_str(BUILTIN_CHAINS).map_err(|e| e.to_string());
            }
            default
        }
    };
    ChainsConfig::load(&path).map_err(|e| e.to_string())
}

fn open_registry(config: &ChainsConfig) -> Result<ChainRegistry, String> {
    ChainRegistry::from_config(
        handlers::TypeKey::of::<Reply>(),
        Arc::new(AdapterCache::new()),
        config,
        &builtin_catalog(),
    )
    .map_err(|e| format!("Failed to build chains: {}", e))
}

// === Commands ===

fn cmd_run(registry: &ChainRegistry, chain: &str, input: Option<String>) -> i32 {
    let mut store = ValueStore::new();
    store.seed(input.map(|text| Seed::new(Input(text))));

    let mut executor = match registry.executor(chain, store) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let completion = match executor.run() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: chain '{}' failed: {}", chain, e);
            return 1;
        }
    };

    let store = executor.store();
    match (completion, store.get_typed::<Reply>(), store.get_typed::<Text>()) {
        (Completion::Early { .. }, Some(reply), _) => {
            println!("{}", reply.0);
            0
        }
        (_, _, Some(text)) => {
            eprintln!("Warning: chain '{}' produced no reply", chain);
            println!("{}", text.0);
            0
        }
        _ => {
            eprintln!("Error: chain '{}' produced no output", chain);
            1
        }
    }
}

#[derive(Serialize)]
struct SignatureReport {
    handler: &'static str,
    inputs: Vec<&'static str>,
    output: Option<&'static str>,
}

fn cmd_inspect(registry: &ChainRegistry, json: bool) -> i32 {
    let reports: Vec<SignatureReport> = registry
        .cache()
        .signatures()
        .into_iter()
        .map(|(handler, signature)| SignatureReport {
            handler,
            inputs: signature.inputs().iter().map(|k| k.name()).collect(),
            output: signature.output().map(|k| k.name()),
        })
        .collect();

    if json {
        return match serde_json::to_string_pretty(&reports) {
            Ok(out) => {
                println!("{}", out);
                0
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        };
    }

    if reports.is_empty() {
        println!("No handlers bound.");
        return 0;
    }
    for report in reports {
        let output = report.output.map(|o| format!(" -> {}", o)).unwrap_or_default();
        println!("{}  ({}){}", report.handler, report.inputs.join(", "), output);
    }
    0
}

fn cmd_chains(config: &ChainsConfig) -> i32 {
    if config.chains.is_empty() {
        println!("No chains defined.");
        return 0;
    }
    println!("{:<16}  {}", "NAME", "HANDLERS");
    println!("{}", "-".repeat(56));
    for chain in &config.chains {
        println!("{:<16}  {}", chain.name, chain.handlers.join(" -> "));
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Chains => cmd_chains(&config),
        Commands::Run { chain, input } => match open_registry(&config) {
            Ok(registry) => cmd_run(&registry, &chain, input),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
        Commands::Inspect { json } => match open_registry(&config) {
            Ok(registry) => cmd_inspect(&registry, json),
            Err(e) => {
                eprintln!("Error: {}", e);
                1
            }
        },
    };
    std::process::exit(code);
}
