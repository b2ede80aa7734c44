//! Arbor CLI entry point.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rhizome_arbor_ir::Bundle;
use rhizome_arbor_pass_abi::Pass;
use rhizome_arbor_pass_cfg_trans::{CheckFile, LLVM_PHI_2, capture_trans, llvm_phi_2_factory};
use rhizome_arbor_runtime::{PassManager, PassRegistry, PluginPass, RegistryError, install};
use rhizome_arbor_sexpr::{Binding, Pattern, Reader, parse_required};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Inspect and verify control-flow IR")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read S-expressions and print them in canonical form
    Parse {
        /// Input file (or - for stdin)
        file: String,

        /// Print each value as JSON
        #[arg(long)]
        json: bool,

        /// Strip this prefix from every atom
        #[arg(long)]
        sigil: Option<char>,
    },

    /// Match an S-expression against a pattern and print the captures
    Match {
        /// Pattern, e.g. "(edge (?src) (?dest))"
        pattern: String,

        /// Input file (or - for stdin)
        file: String,
    },

    /// Print the control-flow graphs of a bundle
    Dump {
        /// Bundle description (JSON)
        bundle: PathBuf,

        /// Only this function
        #[arg(short, long)]
        function: Option<String>,

        /// Print the function's edges as a (trans ...) literal
        #[arg(long, requires = "function")]
        trans: bool,
    },

    /// List the built-in passes
    List,

    /// Run passes on a bundle
    Run {
        /// Bundle description (JSON)
        bundle: PathBuf,

        /// Built-in pass to run (repeatable; all when no pass or plugin is given)
        #[arg(short, long = "pass")]
        passes: Vec<String>,

        /// Pass library to load and run (repeatable)
        #[arg(long = "plugin")]
        plugins: Vec<PathBuf>,
    },

    /// Run the oracle checks of a TOML file on a bundle
    Check {
        /// Bundle description (JSON)
        bundle: PathBuf,

        /// Check file (TOML)
        config: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("pattern did not match")]
    NoMatch,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "rhizome_arbor=debug"
    } else {
        "rhizome_arbor=info"
    };
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = install(builtin_registry()?)?;

    match cli.command {
        Commands::Parse { file, json, sigil } => {
            let input = read_input(&file)?;
            let mut reader = Reader::new(&input);
            if let Some(sigil) = sigil {
                reader = reader.string_sigil(sigil);
            }
            for value in reader {
                let value = value?;
                if json {
                    println!("{}", serde_json::to_string(&value)?);
                } else {
                    println!("{}", value);
                }
            }
        }

        Commands::Match { pattern, file } => {
            let pattern = Pattern::parse(&pattern)?;
            let value = parse_required(&read_input(&file)?)?;
            let bindings = pattern.matches(&value).ok_or(CliError::NoMatch)?;
            for (name, binding) in bindings.iter() {
                match binding {
                    Binding::One(value) => println!("{} = {}", name, value),
                    Binding::Rest(values) => {
                        let values: Vec<String> =
                            values.iter().map(|v| v.to_string()).collect();
                        println!("{}... = {}", name, values.join(" "));
                    }
                }
            }
        }

        Commands::Dump {
            bundle,
            function,
            trans,
        } => {
            let bundle = Bundle::from_file(&bundle)?;
            let functions = match &function {
                Some(name) => vec![bundle.function(name)?],
                None => bundle.functions().iter().collect(),
            };
            for function in functions {
                let body = function.body();
                if trans {
                    println!("{}", capture_trans(body));
                    continue;
                }
                let entry = body.entry().map(|b| b.name()).unwrap_or("-");
                println!("function {} (entry: {})", function.name(), entry);
                for block in body.blocks() {
                    let succs: Vec<&str> = body
                        .successors(block.block_ref())
                        .map(|b| b.name())
                        .collect();
                    println!("  {} -> [{}]", block.name(), succs.join(", "));
                }
            }
        }

        Commands::List => {
            for name in registry.names() {
                let pass = registry.create(name)?;
                println!("{}\t{}", pass.name(), pass.description());
            }
        }

        Commands::Run {
            bundle,
            passes,
            plugins,
        } => {
            let bundle = Bundle::from_file(&bundle)?;
            let mut manager = if passes.is_empty() && plugins.is_empty() {
                PassManager::from_registry(registry, registry.names())?
            } else {
                PassManager::from_registry(registry, passes.iter().map(String::as_str))?
            };
            for path in &plugins {
                manager.add_pass(PluginPass::load(path)?);
            }
            let ran = manager.run(&bundle)?;
            info!(passes = ran, "all passes succeeded");
        }

        Commands::Check { bundle, config } => {
            let bundle = Bundle::from_file(&bundle)?;
            let checks = CheckFile::from_file(&config)?;
            let mut manager = PassManager::new();
            for pass in checks.passes() {
                manager.add_pass(pass);
            }
            let ran = manager.run(&bundle)?;
            info!(checks = ran, "all checks passed");
        }
    }

    Ok(())
}

fn builtin_registry() -> Result<PassRegistry, RegistryError> {
    let mut registry = PassRegistry::new();
    registry.register(LLVM_PHI_2, llvm_phi_2_factory)?;
    Ok(registry)
}

fn read_input(file: &str) -> std::io::Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file)
    }
}
