use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use zs_ast::TranspileOptions;
use zs_desugar::transpile;
use zs_parser::parse_zenoscript;

#[derive(Parser)]
#[command(name = "zeno", about = "zenoscript: functional sugar over TypeScript")]
struct Cli {
    /// Log a notice when transpilation completes.
    #[arg(short = 'V', long, global = true)]
    verbose: bool,
    /// Log the source and the generated TypeScript.
    #[arg(short, long, global = true)]
    debug: bool,
    /// TOML file with transpile options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transpile a .zs file to TypeScript.
    Transpile {
        /// Input .zs file.
        input: PathBuf,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Transpile the file and check that the output parses as TypeScript.
    Check { input: PathBuf },
    /// Transpile the file and dump the TypeScript AST.
    Parse {
        input: PathBuf,
        /// Dump as JSON instead of the debug representation.
        #[arg(long)]
        ast: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = load_options(cli.config.as_deref(), cli.verbose, cli.debug)?;
    setup_logging(&options)?;

    match cli.command {
        Commands::Transpile { input, output } => {
            let result = transpile_file(&input, output.as_deref(), &options)?;
            if output.is_none() {
                print!("{result}");
            }
        }
        Commands::Check { input } => {
            let source = read_source(&input)?;
            parse_zenoscript(&source, &typescript_name(&input), &options)?;
            eprintln!("OK: {}", input.display());
        }
        Commands::Parse { input, ast } => {
            let source = read_source(&input)?;
            let parsed = parse_zenoscript(&source, &typescript_name(&input), &options)?;

            if ast {
                let json = serde_json::to_string_pretty(&parsed.module)?;
                println!("{json}");
            } else {
                println!("{:#?}", parsed.module);
            }
        }
    }

    Ok(())
}

/// Options from `--config` (if any), with the command-line flags OR-ed in.
fn load_options(config: Option<&Path>, verbose: bool, debug: bool) -> Result<TranspileOptions> {
    let mut options = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))?
        }
        None => TranspileOptions::default(),
    };
    options.verbose |= verbose;
    options.debug |= debug;
    Ok(options)
}

/// `ZENO_LOG` wins when set; otherwise the level follows the flags.
fn setup_logging(options: &TranspileOptions) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = match std::env::var("ZENO_LOG") {
        Ok(directives) => EnvFilter::try_new(directives).context("invalid ZENO_LOG")?,
        Err(_) if options.debug => EnvFilter::new("debug"),
        Err(_) if options.verbose => EnvFilter::new("info"),
        Err(_) => EnvFilter::new("warn"),
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .try_init()
        .context("failed to install logger")?;
    Ok(())
}

fn read_source(input: &Path) -> Result<String> {
    std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

/// Name handed to SWC for the generated text: `main.zs` parses as `main.ts`.
fn typescript_name(input: &Path) -> String {
    input.with_extension("ts").display().to_string()
}

/// Read `input`, transpile it, and write the result to `output` when given.
/// The generated text is returned either way.
fn transpile_file(input: &Path, output: Option<&Path>, options: &TranspileOptions) -> Result<String> {
    info!(input = %input.display(), "transpiling");
    let source = read_source(input)?;
    let result = transpile(&source, options)
        .with_context(|| format!("failed to transpile {}", input.display()))?;

    if let Some(path) = output {
        std::fs::write(path, &result)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(output = %path.display(), "output written");
    }
    Ok(result)
}
