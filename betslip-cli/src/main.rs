use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// Import from betslip-core
use betslip_core::{panic_message, DocumentProcessor, MatchRecord, ParsingConfig};

// Import CLI utilities
use betslip_cli::{init_logging, output};

#[derive(Parser)]
#[command(name = "betslip")]
#[command(about = "Extract a structured arbitrage record from a betting slip and print it as JSON")]
struct Args {
    /// Slip to process (.pdf, or .txt with pages separated by form feed)
    #[arg(required_unless_present = "print_default_config")]
    input: Option<PathBuf>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Only read the first N pages (overrides scanner.max_pages)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Indent the JSON record
    #[arg(long)]
    pretty: bool,

    /// Log timings of every pipeline step
    #[arg(long)]
    profile: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    /// Captures: page text, scanned lines, bet blocks, resolved bets and the record
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: PathBuf,

    /// Print the built-in configuration as YAML and exit
    #[arg(long)]
    print_default_config: bool,

    /// Raise log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.profile);

    if args.print_default_config {
        return match ParsingConfig::default().to_yaml() {
            Ok(yaml) => {
                print!("{yaml}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Failed to render default config: {e:#}");
                ExitCode::FAILURE
            }
        };
    }

    // A panic anywhere below still ends with the null record on stdout
    let result = std::panic::catch_unwind(|| run(&args))
        .unwrap_or_else(|payload| Err(anyhow!("internal error: {}", panic_message(payload.as_ref()))));

    match result.and_then(|record| output::render_record(&record, args.pretty)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Processing failed: {e:#}");
            println!("{}", output::render_null_record(args.pretty));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<MatchRecord> {
    let input = args
        .input
        .as_deref()
        .ok_or_else(|| anyhow!("no input document given"))?;

    let config = load_config(args);
    let processor = DocumentProcessor::for_path(input, &config)?;
    tracing::info!("🔧 Using {}", processor.preprocessor_name());

    if args.dump_stages {
        return dump_stages(&processor, input, &args.stages_dir);
    }

    processor.process_file_with_profiling(input, args.profile)
}

fn load_config(args: &Args) -> ParsingConfig {
    let mut config = ParsingConfig::load_with_fallback(args.config.as_deref());

    if let Some(config_path) = &args.config {
        tracing::info!("📋 Loaded config from: {config_path}");
    } else {
        tracing::info!("📋 Using default config");
    }

    // Apply CLI overrides to config
    if let Some(max_pages) = args.max_pages {
        config.scanner.max_pages = max_pages as usize;
    }
    config
}

fn dump_stages(processor: &DocumentProcessor, input: &Path, stages_dir: &Path) -> Result<MatchRecord> {
    tracing::info!("🔬 Pipeline stage dump mode");
    let stages = processor.capture_stages(input)?;
    output::save_stages(&stages, input, stages_dir)?;
    tracing::info!("✅ All stages dumped to: {}", stages_dir.display());
    Ok(stages.record)
}
