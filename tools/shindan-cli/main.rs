use clap::Parser;
use shindan::prelude::*;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Structural analysis of an unzipped conversational agent export
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the unzipped agent export (the directory containing `flows/`)
    agent_dir: String,

    /// Agent resource name used as prefix for every fully-qualified ID
    #[arg(long, default_value = "")]
    agent_id: String,

    /// Flow to run a reachability query against
    #[arg(long)]
    flow: Option<String>,

    /// Page the reachability query starts from
    #[arg(long, default_value = "Start Page")]
    from_page: String,

    /// Maximum number of transitions to follow, unbounded when omitted
    #[arg(long)]
    max_depth: Option<usize>,

    /// Keep special pages such as "End Session" in the reachability result
    #[arg(long)]
    keep_special_pages: bool,

    /// Print the report as JSON instead of the text summary
    #[arg(long)]
    json: bool,

    /// Save a binary snapshot of the report to this path
    #[arg(long)]
    save: Option<String>,

    /// Warn instead of failing when a flow's start page routes nowhere
    #[arg(long)]
    lenient: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let total_start = Instant::now();

    // --- 1. Export Loading ---
    let load_start = Instant::now();
    let export = ExportDirectory::new(&cli.agent_dir)
        .load()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load export: {}", e)));
    let load_duration = load_start.elapsed();

    // --- 2. Analysis ---
    let analysis_start = Instant::now();
    let report = Analyzer::builder(export)
        .agent_id(cli.agent_id.as_str())
        .strict(!cli.lenient)
        .build()
        .analyze()
        .unwrap_or_else(|e| exit_with_error(&format!("Analysis failed: {}", e)));
    let analysis_duration = analysis_start.elapsed();

    // --- 3. Output ---
    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to render JSON: {}", e)));
        println!("{}", json);
    } else {
        println!("{}", ReportFormatter::format_report(&report));
    }

    if let Some(path) = &cli.save {
        report
            .save(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save report: {}", e)));
        info!(path = %path, "Saved report snapshot");
    }

    // --- 4. Reachability Query ---
    let checker = AgentChecker::new(report);
    if let Some(flow) = &cli.flow {
        let pages = checker
            .reachable_pages(flow)
            .from_page(cli.from_page.as_str())
            .max_depth(cli.max_depth)
            .filter_special_pages(!cli.keep_special_pages)
            .run()
            .unwrap_or_else(|e| exit_with_error(&format!("Reachability query failed: {}", e)));

        let depth = cli
            .max_depth
            .map_or("unbounded".to_string(), |d| d.to_string());
        println!(
            "\nPages reachable from '{}' in flow '{}' (depth {}):",
            cli.from_page, flow, depth
        );
        for page in pages {
            println!("  - {}", page);
        }
    }

    let unused_intents = checker.unused_intents();
    if !cli.json && !unused_intents.is_empty() {
        println!("\nUnused intents ({}):", unused_intents.len());
        for intent in unused_intents {
            println!("  - {}", intent);
        }
    }

    debug!(
        load = ?load_duration,
        analysis = ?analysis_duration,
        total = ?total_start.elapsed(),
        "Timings"
    );
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
