//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs the tracing subscriber
//! - runs the pipeline
//! - prints reports/plots and writes chart files

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, IndicatorsArgs, PipelineArgs};
use crate::domain::{FetchConfig, ForestConfig, IndicatorParams, PipelineConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `stx` binary.
pub fn run() -> Result<(), AppError> {
    // `stx` and `stx --symbol MSFT` behave like `stx run ...`.
    //
    // Clap requires a subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => {
            init_tracing("info");
            handle_run(&args)
        }
        Command::Indicators(args) => {
            init_tracing("info");
            handle_indicators(&args)
        }
        Command::Tui(args) => {
            // Log lines would tear the alternate screen.
            init_tracing("warn");
            crate::tui::run(config_from_args(&args))
        }
    }
}

/// Install a stderr subscriber; `RUST_LOG` overrides `default_level`.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_run(args: &PipelineArgs) -> Result<(), AppError> {
    let config = config_from_args(args);
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&run, &config));

    if config.plot {
        let plot = crate::plot::render_prediction_plot(
            &run.split.test,
            &run.training,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(dir) = &config.chart_dir {
        let written = crate::plot::write_charts(dir, &run.enriched, &run.split.test, &run.training)?;
        info!(count = written.len(), dir = %dir.display(), "charts written");
        for path in written {
            println!("chart: {}", path.display());
        }
    }

    Ok(())
}

fn handle_indicators(args: &IndicatorsArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.pipeline);
    let (_, enriched) = pipeline::load_enriched(&config)?;
    print!("{}", crate::report::format_indicator_tail(&enriched, args.tail));
    Ok(())
}

pub fn config_from_args(args: &PipelineArgs) -> PipelineConfig {
    PipelineConfig {
        symbol: args.symbol.trim().to_uppercase(),
        start: args.start,
        end: args.end,
        source: args.source,
        csv_path: args.csv.clone(),
        fetch: FetchConfig {
            timeout_secs: args.timeout_secs,
            retries: args.retries,
        },
        indicators: IndicatorParams {
            macd_fast: args.macd_fast,
            macd_slow: args.macd_slow,
            macd_signal: args.macd_signal,
            rsi_window: args.rsi_window,
            bollinger_window: args.bb_window,
            bollinger_k: args.bb_k,
        },
        test_fraction: args.test_fraction,
        forest: ForestConfig {
            n_trees: args.trees,
            max_depth: args.max_depth,
            seed: args.seed,
            ..ForestConfig::default()
        },
        chart_dir: (!args.no_charts).then(|| args.out_dir.clone()),
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
    }
}

/// Rewrite argv so `stx` defaults to `stx run`.
///
/// Rules:
/// - `stx`                       -> `stx run`
/// - `stx --symbol MSFT ...`     -> `stx run --symbol MSFT ...`
/// - `stx --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "indicators" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
