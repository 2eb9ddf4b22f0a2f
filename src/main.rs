//! Plate assembler - inspect and preview plate-imaging acquisitions.
//!
//! This binary loads an acquisition directory into a lazy labeled array and
//! either summarises it or renders one position as a PNG.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plate_assembler::{
    acquisition::load_experiment_with,
    array::{CoordLabel, Dim, LabeledArray},
    config::{AcquisitionArgs, Cli, Command, InspectConfig, RenderConfig},
    render::{write_png, CompositeRenderer},
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    if let Some(threads) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            warn!("Could not size the worker pool: {}", e);
        }
    }

    match cli.command {
        Command::Inspect(config) => run_inspect(config),
        Command::Render(config) => run_render(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "plate_assembler=debug"
    } else {
        "plate_assembler=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(args: &AcquisitionArgs) -> Option<LabeledArray> {
    info!(
        "Loading {} acquisition from {}",
        args.experiment_type,
        args.path.display()
    );
    match load_experiment_with(&args.path, args.experiment_type, &args.assemble_options()) {
        Ok(array) => Some(array),
        Err(e) => {
            error!("Failed to load acquisition: {}", e);
            None
        }
    }
}

// =============================================================================
// Inspect Command
// =============================================================================

fn run_inspect(config: InspectConfig) -> ExitCode {
    let Some(array) = load(&config.acquisition) else {
        return ExitCode::FAILURE;
    };

    let missing = if config.check_missing {
        match array.missing_planes() {
            Ok(missing) => Some(missing),
            Err(e) => {
                error!("Failed to evaluate planes: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let summary = array.summary();
    if config.json {
        let mut json = match serde_json::to_value(&summary) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialise summary: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Some(missing) = &missing {
            json["missing_planes"] = missing
                .iter()
                .map(|labels| {
                    labels
                        .iter()
                        .map(|(dim, label)| (dim.name().to_string(), serde_json::json!(label)))
                        .collect::<serde_json::Map<_, _>>()
                        .into()
                })
                .collect::<Vec<serde_json::Value>>()
                .into();
        }
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to serialise summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("Acquisition: {}", config.acquisition.path.display());
    println!("─────────────────────────────────");
    let dims: Vec<&str> = summary.dims.iter().map(Dim::name).collect();
    println!("  dims:  ({})", dims.join(", "));
    println!(
        "  shape: ({})",
        summary
            .shape
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    for (dim, values) in &summary.coords {
        let labels: Vec<String> = (0..values.len())
            .filter_map(|i| values.get(i))
            .map(|label| label.to_string())
            .collect();
        println!("  {:<8} [{}]", dim.name(), labels.join(", "));
    }

    if let Some(missing) = &missing {
        println!();
        if missing.is_empty() {
            println!("✓ No missing planes");
        } else {
            println!("✗ {} missing plane(s):", missing.len());
            for labels in missing {
                let position: Vec<String> = labels
                    .iter()
                    .map(|(dim, label)| format!("{}={}", dim, label))
                    .collect();
                println!("  {}", position.join(" "));
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Render Command
// =============================================================================

fn run_render(config: RenderConfig) -> ExitCode {
    let Some(array) = load(&config.acquisition) else {
        return ExitCode::FAILURE;
    };

    let selection = [
        (Dim::Time, CoordLabel::Int(config.time)),
        (Dim::Region, CoordLabel::from(config.region.as_str())),
        (Dim::Field, CoordLabel::from(config.field.as_str())),
    ];
    let renderer = CompositeRenderer::new(!config.no_normalize);

    let image = match renderer.render_at(&array, &selection) {
        Ok(image) => image,
        Err(e) => {
            error!(
                time = config.time,
                region = %config.region,
                field = %config.field,
                "Failed to render: {}",
                e
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_png(&image, &config.output) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
