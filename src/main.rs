//! plugin-packager - Main entry point

use anyhow::Context;
use plugin_packager::cli::Cli;
use plugin_packager::{Environment, PackageReport, PackageRequest, Packager, PackagerConfig};
use plugin_packager::{PackagerError, process_guard};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initialize the logger. `RUST_LOG` overrides the verbosity flags.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);
    debug!(?cli, "CLI arguments parsed");

    // Build tool children are torn down on Ctrl+C
    if let Err(e) = process_guard::init_interrupt_handler() {
        warn!("Failed to install interrupt handler: {}", e);
    }

    match run(&cli) {
        Ok(report) => print_summary(&report, cli.dry_run),
        Err(e) => {
            let code = e
                .downcast_ref::<PackagerError>()
                .map(PackagerError::exit_code)
                .unwrap_or(1);
            error!(code, "packaging failed");
            eprintln!("\n✗ {:#}", e);
            std::process::exit(code);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<PackageReport> {
    let mut config = PackagerConfig::discover(cli.config.as_deref(), &cli.plugin_dir)?;
    if let Some(platform) = &cli.target_platform {
        config.target_platform = platform.clone();
    }
    config.validate().context("Invalid packager configuration")?;

    let request = PackageRequest {
        engine: cli.engine_path.clone(),
        plugin_dir: cli.plugin_dir.clone(),
        output_root: cli.resolved_output_root(),
        revision: cli.revision.clone(),
        dry_run: cli.dry_run,
    };
    info!(
        engine = %request.engine.display(),
        output = %request.output_root.display(),
        dry_run = request.dry_run,
        "packaging {}",
        config.product
    );

    let env = Environment::system(&cli.plugin_dir, cli.dry_run);
    let report = Packager::new(config, env).run(&request)?;
    Ok(report)
}

fn print_summary(report: &PackageReport, dry_run: bool) {
    let heading = if dry_run {
        "Dry run complete (nothing written)"
    } else {
        "Plugin packaged"
    };
    println!("\n✓ {}", heading);
    println!("  Engine:   {}", report.version);
    println!("  Version:  {}", report.label);
    println!("  Template: {}", report.template);
    println!("  Manifest: {}", report.manifest.display());
    println!("  Package:  {}", report.layout.package_dir.display());
    println!("  Archive:  {}", report.archive.display());
}
