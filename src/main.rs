use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voicerig::{Bootstrap, Config};

/// Voicerig - provision and launch the local voice-assistant pipeline
#[derive(Parser)]
#[command(name = "voicerig", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Spawn workloads directly instead of in terminal windows
    #[arg(long, env = "VOICERIG_NO_TERMINAL")]
    no_terminal: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Cache the credential, install packages, and download assets
    Provision,
    /// Select the launch mode and start the four workloads
    Launch,
    /// Show what a launch would do without starting anything
    Plan,
    /// Show credential, script, asset, and tool readiness
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voicerig=info",
        1 => "info,voicerig=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_with_options(cli.no_terminal);
    tracing::debug!(?config, "loaded configuration");
    let bootstrap = Bootstrap::new(config);

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Provision => cmd_provision(&bootstrap).await,
            Command::Launch => cmd_launch(&bootstrap).await,
            Command::Plan => cmd_plan(&bootstrap),
            Command::Status => {
                cmd_status(&bootstrap);
                Ok(())
            }
        };
    }

    tracing::info!("starting voice rig bootstrap");
    bootstrap.run().await?;
    Ok(())
}

/// Run the provisioning phases only
async fn cmd_provision(bootstrap: &Bootstrap) -> anyhow::Result<()> {
    bootstrap.provision().await?;
    println!("Provisioning complete");
    Ok(())
}

/// Launch the pipeline workloads and leave them running
async fn cmd_launch(bootstrap: &Bootstrap) -> anyhow::Result<()> {
    let handles = bootstrap.launch().await?;
    println!("Launched {} workloads", handles.len());
    Ok(())
}

/// Print the launch plan
fn cmd_plan(bootstrap: &Bootstrap) -> anyhow::Result<()> {
    let plan = bootstrap.plan()?;
    println!("Launch mode: {}", plan.mode);
    for script in &plan.missing_scripts {
        println!("  missing script: {script}");
    }
    for workload in &plan.workloads {
        println!(
            "  [{}] {} (in {})",
            workload.role,
            workload.command,
            workload.workdir.display()
        );
    }
    Ok(())
}

/// Print host readiness
fn cmd_status(bootstrap: &Bootstrap) {
    let status = bootstrap.status();
    let credential = if status.credential_cached {
        "cached"
    } else {
        "not cached"
    };
    println!("Credential: {credential}");
    println!("Launch mode: {}", status.mode);
    print_missing("scripts", &status.missing_scripts);
    print_missing("assets", &status.missing_assets);
    print_missing("tools", &status.missing_tools);
}

fn print_missing(kind: &str, items: &[String]) {
    if items.is_empty() {
        println!("Missing {kind}: none");
    } else {
        println!("Missing {kind}: {}", items.join(", "));
    }
}
