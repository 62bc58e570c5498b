//! mysql-dump CLI - dependency-ordered SQL dumps of MySQL databases.

mod output;

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chrono::Local;
use clap::{Parser, Subcommand};
use mysql_dump::{Config, DumpError, ExportResult, Exporter, MysqlSource};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Parser)]
#[command(name = "mysql-dump")]
#[command(about = "Dependency-ordered SQL dumps of MySQL databases")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Abort after this many seconds; 0 disables the timeout
    #[arg(long, default_value = "0")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a database to a SQL script
    Export {
        /// Override source database
        #[arg(long)]
        database: Option<String>,

        /// Override output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Override output file name (without extension)
        #[arg(long)]
        file_name: Option<String>,

        /// Gzip the script
        #[arg(long)]
        compress: bool,

        /// Write the script to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },

    /// Print the resolved table, routine and view order
    Order {
        /// Override source database
        #[arg(long)]
        database: Option<String>,
    },

    /// Test the source database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DumpError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    // Flags may fill in required settings, so validation waits for them.
    let mut config = Config::load_unvalidated(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let cancel_token = setup_signal_handler();
    let timeout = (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout));

    match cli.command {
        Commands::Export {
            database,
            output_dir,
            file_name,
            compress,
            stdout,
        } => {
            if let Some(db) = database {
                config.source.database = db;
            }
            if let Some(dir) = output_dir {
                config.output.directory = dir;
            }
            if let Some(name) = file_name {
                config.output.file_name = Some(name);
            }
            if compress {
                config.output.compress = true;
            }
            config.validate()?;

            let database = database_name(&config)?;
            let config_hash = config.hash();

            let result = cancellable(&cancel_token, timeout, async {
                let source = MysqlSource::new(&config.source).await?;
                let exporter = Exporter::new(source, config.export_options());
                let result = exporter.export(&database).await;
                exporter.source().close().await;
                result
            })
            .await?;

            for warning in &result.warnings {
                warn!("{} {} skipped: {}", warning.kind, warning.name, warning.message);
            }

            if stdout {
                result.script.write_to(std::io::stdout().lock())?;
                print_summary(&result, None, &config_hash, cli.output_json, true)?;
            } else {
                let name = config
                    .output
                    .file_name
                    .clone()
                    .unwrap_or_else(|| output::default_file_name(&database, Local::now()));
                let path = output::script_path(&config.output.directory, &name, config.output.compress);
                output::write_script(&result.script, &path, config.output.compress)?;
                print_summary(&result, Some(&path), &config_hash, cli.output_json, false)?;
            }
        }

        Commands::Order { database } => {
            if let Some(db) = database {
                config.source.database = db;
            }
            config.validate()?;
            let database = database_name(&config)?;

            let plan = cancellable(&cancel_token, timeout, async {
                let source = MysqlSource::new(&config.source).await?;
                let exporter = Exporter::new(source, config.export_options());
                let plan = exporter.plan(&database).await;
                exporter.source().close().await;
                plan
            })
            .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!("Dependency order for {}:", plan.database);
                for resolution in [&plan.tables, &plan.routines, &plan.views] {
                    println!("\n  {}s ({}):", resolution.kind, resolution.order.len());
                    for (i, name) in resolution.order.iter().enumerate() {
                        let marker = if resolution.forced.contains(name) {
                            "  (cycle broken)"
                        } else {
                            ""
                        };
                        println!("    {:>3}. {}{}", i + 1, name, marker);
                    }
                }
            }
        }

        Commands::HealthCheck => {
            config.validate()?;
            let started = Instant::now();
            let version = cancellable(&cancel_token, timeout, async {
                let source = MysqlSource::new(&config.source).await?;
                let version = source.health_check().await;
                source.close().await;
                version
            })
            .await?;
            let latency_ms = started.elapsed().as_millis() as u64;

            if cli.output_json {
                let report = serde_json::json!({
                    "healthy": true,
                    "source_version": version,
                    "source_latency_ms": latency_ms,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Health Check Results:");
                println!("  Source (MySQL {}): OK ({}ms)", version, latency_ms);
            }
        }
    }

    Ok(())
}

fn database_name(config: &Config) -> Result<String, DumpError> {
    config
        .source
        .database_name()
        .map(str::to_string)
        .ok_or_else(|| DumpError::Config("source.database is required".to_string()))
}

fn print_summary(
    result: &ExportResult,
    path: Option<&PathBuf>,
    config_hash: &str,
    json: bool,
    to_stderr: bool,
) -> Result<(), DumpError> {
    let mut lines = Vec::new();
    if json {
        lines.push(result.to_json()?);
    } else {
        lines.push(String::new());
        lines.push(if result.is_complete() {
            "Export completed!".to_string()
        } else {
            "Export completed with warnings".to_string()
        });
        lines.push(format!("  Database: {}", result.database));
        if let Some(path) = path {
            lines.push(format!("  File: {}", path.display()));
        }
        lines.push(format!("  Duration: {:.2}s", result.duration_seconds));
        lines.push(format!(
            "  Tables: {}, routines: {}, views: {}",
            result.table_order.len(),
            result.routine_order.len(),
            result.view_order.len()
        ));
        lines.push(format!("  Script size: {} bytes", result.script_bytes));
        lines.push(format!("  Config hash: {}", config_hash));
        if !result.forced_placements.is_empty() {
            let names: Vec<String> = result
                .forced_placements
                .iter()
                .map(|f| format!("{} {}", f.kind, f.name))
                .collect();
            lines.push(format!("  Cycles broken at: {}", names.join(", ")));
        }
        for warning in &result.warnings {
            lines.push(format!(
                "  Skipped {} {}: {}",
                warning.kind, warning.name, warning.message
            ));
        }
    }

    for line in lines {
        if to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Run `work` until it finishes, the token is cancelled or the timeout
/// elapses. Nothing of a cancelled export is kept.
async fn cancellable<T, F>(
    token: &CancellationToken,
    timeout: Option<Duration>,
    work: F,
) -> Result<T, DumpError>
where
    F: Future<Output = Result<T, DumpError>>,
{
    let deadline = async {
        match timeout {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = work => result,
        _ = token.cancelled() => Err(DumpError::Cancelled),
        _ = deadline => {
            warn!("Timed out after {}s", timeout.map(|t| t.as_secs()).unwrap_or_default());
            Err(DumpError::Cancelled)
        }
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Cancel the returned token on SIGINT or SIGTERM.
#[cfg(unix)]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();

    for (kind, label) in [
        (SignalKind::interrupt(), "SIGINT"),
        (SignalKind::terminate(), "SIGTERM"),
    ] {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            match signal(kind) {
                Ok(mut stream) => {
                    stream.recv().await;
                    eprintln!("\nReceived {}. Cancelling export...", label);
                    token.cancel();
                }
                Err(e) => warn!("Failed to install {} handler: {}", label, e),
            }
        });
    }

    cancel_token
}

/// Cancel the returned token on Ctrl-C.
#[cfg(not(unix))]
fn setup_signal_handler() -> CancellationToken {
    let cancel_token = CancellationToken::new();
    let token = cancel_token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("\nReceived Ctrl-C. Cancelling export...");
                token.cancel();
            }
            Err(e) => warn!("Failed to install Ctrl-C handler: {}", e),
        }
    });

    cancel_token
}
