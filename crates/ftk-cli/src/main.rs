use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ftk")]
#[command(about = "FuelTrack Pro station CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Station master-data commands
    Station {
        #[command(subcommand)]
        cmd: StationCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> price override...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Shift capture and commit
    Shift {
        #[command(subcommand)]
        cmd: ShiftCmd,
    },

    /// Ledger lifecycle commands
    Ledger {
        #[command(subcommand)]
        cmd: LedgerCmd,
    },

    /// Audit trail utilities
    Audit {
        #[command(subcommand)]
        cmd: AuditCmd,
    },

    /// Outbound projections of committed records
    Export {
        #[command(subcommand)]
        cmd: ExportCmd,
    },

    /// Free-text commentary over recent records
    Insight {
        #[command(subcommand)]
        cmd: InsightCmd,
    },

    /// Generated sample data. Not for production use.
    #[cfg(feature = "testkit")]
    Demo {
        #[command(subcommand)]
        cmd: DemoCmd,
    },
}

#[derive(Subcommand)]
enum StationCmd {
    /// Load, merge and validate station config; print a summary
    Validate {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ShiftCmd {
    /// Run a full shift from a capture sheet: validate, commit, persist
    Run {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Capture sheet YAML (operator_id, openings, closings, dips)
        #[arg(long)]
        sheet: String,

        /// Ledger JSON file (created if missing)
        #[arg(long)]
        ledger: String,

        /// Audit JSONL file (appended; created if missing)
        #[arg(long)]
        audit: String,

        /// Directory for per-grade CSV extracts
        #[arg(long = "out-dir")]
        out_dir: Option<String>,

        /// Disable the audit hash chain
        #[arg(long = "no-hash-chain", default_value_t = false)]
        no_hash_chain: bool,
    },
}

#[derive(Subcommand)]
enum LedgerCmd {
    /// Print rollup totals over the whole ledger
    Summarize {
        /// Ledger JSON file
        #[arg(long)]
        ledger: String,
    },

    /// Approve and lock a pending record (supervisor or admin)
    Approve {
        /// Ledger JSON file
        #[arg(long)]
        ledger: String,

        /// Record id (uuid)
        #[arg(long = "record-id")]
        record_id: String,

        /// Acting user id (role comes from station config)
        #[arg(long)]
        user: String,

        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Audit JSONL file (appended; created if missing)
        #[arg(long)]
        audit: String,

        /// Disable the audit hash chain
        #[arg(long = "no-hash-chain", default_value_t = false)]
        no_hash_chain: bool,
    },

    /// Amend the metered sales figure on a pending record
    Amend {
        /// Ledger JSON file
        #[arg(long)]
        ledger: String,

        /// Record id (uuid)
        #[arg(long = "record-id")]
        record_id: String,

        /// Acting user id (role comes from station config)
        #[arg(long)]
        user: String,

        /// Corrected metered sales, litres
        #[arg(long)]
        sales: f64,

        /// Human reason, stored on the version history entry
        #[arg(long)]
        reason: String,

        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Audit JSONL file (appended; created if missing)
        #[arg(long)]
        audit: String,

        /// Disable the audit hash chain
        #[arg(long = "no-hash-chain", default_value_t = false)]
        no_hash_chain: bool,
    },
}

#[derive(Subcommand)]
enum AuditCmd {
    /// Verify the hash chain of an audit JSONL file
    Verify {
        /// Audit JSONL file
        #[arg(long)]
        path: String,
    },
}

#[derive(Subcommand)]
enum ExportCmd {
    /// Write the CSV extract for one committed record
    Record {
        /// Ledger JSON file
        #[arg(long)]
        ledger: String,

        /// Record id (uuid)
        #[arg(long = "record-id")]
        record_id: String,

        /// Directory the extract is written into
        #[arg(long = "out-dir")]
        out_dir: String,

        /// Also print the alert summary for the record
        #[arg(long, default_value_t = false)]
        notify: bool,
    },
}

#[derive(Subcommand)]
enum InsightCmd {
    /// Fetch commentary over the most recent records
    Day {
        /// Ledger JSON file
        #[arg(long)]
        ledger: String,

        /// Use the canned offline provider instead of the hosted API
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Deadline for the hosted call, seconds
        #[arg(long = "timeout-secs", default_value_t = 10)]
        timeout_secs: u64,
    },
}

#[cfg(feature = "testkit")]
#[derive(Subcommand)]
enum DemoCmd {
    /// Seed the ledger with one generated operational day
    SampleDay {
        /// Operator id stamped on the generated records
        #[arg(long, default_value = "u1")]
        operator: String,

        /// Ledger JSON file (created if missing)
        #[arg(long)]
        ledger: String,

        /// Audit JSONL file (appended; created if missing)
        #[arg(long)]
        audit: String,

        /// Disable the audit hash chain
        #[arg(long = "no-hash-chain", default_value_t = false)]
        no_hash_chain: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev-time bootstrap; deployments set env vars directly.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Station { cmd } => match cmd {
            StationCmd::Validate { config_paths } => {
                let refs = commands::path_refs(&config_paths);
                let loaded = ftk_config::load_station(&refs)?;
                println!("station_ok=true name={}", loaded.station.name);
                println!(
                    "tanks={} meters={} users={} prices={}",
                    loaded.station.tanks.len(),
                    loaded.station.meters.len(),
                    loaded.station.users.len(),
                    loaded.station.prices.len()
                );
                println!("config_hash={}", loaded.config_hash);
            }
        },

        Commands::ConfigHash { paths } => {
            let refs = commands::path_refs(&paths);
            let loaded = ftk_config::load_layered_yaml(&refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Shift { cmd } => match cmd {
            ShiftCmd::Run {
                config_paths,
                sheet,
                ledger,
                audit,
                out_dir,
                no_hash_chain,
            } => {
                commands::shift::run(
                    &config_paths,
                    &sheet,
                    &ledger,
                    &audit,
                    out_dir.as_deref(),
                    !no_hash_chain,
                )?;
            }
        },

        Commands::Ledger { cmd } => match cmd {
            LedgerCmd::Summarize { ledger } => {
                commands::ledger::summarize(&ledger)?;
            }
            LedgerCmd::Approve {
                ledger,
                record_id,
                user,
                config_paths,
                audit,
                no_hash_chain,
            } => {
                commands::ledger::approve(
                    &ledger,
                    &record_id,
                    &user,
                    &config_paths,
                    &audit,
                    !no_hash_chain,
                )?;
            }
            LedgerCmd::Amend {
                ledger,
                record_id,
                user,
                sales,
                reason,
                config_paths,
                audit,
                no_hash_chain,
            } => {
                commands::ledger::amend(
                    &ledger,
                    &record_id,
                    &user,
                    sales,
                    &reason,
                    &config_paths,
                    &audit,
                    !no_hash_chain,
                )?;
            }
        },

        Commands::Audit { cmd } => match cmd {
            AuditCmd::Verify { path } => match ftk_audit::verify_hash_chain(&path)? {
                ftk_audit::VerifyResult::Valid { lines } => {
                    println!("audit_ok=true lines={lines}");
                }
                ftk_audit::VerifyResult::Broken { line, reason } => {
                    anyhow::bail!("audit chain broken at line {line}: {reason}");
                }
            },
        },

        Commands::Export { cmd } => match cmd {
            ExportCmd::Record {
                ledger,
                record_id,
                out_dir,
                notify,
            } => {
                commands::export::record(&ledger, &record_id, &out_dir, notify)?;
            }
        },

        Commands::Insight { cmd } => match cmd {
            InsightCmd::Day {
                ledger,
                offline,
                timeout_secs,
            } => {
                commands::insight::day(&ledger, offline, timeout_secs).await?;
            }
        },

        #[cfg(feature = "testkit")]
        Commands::Demo { cmd } => match cmd {
            DemoCmd::SampleDay {
                operator,
                ledger,
                audit,
                no_hash_chain,
            } => {
                commands::demo::sample_day(&operator, &ledger, &audit, !no_hash_chain)?;
            }
        },
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
