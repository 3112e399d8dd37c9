use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lgs")]
#[command(about = "League standings CLI", long_about = None)]
struct Cli {
    /// Layered config paths in merge order (base -> env -> local ...)
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// List teams in standings order
    Teams {
        /// Only teams in this conference (exact match)
        #[arg(long)]
        conference: Option<String>,
    },

    /// List matches by date and time
    Matches {
        /// Only matches with this status: scheduled | in_progress | finished
        #[arg(long)]
        status: Option<String>,
    },

    /// Record or correct a match result
    Result {
        #[arg(long)]
        match_id: i32,

        /// Home team score
        #[arg(long = "home", allow_negative_numbers = true)]
        home_score: i32,

        /// Away team score
        #[arg(long = "away", allow_negative_numbers = true)]
        away_score: i32,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_paths: Vec<&str> = cli.config_paths.iter().map(|s| s.as_str()).collect();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = commands::connect(&config_paths).await?;
            match cmd {
                DbCmd::Status => {
                    let s = lgs_db::status(&pool).await?;
                    println!(
                        "db_ok={} has_teams_table={} has_matches_table={}",
                        s.ok, s.has_teams_table, s.has_matches_table
                    );
                }
                DbCmd::Migrate => {
                    lgs_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = lgs_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Teams { conference } => {
            commands::standings::teams(&config_paths, conference).await?;
        }

        Commands::Matches { status } => {
            commands::standings::matches(&config_paths, status).await?;
        }

        Commands::Result {
            match_id,
            home_score,
            away_score,
        } => {
            commands::standings::record_result(&config_paths, match_id, home_score, away_score)
                .await?;
        }
    }

    Ok(())
}
