//! Merges CLI - Browse pending Ubuntu package merges

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use merges_lib::{
    ChangelogSide, Classification, Fetcher, MergesConfig, RecordQuery, SortKey, team_summary,
};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "merges")]
#[command(version)]
#[command(about = "Browse pending Ubuntu package merges", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Base URL the four merge reports are fetched from
    #[arg(long, global = true, value_name = "URL")]
    report_base_url: Option<String>,

    /// Proxy prefix tried after direct access fails (repeatable)
    #[arg(long = "proxy", global = true, value_name = "PREFIX")]
    proxies: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pending merges
    List {
        /// Glob patterns to filter package names (e.g., "lib*", "python3-*")
        #[arg(value_name = "FILTER")]
        filters: Vec<String>,

        /// Only show these classifications (repeatable: -c main -c universe)
        #[arg(short = 'c', long = "classification", value_name = "CLASS")]
        classifications: Vec<Classification>,

        /// Only show merges owned by this team
        #[arg(long)]
        team: Option<String>,

        /// Only show merges uploaded by someone matching this text
        #[arg(long)]
        submitter: Option<String>,

        /// Minimum age in days
        #[arg(long, value_name = "DAYS")]
        min_age: Option<u32>,

        /// Maximum age in days
        #[arg(long, value_name = "DAYS")]
        max_age: Option<u32>,

        /// Sort order: default, name, age or classification
        #[arg(long, default_value_t = SortKey::Default)]
        sort: SortKey,

        /// Reverse the sort order
        #[arg(long)]
        reverse: bool,

        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Count pending merges per team
    Teams {
        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the changelog entries behind a merge
    Changelog {
        /// Source package name
        #[arg(value_name = "PACKAGE")]
        package: String,

        /// Which side to show
        #[arg(long, value_enum, default_value_t = SideArg::Both)]
        side: SideArg,

        /// Look the package up in this classification only
        #[arg(short = 'c', long = "classification", value_name = "CLASS")]
        classification: Option<Classification>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    Primary,
    Reference,
    Both,
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,merges_lib=info".to_string(),
            2 => "info,merges_lib=debug".to_string(),
            _ => "debug,merges_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

/// Environment configuration with command-line overrides applied.
fn build_config(cli: &Cli) -> Result<MergesConfig, Box<dyn std::error::Error>> {
    let mut config = MergesConfig::from_env()?;
    if let Some(url) = &cli.report_base_url {
        config = config.with_report_base_url(url)?;
    }
    Ok(config.with_proxies(cli.proxies.iter().cloned()))
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Fetcher::new(build_config(&cli)?)?;

    match cli.command {
        Commands::List {
            filters,
            classifications,
            team,
            submitter,
            min_age,
            max_age,
            sort,
            reverse,
            json,
        } => {
            let snapshot = fetcher.fetch_batches().await?;
            output::warn_failed_batches(&snapshot);

            let mut query = RecordQuery::new().patterns(filters).sort(sort).reverse(reverse);
            for classification in classifications {
                query = query.classification(classification);
            }
            if let Some(team) = team {
                query = query.team(team);
            }
            if let Some(submitter) = submitter {
                query = query.submitter(submitter);
            }
            if let Some(days) = min_age {
                query = query.min_age(days);
            }
            if let Some(days) = max_age {
                query = query.max_age(days);
            }

            let records = query.apply(snapshot.records)?;
            tracing::debug!(matched = records.len(), "query applied");

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{}", output::records_table(&records));
            }
        }
        Commands::Teams { json } => {
            let snapshot = fetcher.fetch_batches().await?;
            output::warn_failed_batches(&snapshot);

            let summary = team_summary(&snapshot.records);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", output::teams_table(&summary));
            }
        }
        Commands::Changelog {
            package,
            side,
            classification,
        } => {
            let snapshot = fetcher.fetch_batches().await?;
            let record = snapshot
                .records
                .iter()
                .find(|r| {
                    r.name == package && classification.is_none_or(|c| r.classification == c)
                })
                .ok_or_else(|| format!("'{package}' is not in the loaded merge reports"))?;

            match side {
                SideArg::Primary | SideArg::Reference => {
                    let side = match side {
                        SideArg::Primary => ChangelogSide::Primary,
                        _ => ChangelogSide::Reference,
                    };
                    let result = fetcher.fetch_changelog(record, side).await;
                    output::print_changelog_side(record, side, &result);
                }
                SideArg::Both => {
                    let pair = fetcher.fetch_changelog_pair(record).await;
                    output::print_changelog_side(record, ChangelogSide::Primary, &pair.primary);
                    println!();
                    output::print_changelog_side(record, ChangelogSide::Reference, &pair.reference);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.log_json);

    if let Err(e) = run(cli).await {
        output::print_error(e.as_ref());
        std::process::exit(1);
    }
}
