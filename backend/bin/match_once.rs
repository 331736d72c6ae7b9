use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::sync::Arc;
use surprise_matcher::{
    db::{get_db_pool, DatabaseConfig, PgMatchStore},
    models::RunResult,
    services::{
        run_match_job, HttpNotifier, MatchProcessor, MatchRunError, NoopNotifier, RandomSelector,
    },
    utils::{init_logging, config::Config},
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let matches = Command::new("match-once")
        .about("Run one surprise-me matching pass and print the run result as JSON")
        .arg(
            Arg::new("seed")
                .long("seed")
                .short('s')
                .help("Seed for candidate selection (overrides MATCH_RNG_SEED)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("skip-notify")
                .long("skip-notify")
                .help("Do not send created chatrooms to the backend")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let seed = matches.get_one::<u64>("seed").copied();
    let skip_notify = matches.get_flag("skip-notify");

    let config = Config::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    info!("🎲 Starting one-off match run...");

    let notify_url = if skip_notify {
        None
    } else {
        Some(config.require_notify_url()?)
    };
    let matcher_config = config.matcher_config().map_err(MatchRunError::Config)?;

    let result = match get_db_pool(&db_config).await {
        Ok(pool) => {
            let processor = MatchProcessor::new(
                Arc::new(PgMatchStore::new(pool)),
                Arc::new(RandomSelector::from_seed_option(seed.or(config.match_seed))),
                matcher_config,
            );

            match notify_url {
                Some(url) => run_match_job(&processor, &HttpNotifier::new(url)).await,
                None => run_match_job(&processor, &NoopNotifier).await,
            }
        }
        Err(e) => {
            let e = MatchRunError::Connect(e);
            error!("❌ {}", e);
            RunResult::failure(e)
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
