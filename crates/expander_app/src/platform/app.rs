use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use engine_logging::{engine_error, engine_info, engine_warn};
use expander_core::derive_queries;
use expander_engine::{
    CsvResultStore, EngineError, FileSessionStore, QueryRunner, RetrySignal, Scheduler,
    SearxFetcher, SessionContext, SessionOutcome,
};
use log::LevelFilter;
use tokio_util::sync::CancellationToken;

use super::config::AppConfig;
use super::logging;
use super::{modifiers, persistence, prompts, signals};

/// Exit status after a Ctrl-C with the session state saved (128 + SIGINT).
const EXIT_INTERRUPTED: u8 = 130;

pub fn run_app() -> ExitCode {
    logging::initialize(LevelFilter::Info);

    match run() {
        Ok(code) => code,
        Err(err) => {
            engine_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    config.log_summary();

    let modifiers = modifiers::load(&config.modifier_file);

    let mut input = io::stdin().lock();
    let mut output = io::stdout();
    let plan = persistence::plan_resume(&config.state_file, |saved| {
        prompts::confirm_resume(&mut input, &mut output, saved)
    })
    .context("failed to ask about the previous session")?;

    let cli_seed = env::args().nth(1).filter(|arg| !arg.trim().is_empty());
    let seed = match (plan.seed.clone(), cli_seed) {
        (Some(saved), cli) => {
            if cli.as_deref().is_some_and(|cli| cli.trim() != saved) {
                engine_warn!("Ignoring seed argument; resuming saved seed \"{}\"", saved);
            }
            saved
        }
        (None, Some(cli)) => cli,
        (None, None) => {
            prompts::ask_line(&mut input, &mut output, "Enter the seed query: ")
                .context("failed to read the seed query")?
                .unwrap_or_default()
        }
    };
    // The retry listener reads stdin from here on.
    drop(input);

    if seed.trim().is_empty() {
        engine_warn!("No seed query given; nothing to do");
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(saved_output) = plan.output_path.clone() {
        if saved_output != config.output_path {
            engine_warn!(
                "Resumed session writes to {:?}, not the configured {:?}",
                saved_output,
                config.output_path
            );
            config.output_path = saved_output;
        }
    }

    let queries = derive_queries(&seed, &modifiers);
    let initial = plan.initial_state(queries.len());
    engine_info!(
        "{} derived queries from seed \"{}\"",
        queries.len(),
        seed.trim()
    );

    let store = CsvResultStore::open(&config.output_path)
        .with_context(|| format!("cannot open output {:?}", config.output_path))?;
    let fetcher = SearxFetcher::new(config.fetch_settings())
        .map_err(|err| anyhow!("invalid search endpoint {:?}: {}", config.endpoint, err))?;
    let session = FileSessionStore::new(
        &config.state_file,
        SessionContext {
            seed: seed.trim().to_string(),
            query_count: queries.len(),
            output_path: config.output_path.display().to_string(),
        },
    );

    let cancel = CancellationToken::new();
    let retry = RetrySignal::new();
    let runtime = tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
    let result = runtime.block_on(async {
        signals::spawn_interrupt_handler(cancel.clone());
        signals::spawn_retry_listener(retry.clone());

        let runner = QueryRunner::new(
            Box::new(fetcher),
            Box::new(store),
            Box::new(session),
            config.run_settings(),
            cancel.clone(),
            retry.clone(),
        );
        Scheduler::new(runner).run(&queries, initial).await
    });
    // A pending stdin read would block an orderly shutdown.
    runtime.shutdown_background();

    match result {
        Ok(SessionOutcome::Completed(summary)) => {
            println!("Done. {summary}. Results in {}", config.output_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Ok(SessionOutcome::Interrupted { checkpoint }) => {
            engine_info!(
                "Progress saved to {:?} (query {}, page {}); run again to resume",
                config.state_file,
                checkpoint.current_query_index + 1,
                checkpoint.current_page
            );
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
        Err(err @ EngineError::Store(_)) => {
            engine_error!(
                "FATAL: {}. Session state in {:?} is kept for a later resume.",
                err,
                config.state_file
            );
            Ok(ExitCode::FAILURE)
        }
        Err(err @ EngineError::Checkpoint(_)) => {
            engine_error!("FATAL: {}", err);
            eprintln!("FATAL: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}
