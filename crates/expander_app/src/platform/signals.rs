use std::io::IsTerminal;

use engine_logging::{engine_error, engine_info, engine_warn};
use expander_engine::RetrySignal;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

/// Turns Ctrl-C into a cancellation of the running session. The engine saves
/// its position before the process exits.
pub(crate) fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        loop {
            if let Err(err) = tokio::signal::ctrl_c().await {
                engine_error!("Cannot listen for Ctrl-C: {}", err);
                return;
            }
            if cancel.is_cancelled() {
                engine_warn!("Already stopping; waiting for the session state to be saved");
                continue;
            }
            eprintln!("\nCtrl-C received, saving progress and exiting...");
            engine_warn!("Interrupt requested");
            cancel.cancel();
        }
    });
}

/// Listens for `r` + Enter on an interactive stdin and forwards it as a
/// retry request. Without a terminal every cooldown runs its full length.
pub(crate) fn spawn_retry_listener(retry: RetrySignal) {
    if !std::io::stdin().is_terminal() {
        engine_info!("stdin is not a terminal; cooldowns cannot be cut short");
        return;
    }
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_retry_command(&line) {
                engine_info!("Retry requested from the keyboard");
                retry.request();
            } else if !line.trim().is_empty() {
                engine_info!("Ignoring input {:?}; type 'r' + Enter during a cooldown to retry", line.trim());
            }
        }
    });
}

fn is_retry_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("r")
}
