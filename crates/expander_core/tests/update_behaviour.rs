use std::sync::Once;

use expander_core::{update, QueryRun, QueryStep, RunEvent, RunLimits, StopReason};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn limits(target_unique: usize, max_pages: u32) -> RunLimits {
    RunLimits {
        target_unique,
        max_pages,
    }
}

fn recorded(accepted: usize) -> RunEvent {
    RunEvent::PageRecorded {
        accepted,
        has_more: true,
    }
}

#[test]
fn start_requests_the_resume_page() {
    init_logging();
    let (run, step) = update(QueryRun::new(5, 10, limits(100, 20)), RunEvent::Start);
    assert_eq!(step, QueryStep::Fetch { page: 5 });
    assert_eq!(run.unique_count(), 10);
}

#[test]
fn page_zero_is_treated_as_first_page() {
    let (_, step) = update(QueryRun::new(0, 0, limits(10, 10)), RunEvent::Start);
    assert_eq!(step, QueryStep::Fetch { page: 1 });
}

#[test]
fn cap_is_checked_between_pages_and_keeps_overshoot() {
    init_logging();
    let (run, step) = update(QueryRun::new(1, 0, limits(2, 100)), RunEvent::Start);
    assert_eq!(step, QueryStep::Fetch { page: 1 });

    let (run, step) = update(run, recorded(3));
    assert_eq!(
        step,
        QueryStep::Completed {
            total_unique: 3,
            reason: StopReason::TargetReached,
        }
    );
    assert!(run.is_finished());
    assert_eq!(run.page(), 2);
}

#[test]
fn page_limit_ends_query() {
    let run = QueryRun::new(1, 0, limits(100, 2));
    let (run, _) = update(run, RunEvent::Start);
    let (run, step) = update(run, recorded(1));
    assert_eq!(step, QueryStep::Fetch { page: 2 });
    let (_, step) = update(run, recorded(1));
    assert_eq!(
        step,
        QueryStep::Completed {
            total_unique: 2,
            reason: StopReason::PageLimit,
        }
    );
}

#[test]
fn partial_page_ends_query() {
    let run = QueryRun::new(1, 0, limits(100, 10));
    let (run, _) = update(run, RunEvent::Start);
    let (_, step) = update(
        run,
        RunEvent::PageRecorded {
            accepted: 4,
            has_more: false,
        },
    );
    assert_eq!(
        step,
        QueryStep::Completed {
            total_unique: 4,
            reason: StopReason::NoMorePages,
        }
    );
}

#[test]
fn empty_page_cools_down_once_then_ends() {
    init_logging();
    let run = QueryRun::new(3, 7, limits(100, 10));
    let (run, _) = update(run, RunEvent::Start);

    let (run, step) = update(run, RunEvent::PageEmpty);
    assert_eq!(step, QueryStep::PausedForRateLimit { resume_page: 3 });

    let (run, step) = update(run, RunEvent::CooldownElapsed);
    assert_eq!(step, QueryStep::Fetch { page: 3 });

    let (run, step) = update(run, RunEvent::PageEmpty);
    assert_eq!(
        step,
        QueryStep::Completed {
            total_unique: 7,
            reason: StopReason::EndOfResults,
        }
    );
    assert_eq!(run.page(), 3);
}

#[test]
fn cooldown_allowance_resets_after_a_successful_page() {
    let run = QueryRun::new(1, 0, limits(100, 10));
    let (run, _) = update(run, RunEvent::Start);
    let (run, _) = update(run, RunEvent::PageEmpty);
    let (run, _) = update(run, RunEvent::CooldownElapsed);
    let (run, step) = update(run, recorded(2));
    assert_eq!(step, QueryStep::Fetch { page: 2 });

    let (_, step) = update(run, RunEvent::PageEmpty);
    assert_eq!(step, QueryStep::PausedForRateLimit { resume_page: 2 });
}

#[test]
fn fetch_failure_aborts() {
    let run = QueryRun::new(1, 0, limits(100, 10));
    let (run, _) = update(run, RunEvent::Start);
    let (run, step) = update(
        run,
        RunEvent::FetchFailed {
            reason: "timeout".to_string(),
            fatal: false,
        },
    );
    assert_eq!(
        step,
        QueryStep::Aborted {
            reason: "timeout".to_string()
        }
    );
    assert!(step.is_terminal());
    assert!(run.is_finished());
}
