/// Inputs fed to the query state machine by the IO driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// The query is about to start (fresh or resumed).
    Start,
    /// A page with results was fully offered to the result store.
    PageRecorded { accepted: usize, has_more: bool },
    /// The endpoint answered with an empty page.
    PageEmpty,
    /// The rate-limit cooldown finished or was cut short by the operator.
    CooldownElapsed,
    /// The fetcher gave up on the page.
    FetchFailed { reason: String, fatal: bool },
}
