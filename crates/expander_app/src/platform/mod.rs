//! Terminal, environment and signal integration around the engine.
mod app;
mod config;
mod logging;
mod modifiers;
mod persistence;
mod prompts;
mod signals;

pub use app::run_app;
