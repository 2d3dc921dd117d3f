//! Startup supervision for the auto-apply engine.
//!
//! Runs the engine's due-check once at application start: waits a configured
//! delay, retries transient failures with a per-attempt timeout, guarantees a
//! single in-flight run, and summarizes the outcome to a notifier. The engine
//! itself stays silent; everything human-facing comes from here.

pub use error::StartupError;
pub use notify::{LogNotifier, Notifier};
pub use settings::StartupSettings;
pub use supervisor::{RunState, StartupResult, Supervisor};

mod error;
mod notify;
mod settings;
mod supervisor;
