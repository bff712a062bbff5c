pub mod client;
pub mod config;
pub mod error;
pub mod events;

use tracing_subscriber::{fmt, EnvFilter};

pub use client::{CastReceipt, LiveUpdates, VotingClient};
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::{ClientEvent, CreationProgress, EventSender};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("suivote_client=debug,suivote_media=info,suivote_ledger=info,suivote_sync=info,warn")
    });

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
