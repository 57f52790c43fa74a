//! Logging setup
//!
//! Every component logs through `tracing` with a bracketed prefix naming the
//! component (`[Transport]`, `[Bus]`, `[Store]`, `[Editor]`, `[Api]`,
//! `[Session]`, `[Config]`). Binaries call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber filtered by `RUST_LOG`
///
/// Falls back to `default_directive` (e.g. `"lexdraft=info"`) when
/// `RUST_LOG` is unset or invalid. Returns `false` when a global subscriber
/// was already installed.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
