//! Optional file-backed logging.
//!
//! The wizard owns the terminal, so logs never go to stdout or stderr.
//! Logging is enabled only when `RESUME_WIZARD_LOG` names a file; the
//! `RUST_LOG` filter syntax applies, defaulting to `info`.

use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "RESUME_WIZARD_LOG";

/// Installs the file-backed subscriber when `RESUME_WIZARD_LOG` is set.
/// Failures are swallowed; logging is never allowed to stop the wizard.
pub fn init_logging() {
    let Some(path) = std::env::var_os(LOG_ENV_VAR) else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}
