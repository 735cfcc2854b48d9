//! Tracing setup for the CLI

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "token_deployer=info,deployer_delivery=info,warn";

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` raises the deployer crates
/// to debug level. Safe to call more than once.
pub fn init_logging(debug: bool) {
	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if debug {
			EnvFilter::new(
				"token_deployer=debug,deployer_delivery=debug,deployer_account=debug,deployer_config=debug,info",
			)
		} else {
			EnvFilter::new(DEFAULT_FILTER)
		}
	});

	let _ = tracing_subscriber::registry()
		.with(
			fmt::layer()
				.with_target(debug)
				.with_thread_ids(false)
				.with_file(false)
				.with_line_number(false)
				.compact(),
		)
		.with(env_filter)
		.try_init();
}
