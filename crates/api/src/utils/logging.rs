use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "emo=info,emo_app=info,emo_infra=info";

/// Build the log filter from `RUST_LOG`, falling back to
/// [`DEFAULT_LOG_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays valid JSON.
///
/// Set `EMO_LOG_FORMAT=json` for structured output.
pub fn init_tracing() {
    let json =
        std::env::var("EMO_LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let builder =
        tracing_subscriber::fmt().with_env_filter(env_filter()).with_writer(std::io::stderr);

    // A subscriber may already be installed when embedded; keep that one.
    let _ = if json { builder.json().try_init() } else { builder.try_init() };
}
