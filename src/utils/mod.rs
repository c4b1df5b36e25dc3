pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays clean. Returns `true` only for the call that installed it.
pub fn init_tracing(default_directive: &str) -> bool {
    let mut installed = false;
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::from_default_env();
        let filter = match default_directive.parse::<Directive>() {
            Ok(directive) => filter.add_directive(directive),
            Err(err) => {
                eprintln!("ignoring log filter `{default_directive}`: {err}");
                filter
            }
        };
        installed = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok();
    });
    installed
}
