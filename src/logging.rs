//! Inicialização do tracing/logging.
//!
//! Os logs vão para stderr; a linha de resultado do `poll` sai em stdout.

use tracing_subscriber::EnvFilter;

/// Instala o subscriber global do `tracing`, escrevendo em stderr.
///
/// `RUST_LOG` tem precedência; sem ele o nível é `info`, ou `debug` com
/// `verbose`. Chamadas repetidas são ignoradas.
pub fn init(verbose: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_picks_level() {
        assert_eq!(default_directive(false), "info");
        assert_eq!(default_directive(true), "debug");
    }

    #[test]
    fn default_directives_parse_as_filters() {
        // Builds the filter only; the global subscriber stays untouched.
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_directive(verbose)).is_ok());
        }
    }
}
