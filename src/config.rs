//! Configuration for the `pbg` CLI binary.
//!
//! The library itself (`classifier`, `scanner`, `parser`, `evaluator`) is
//! config-free — it only ever sees the expression string and a dictionary
//! callback. This module exists for the demo binary, layered the way the
//! grounding crate layers its own configuration: defaults, then an optional
//! TOML file, then environment variables, via `figment`.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Runtime configuration for the `pbg` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// `RUST_LOG`-style filter directive for `tracing-subscriber`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit the parsed tree's canonical form to stderr before evaluating.
    #[serde(default)]
    pub print_canonical: bool,
}

fn default_log_filter() -> String {
    "pbg=warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            log_filter: default_log_filter(),
            print_canonical: false,
        }
    }
}

impl CliConfig {
    /// Loads configuration: defaults, then `pbg.toml` in the current
    /// directory if present, then `PBG_*` environment variables, each layer
    /// overriding the last.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(CliConfig::default()))
            .merge(Toml::file("pbg.toml"))
            .merge(Env::prefixed("PBG_"))
            .extract()
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_config_file() {
        let config = CliConfig::default();
        assert_eq!(config.log_filter, "pbg=warn");
        assert!(!config.print_canonical);
    }
}
