use std::net::SocketAddr;

use clap::Parser;
use ring_ai::{DEFAULT_API_BASE, DEFAULT_MODEL, ProviderConfig};

/// Environment variable older deployments used for the provider key.
pub const LEGACY_API_KEY_VAR: &str = "groq_api";

#[derive(Debug, Clone, Parser)]
#[command(name = "ring-server", about = "Serve the ring concept API")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "RING_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Base URL of the OpenAI-compatible provider.
    #[arg(long, env = "GROQ_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Chat model used for concept generation.
    #[arg(long, env = "GROQ_TEXT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Provider request timeout in seconds.
    #[arg(long, env = "RING_PROVIDER_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

impl Config {
    /// Provider settings, taking the key from `legacy_key` when none was given
    /// on the command line or in `GROQ_API_KEY`.
    pub fn provider(&self, legacy_key: Option<&str>) -> ProviderConfig {
        let raw_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .or(legacy_key);

        ProviderConfig {
            api_base: self.api_base.clone(),
            model: self.model.clone(),
            timeout: std::time::Duration::from_secs(self.timeout_secs),
            ..ProviderConfig::default()
        }
        .with_api_key(raw_key)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Config;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("ring-server").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--bind",
            "127.0.0.1:8080",
            "--model",
            "llama-3.3-70b-versatile",
            "--api-key",
            "'gsk_flag'",
        ]);
        assert_eq!(config.bind.port(), 8080);

        let provider = config.provider(Some("gsk_legacy"));
        assert_eq!(provider.model, "llama-3.3-70b-versatile");
        assert_eq!(provider.api_key.as_deref(), Some("gsk_flag"));
    }

    #[test]
    fn legacy_key_fills_in_when_no_key_given() {
        let config = Config {
            api_key: None,
            ..parse(&["--bind", "127.0.0.1:0"])
        };
        let provider = config.provider(Some(" \"gsk_legacy\" "));
        assert_eq!(provider.api_key.as_deref(), Some("gsk_legacy"));
        assert_eq!(config.provider(None).api_key, None);
    }

    #[test]
    fn rejects_malformed_bind_address() {
        let result = Config::try_parse_from(["ring-server", "--bind", "not-an-address"]);
        assert!(result.is_err());
    }
}
