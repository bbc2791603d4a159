#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::config::{LLMProvider, SampleStrategy};
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(&["voice-insights"]).unwrap();

        assert!(args.config.is_none());
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.verbose);
        assert!(!args.no_cache);
        assert!(!args.check_connection);
    }

    #[test]
    fn test_args_short_options() {
        let args = Args::try_parse_from(&[
            "voice-insights",
            "-c", "/etc/voice-insights.toml",
            "-p", "9000",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("/etc/voice-insights.toml")));
        assert_eq!(args.port, Some(9000));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_llm_options() {
        let args = Args::try_parse_from(&[
            "voice-insights",
            "--llm-provider", "deepseek",
            "--llm-api-key", "test-key",
            "--llm-api-base-url", "https://api.deepseek.com",
            "--model-efficient", "deepseek-chat",
            "--model-powerful", "deepseek-reasoner",
            "--temperature", "0.3",
        ])
        .unwrap();

        assert_eq!(args.llm_provider, Some("deepseek".to_string()));
        assert_eq!(args.llm_api_key, Some("test-key".to_string()));
        assert_eq!(
            args.llm_api_base_url,
            Some("https://api.deepseek.com".to_string())
        );
        assert_eq!(args.model_efficient, Some("deepseek-chat".to_string()));
        assert_eq!(args.model_powerful, Some("deepseek-reasoner".to_string()));
        assert_eq!(args.temperature, Some(0.3));
    }

    #[test]
    fn test_into_config_with_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("voice-insights.toml");
        std::fs::write(&config_path, "[server]\nport = 7000\n").unwrap();

        let args = Args::try_parse_from(&[
            "voice-insights",
            "--config", config_path.to_str().unwrap(),
            "--host", "127.0.0.1",
            "--llm-provider", "gemini",
            "--model-efficient", "gemini-2.0-flash",
            "--sample-strategy", "identity",
            "--dataset-path", "/data/samples.csv",
            "--store-path", "/data/insights.json",
            "--no-cache",
            "--check-connection",
            "--verbose",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.provider, LLMProvider::Gemini);
        assert_eq!(config.llm.model_efficient, "gemini-2.0-flash");
        assert_eq!(config.samples.strategy, SampleStrategy::Identity);
        assert_eq!(config.samples.dataset_path, PathBuf::from("/data/samples.csv"));
        assert_eq!(config.store.path, PathBuf::from("/data/insights.json"));
        assert!(!config.cache.enabled);
        assert!(config.check_connection);
        assert!(config.verbose);
    }

    #[test]
    fn test_unknown_provider_keeps_configured_value() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("voice-insights.toml");
        std::fs::write(&config_path, "[llm]\nprovider = \"ollama\"\n").unwrap();

        let args = Args::try_parse_from(&[
            "voice-insights",
            "--config", config_path.to_str().unwrap(),
            "--llm-provider", "invalid",
            "--sample-strategy", "nearest",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.llm.provider, LLMProvider::Ollama);
        assert_eq!(config.samples.strategy, SampleStrategy::Similarity);
    }

    #[test]
    fn test_into_config_missing_explicit_file() {
        let args = Args::try_parse_from(&[
            "voice-insights",
            "--config", "/nonexistent/voice-insights.toml",
        ])
        .unwrap();

        assert!(args.into_config().is_err());
    }
}
