//! Conversion settings for the CLI
//!
//! Sources, lowest precedence first: built-in defaults, an optional file
//! passed with `--config`, then `COBALT_*` environment variables
//! (e.g. `COBALT_BUNDLE_TYPE=document`, `COBALT_FAIL_FAST=true`).

use std::path::Path;

use anyhow::Context;
use cobalt_convert::ConvertOptions;
use config::{Config, Environment, File};

pub const ENV_PREFIX: &str = "COBALT";

pub fn load(path: Option<&Path>) -> anyhow::Result<ConvertOptions> {
    load_with_env(path, Environment::with_prefix(ENV_PREFIX).try_parsing(true))
}

fn load_with_env(path: Option<&Path>, env: Environment) -> anyhow::Result<ConvertOptions> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    let settings = builder
        .add_source(env)
        .build()
        .context("Failed to read configuration")?;

    let options: ConvertOptions = settings
        .try_deserialize()
        .context("Invalid conversion settings")?;
    options
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid conversion settings: {e}"))?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobalt_convert::IdStrategy;
    use cobalt_models::BundleType;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(HashMap::new()))
    }

    fn write_settings(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cobalt-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_sources() {
        let options = load_with_env(None, no_env()).unwrap();
        assert_eq!(options, ConvertOptions::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = write_settings(
            "settings.toml",
            "bundle_type = \"document\"\nid_strategy = \"random\"\n",
        );
        let options = load_with_env(Some(&path), no_env()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(options.bundle_type, BundleType::Document);
        assert_eq!(options.id_strategy, IdStrategy::Random);
        assert!(options.include_composition);
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = write_settings("env.toml", "fail_fast = false\n");
        let env = HashMap::from([
            ("COBALT_FAIL_FAST".to_string(), "true".to_string()),
            ("COBALT_INCLUDE_NARRATIVE".to_string(), "false".to_string()),
        ]);
        let options = load_with_env(
            Some(&path),
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(env)),
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert!(options.fail_fast);
        assert!(!options.include_narrative);
    }

    #[test]
    fn test_invalid_combination_is_rejected() {
        let path = write_settings(
            "invalid.toml",
            "bundle_type = \"document\"\ninclude_composition = false\n",
        );
        let result = load_with_env(Some(&path), no_env());
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("cobalt-does-not-exist.toml");
        assert!(load_with_env(Some(&path), no_env()).is_err());
    }
}
