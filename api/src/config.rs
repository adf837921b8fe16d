//! Configuration loading for the API binary
//!
//! Sources are layered, later ones winning:
//! 1. the preset for the current environment (`AppConfig::for_environment`)
//! 2. an optional `config.<environment>.toml` file in the working directory
//! 3. `PV__`-prefixed environment variables, e.g. `PV__CACHE__BACKEND=redis`

use config::{Config, ConfigError, File};
use pv_core::services::VerificationServiceConfig;
use pv_shared::config::{AppConfig, Environment};

/// Load and validate the application configuration
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_for(Environment::from_env())
}

/// Load the configuration for an explicit environment
pub fn load_config_for(environment: Environment) -> Result<AppConfig, ConfigError> {
    let preset = AppConfig::for_environment(environment);

    let config: AppConfig = Config::builder()
        .add_source(Config::try_from(&preset)?)
        .add_source(File::with_name(environment.config_file()).required(false))
        .add_source(
            config::Environment::with_prefix("PV")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate().map_err(ConfigError::Message)?;
    Ok(config)
}

/// Derive the service policy from the loaded configuration
///
/// Code exposure needs the `otp-backdoor` build feature, the config flag and
/// a non-production environment all at once.
pub fn service_config(config: &AppConfig) -> VerificationServiceConfig {
    let expose_code = cfg!(feature = "otp-backdoor")
        && config.verification.expose_code_in_response
        && !config.environment.is_production();

    VerificationServiceConfig {
        code_ttl_seconds: config.verification.code_ttl_seconds as i64,
        max_attempts: config.verification.max_attempts,
        resend_cooldown_seconds: config.rate_limit.resend_cooldown_seconds as i64,
        expose_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_follows_app_config() {
        let mut config = AppConfig::development();
        config.verification.code_ttl_seconds = 120;
        config.rate_limit.resend_cooldown_seconds = 45;

        let service = service_config(&config);
        assert_eq!(service.code_ttl_seconds, 120);
        assert_eq!(service.resend_cooldown_seconds, 45);
        assert_eq!(service.max_attempts, 3);
    }

    #[test]
    fn test_code_never_exposed_in_production() {
        let mut config = AppConfig::production();
        config.verification.expose_code_in_response = true;
        assert!(!service_config(&config).expose_code);
    }

    #[test]
    fn test_code_exposure_requires_backdoor_feature() {
        let mut config = AppConfig::development();
        config.verification.expose_code_in_response = true;
        assert_eq!(service_config(&config).expose_code, cfg!(feature = "otp-backdoor"));
    }

    #[test]
    fn test_development_config_loads_without_files() {
        let config = load_config_for(Environment::Development).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.verification.max_attempts, 3);
    }
}
