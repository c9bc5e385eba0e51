//! Command line flags and their environment variable fallbacks.
//!
//! Flags override values from the optional TOML file, which override the
//! built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{read_config, validate_config, ConfigError, ServiceConfig, TemplatePolicy};

#[derive(Parser, Debug)]
#[command(name = "custom-error-pages", version)]
#[command(about = "Custom error page backend for ingress controllers", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// HTTP server address
    #[arg(long, env = "HTTP_LISTEN_ADDRESS")]
    pub http_listen_address: Option<String>,

    /// The location on disk of the page templates
    #[arg(long, env = "ERROR_FILES_PATH")]
    pub error_files_path: Option<PathBuf>,

    /// How templates are looked up in that location
    #[arg(long, value_enum, env = "TEMPLATE_POLICY")]
    pub template_policy: Option<TemplatePolicy>,

    /// Hide request details in responses
    #[arg(long, env = "HIDE_DETAILS", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub hide_details: Option<bool>,

    /// Echo the inbound proxy headers on responses
    #[arg(long, env = "DEBUG_HEADERS", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub debug_headers: Option<bool>,

    /// Enable debug logs
    #[arg(long, env = "DEBUG", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub debug: Option<bool>,

    /// Human-friendly, colorized log output
    #[arg(long, env = "LOG_COLOR", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub log_color: Option<bool>,

    /// Do not record or expose request metrics
    #[arg(long, env = "DISABLE_METRICS", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub disable_metrics: Option<bool>,
}

impl Cli {
    /// Load the config file (if any), apply the flags and validate the result.
    pub fn resolve(&self) -> Result<ServiceConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => ServiceConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut ServiceConfig) {
        if let Some(address) = &self.http_listen_address {
            config.listener.bind_address = normalize_listen_address(address);
        }
        if let Some(path) = &self.error_files_path {
            config.pages.template_directory = path.clone();
        }
        if let Some(policy) = self.template_policy {
            config.pages.template_policy = policy;
        }
        if let Some(hide) = self.hide_details {
            config.pages.hide_details = hide;
        }
        if let Some(echo) = self.debug_headers {
            config.pages.debug_headers = echo;
        }
        if let Some(debug) = self.debug {
            config.observability.debug = debug;
        }
        if let Some(color) = self.log_color {
            config.observability.log_color = color;
        }
        if let Some(disable) = self.disable_metrics {
            config.observability.metrics_enabled = !disable;
        }
    }
}

/// Accept the port-only form (`:8080`) by binding all interfaces.
fn normalize_listen_address(address: &str) -> String {
    match address.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => address.to_string(),
    }
}
