//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the error page backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Error page rendering settings.
    pub pages: PagesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How templates are located inside the template directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TemplatePolicy {
    /// Every file in the directory forms one set; `index` is the entry point.
    #[default]
    Directory,

    /// `<code>.html`, then `<digit>xx.html`, plus an optional `styles.css`.
    PerCode,
}

/// Error page rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Directory holding the page templates. Re-read on every request.
    pub template_directory: PathBuf,

    /// Template lookup policy.
    pub template_policy: TemplatePolicy,

    /// Omit the `details` block from rendered pages.
    pub hide_details: bool,

    /// Echo the inbound proxy headers back on the response.
    pub debug_headers: bool,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            template_directory: PathBuf::from("./themes/knockout"),
            template_policy: TemplatePolicy::Directory,
            hide_details: false,
            debug_headers: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Lower the default log level to debug.
    pub debug: bool,

    /// Human-friendly, colorized log output.
    pub log_color: bool,

    /// Record request metrics and serve them on `/metrics`.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_color: false,
            metrics_enabled: true,
        }
    }
}
