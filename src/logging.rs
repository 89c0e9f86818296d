//! # Structured Logging Module
//!
//! Environment-aware structured logging for mapping and hydration runs.

use crate::config::{LogFormat, MapperConfig};
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging(format: LogFormat) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let layer = match format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed(),
        };

        // A host application may already own the global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized, keeping it");
        }

        tracing::info!(
            environment = %environment,
            format = ?format,
            "Structured logging initialized"
        );
    });
}

/// Initialize structured logging in the format chosen by `config`
pub fn init_structured_logging_from(config: &MapperConfig) {
    init_structured_logging(config.log_format);
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("NATIVE_MAPPER_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "test" => "debug".to_string(),
        "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for strategy building and query mapping
pub fn log_mapping_operation(
    operation: &str,
    root_alias: &str,
    aliases: &[String],
    status: &str,
    details: Option<&str>,
) {
    tracing::debug!(
        operation = %operation,
        root_alias = %root_alias,
        aliases = ?aliases,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "MAPPING_OPERATION"
    );
}

/// Log the outcome of one hydration call
pub fn log_hydration_summary(
    root_alias: &str,
    row_count: usize,
    root_count: usize,
    instance_count: usize,
    duration_us: u128,
) {
    tracing::info!(
        root_alias = %root_alias,
        row_count = row_count,
        root_count = root_count,
        instance_count = instance_count,
        duration_us = duration_us as u64,
        timestamp = %Utc::now().to_rfc3339(),
        "HYDRATION_COMPLETE"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
