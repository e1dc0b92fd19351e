// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Leadflow routing engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Leadflow configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadflowConfig {
    /// Engine identity and logging settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Tier policy: attempt limits and the SLA window.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Escalation worker settings.
    #[serde(default)]
    pub escalation: EscalationConfig,

    /// Notification channel settings.
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Reputation service settings.
    #[serde(default)]
    pub reputation: ReputationConfig,
}

/// Engine identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name of this engine instance.
    #[serde(default = "default_engine_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_engine_name() -> String {
    "leadflow".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("leadflow").join("leadflow.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("leadflow.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Tier policy configuration, read once per routing/escalation cycle.
///
/// Passed explicitly into the tier resolver and router rather than consulted
/// as ambient global state, so both stay pure and testable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Max distinct External-tier attempts before forcing progression.
    #[serde(default = "default_limit_external")]
    pub limit_external: u32,

    /// Max distinct Internal-tier attempts before forcing OnCall.
    #[serde(default = "default_limit_internal")]
    pub limit_internal: u32,

    /// Response window in minutes before an assignment expires.
    #[serde(default = "default_sla_minutes")]
    pub sla_minutes: i64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            limit_external: default_limit_external(),
            limit_internal: default_limit_internal(),
            sla_minutes: default_sla_minutes(),
        }
    }
}

fn default_limit_external() -> u32 {
    3
}

fn default_limit_internal() -> u32 {
    3
}

fn default_sla_minutes() -> i64 {
    5
}

/// Escalation worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationConfig {
    /// Seconds between scheduled worker invocations in `leadflow serve`.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Max expired assignments claimed per invocation.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: u32,

    /// Seconds a claimed row stays leased before another invocation may
    /// reclaim it. Must comfortably exceed per-item processing time.
    #[serde(default = "default_lease_secs")]
    pub lease_secs: i64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            batch_limit: default_batch_limit(),
            lease_secs: default_lease_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_batch_limit() -> u32 {
    50
}

fn default_lease_secs() -> i64 {
    60
}

/// Notification channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// SMTP relay hostname. `None` falls back to log-only delivery.
    #[serde(default)]
    pub smtp_host: Option<String>,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Sender address for outbound mail.
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// SMTP credentials. Both or neither.
    #[serde(default)]
    pub smtp_username: Option<String>,

    #[serde(default)]
    pub smtp_password: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            from_address: default_from_address(),
            smtp_username: None,
            smtp_password: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    465
}

fn default_from_address() -> String {
    "leadflow@localhost".to_string()
}

/// Reputation service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReputationConfig {
    /// Base URL of the reputation service. `None` disables penalties.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_reputation_timeout")]
    pub timeout_secs: u64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_reputation_timeout(),
        }
    }
}

fn default_reputation_timeout() -> u64 {
    10
}
