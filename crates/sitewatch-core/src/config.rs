//! Configuration model and loader
//!
//! The configuration is a TOML document with three tables: `settings`,
//! `targets` and `notify`. It is parsed once at startup into [`Config`] and
//! then passed by reference into every component constructor; nothing below
//! the CLI reads the environment.

use crate::errors::{Result, WatchError};
use crate::model::Target;
use crate::template::WebhookTemplate;
use serde::Deserialize;
use sitewatch_core_types::Sensitive;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Implicit-TLS submission port
pub const DEFAULT_SMTP_PORT: u16 = 465;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Whole configuration document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// One `[[targets]]` entry, tagged by `kind`
///
/// Unknown kinds are rejected by the parser. Missing source fields are
/// tolerated here and reported when the entry is resolved, so that one bad
/// entry only skips itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetSpec {
    Url {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        value: Option<String>,
    },
    Command {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        command: Option<String>,
    },
}

/// Engine tunables
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snapshot_dir: PathBuf,
    pub retry_count: u32,
    pub retry_delay_seconds: u64,
    pub request_timeout_seconds: u64,
    pub command_timeout_seconds: u64,
    pub email_delay_ms: u64,
    /// Lines of diff shown in notifications; 0 shows everything
    pub max_diff_lines: usize,
    /// Targets checked in parallel; 1 means sequential
    pub concurrency: usize,
    pub user_agent: String,
    /// Public location of the snapshot tree, used for links in notifications
    pub snapshot_base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("snapshots"),
            retry_count: 3,
            retry_delay_seconds: 5,
            request_timeout_seconds: 30,
            command_timeout_seconds: 60,
            email_delay_ms: 1000,
            max_diff_lines: 200,
            concurrency: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            snapshot_base_url: None,
        }
    }
}

impl Settings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_seconds)
    }

    pub fn email_delay(&self) -> Duration {
        Duration::from_millis(self.email_delay_ms)
    }
}

/// Recipients may be written as a TOML array or a comma-separated string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipientList {
    List(Vec<String>),
    Joined(String),
}

impl Default for RecipientList {
    fn default() -> Self {
        RecipientList::List(Vec::new())
    }
}

impl RecipientList {
    /// Raw entries, comma-split but not yet trimmed or deduplicated
    pub fn entries(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            RecipientList::List(items) => items.iter().map(String::as_str).collect(),
            RecipientList::Joined(joined) => vec![joined.as_str()],
        };
        raw.into_iter()
            .flat_map(|item| item.split(','))
            .map(str::to_string)
            .collect()
    }
}

/// Notification channels
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub webhook_urls: Vec<Sensitive<String>>,
    pub webhook_template: Option<WebhookTemplate>,
    pub recipients: RecipientList,
    pub mail_from: Option<String>,
    pub outbox_dir: Option<PathBuf>,
    /// Setting a host switches email delivery from the outbox to SMTP
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<Sensitive<String>>,
}

/// SMTP relay over implicit TLS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<Sensitive<String>>,
}

/// Where outgoing email goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailBackend {
    Smtp(SmtpSettings),
    /// `.eml` files for an external sender
    Outbox(PathBuf),
}

impl NotifyConfig {
    pub fn outbox_dir(&self) -> PathBuf {
        self.outbox_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("outbox"))
    }

    /// SMTP when a host is configured, the outbox otherwise
    pub fn mail_backend(&self) -> MailBackend {
        match self.smtp_host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => MailBackend::Smtp(SmtpSettings {
                host: host.to_string(),
                port: self.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
                user: self.smtp_user.clone(),
                password: self.smtp_password.clone(),
            }),
            _ => MailBackend::Outbox(self.outbox_dir()),
        }
    }
}

/// Targets that resolved, plus the reasons the rest were skipped
#[derive(Debug, Clone, Default)]
pub struct ResolvedTargets {
    pub targets: Vec<Target>,
    pub skipped: Vec<WatchError>,
}

impl Config {
    /// Parse a configuration document
    ///
    /// # Errors
    ///
    /// `WatchError::InvalidConfig` on TOML syntax errors, unknown target
    /// kinds, an invalid webhook template or out-of-range settings.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| WatchError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file at `path`
    ///
    /// # Errors
    ///
    /// `WatchError::ConfigNotFound` if the file does not exist, otherwise
    /// `WatchError::InvalidConfig` for unreadable or malformed content.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_config_file(path)?;
        Self::from_toml_str(&text)
    }

    /// Load a plain URL list: one direct-fetch target per non-empty line
    ///
    /// Lines starting with `#` are comments.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_url_list(path: &Path) -> Result<Vec<TargetSpec>> {
        let text = read_config_file(path)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| TargetSpec::Url {
                name: None,
                value: Some(line.to_string()),
            })
            .collect())
    }

    fn validate(&self) -> Result<()> {
        if self.settings.concurrency == 0 {
            return Err(WatchError::InvalidConfig {
                reason: "settings.concurrency must be at least 1".to_string(),
            });
        }
        if self.settings.snapshot_dir.as_os_str().is_empty() {
            return Err(WatchError::InvalidConfig {
                reason: "settings.snapshot_dir must not be empty".to_string(),
            });
        }
        if self.notify.smtp_user.is_some() != self.notify.smtp_password.is_some() {
            return Err(WatchError::InvalidConfig {
                reason: "notify.smtp_user and notify.smtp_password must be set together"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Resolve every target entry, skipping the ones that cannot be keyed
    ///
    /// Entries whose state key was already claimed by an earlier entry are
    /// skipped too, so that the resolved set has pairwise disjoint keys.
    pub fn resolve_targets(&self) -> ResolvedTargets {
        resolve_all(&self.targets)
    }
}

/// Resolve target entries in order; see [`Config::resolve_targets`]
pub fn resolve_all(specs: &[TargetSpec]) -> ResolvedTargets {
    let mut resolved = ResolvedTargets::default();
    let mut seen_keys = HashSet::new();

    for spec in specs {
        let outcome = Target::resolve(spec).and_then(|target| {
            let state_key = target.state_key();
            if seen_keys.insert(state_key.clone()) {
                Ok(target)
            } else {
                Err(WatchError::DuplicateStateKey {
                    target: target.label().to_string(),
                    state_key,
                })
            }
        });

        match outcome {
            Ok(target) => resolved.targets.push(target),
            Err(err) => {
                tracing::warn!(error = %err, "skipping target");
                resolved.skipped.push(err);
            }
        }
    }

    resolved
}

fn read_config_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => WatchError::ConfigNotFound {
            path: path.display().to_string(),
        },
        _ => WatchError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        },
    })
}
