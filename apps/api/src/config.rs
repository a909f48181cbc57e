use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_SMTP_HOST: &str = "smtp.office365.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_NAME: &str = "Creo Website";
const DEFAULT_TO_EMAIL: &str = "chandras@creoinvent-tech.com";
const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com";
const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// Built once in `main` and never mutated afterwards. Missing mail credentials
/// do not fail startup; they surface as a 500 on every relay request instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_body_bytes: usize,
    /// Origin allowed to post the forms cross-site. Any origin when unset.
    pub cors_allow_origin: Option<String>,
    pub mail: MailConfig,
    pub callback: RelayPolicy,
    pub talent: RelayPolicy,
}

/// Where outbound mail goes and how it gets there.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: TransportConfig,
    /// Sender address. Falls back to `SMTP_USER` in SMTP mode.
    pub from_email: Option<String>,
    pub from_name: String,
    pub to_email: String,
}

#[derive(Debug, Clone)]
pub enum TransportConfig {
    Smtp(SmtpSettings),
    HostedApi(HostedApiSettings),
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone)]
pub struct HostedApiSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub greeting: Duration,
    pub socket: Duration,
}

/// How the SMTP session is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encryption {
    /// TLS from the first byte (SMTPS, port 465).
    Implicit,
    /// Plaintext greeting, then a mandatory STARTTLS upgrade.
    StartTls,
}

/// Per-endpoint switches for the behaviours that differ between relays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayPolicy {
    /// Reject attachments whose declared mime type is outside the CV allow-list.
    pub strict_attachment_types: bool,
    /// Send an HTML alternative next to the plain-text body.
    pub rich_text: bool,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            greeting: Duration::from_secs(15),
            socket: Duration::from_secs(20),
        }
    }
}

impl Timeouts {
    /// Upper bound for one complete send attempt.
    pub fn total(&self) -> Duration {
        self.connect + self.greeting + self.socket
    }
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            strict_attachment_types: true,
            rich_text: true,
        }
    }
}

impl SmtpSettings {
    pub fn encryption(&self) -> Encryption {
        if self.port == 465 {
            Encryption::Implicit
        } else {
            Encryption::StartTls
        }
    }
}

impl MailConfig {
    /// The sender address actually used on outgoing mail.
    pub fn sender_address(&self) -> Option<&str> {
        self.from_email.as_deref().or(match &self.transport {
            TransportConfig::Smtp(smtp) => smtp.user.as_deref(),
            TransportConfig::HostedApi(_) => None,
        })
    }

    /// `"Display Name" <address>`, or an empty string when no sender is known.
    pub fn from_header(&self) -> String {
        match self.sender_address() {
            Some(address) => format!("\"{}\" <{}>", self.from_name, address),
            None => String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let transport = match get("RESEND_API_KEY") {
            Some(api_key) => TransportConfig::HostedApi(HostedApiSettings {
                api_key,
                base_url: get("RESEND_API_URL")
                    .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),
                timeouts: parse_timeouts(&get)?,
            }),
            None => TransportConfig::Smtp(SmtpSettings {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: parse_or("SMTP_PORT", get("SMTP_PORT"), DEFAULT_SMTP_PORT)?,
                user: get("SMTP_USER"),
                pass: get("SMTP_PASS"),
                timeouts: parse_timeouts(&get)?,
            }),
        };

        Ok(Config {
            port: parse_or("PORT", get("PORT"), 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            max_body_bytes: parse_or(
                "MAX_BODY_BYTES",
                get("MAX_BODY_BYTES"),
                DEFAULT_MAX_BODY_BYTES,
            )?,
            cors_allow_origin: get("CORS_ALLOW_ORIGIN"),
            mail: MailConfig {
                transport,
                from_email: get("FROM_EMAIL"),
                from_name: get("FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
                to_email: get("TO_EMAIL").unwrap_or_else(|| DEFAULT_TO_EMAIL.to_string()),
            },
            callback: RelayPolicy {
                // Callback forms carry no files; the flag is kept for symmetry.
                strict_attachment_types: true,
                rich_text: parse_flag("CALLBACK_RICH_TEXT", get("CALLBACK_RICH_TEXT"), true)?,
            },
            talent: RelayPolicy {
                strict_attachment_types: parse_flag(
                    "TALENT_STRICT_CV_TYPES",
                    get("TALENT_STRICT_CV_TYPES"),
                    true,
                )?,
                rich_text: parse_flag("TALENT_RICH_TEXT", get("TALENT_RICH_TEXT"), true)?,
            },
        })
    }
}

fn parse_timeouts(get: &impl Fn(&str) -> Option<String>) -> Result<Timeouts> {
    let defaults = Timeouts::default();
    let millis = |key: &str, default: Duration| -> Result<Duration> {
        let ms = parse_or(key, get(key), default.as_millis() as u64)?;
        Ok(Duration::from_millis(ms))
    };
    Ok(Timeouts {
        connect: millis("SMTP_CONNECT_TIMEOUT_MS", defaults.connect)?,
        greeting: millis("SMTP_GREETING_TIMEOUT_MS", defaults.greeting)?,
        socket: millis("SMTP_SOCKET_TIMEOUT_MS", defaults.socket)?,
    })
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{value}'")),
        None => Ok(default),
    }
}

fn parse_flag(key: &str, raw: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Environment variable '{key}' must be a boolean, got '{value}'"),
    }
}
