//! `[email]` section and SMTP endpoint resolution.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the SMTP password or app code.
pub const SMTP_PASSWORD_ENV: &str = "KEYGRAB_SMTP_PASSWORD";

/// Hosts treated as "not configured" and replaced by provider detection.
const PLACEHOLDER_HOSTS: [&str; 3] = ["", "smtp.example.com", "example.com"];

/// Port used for every auto-configured provider.
const PROVIDER_PORT: u16 = 465;

/// `[email]` section.
///
/// Only `to` is required. When `smtp_host` is empty or a placeholder, the
/// server is derived from the recipient's domain.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Enable purchase emails.
    #[serde(default)]
    pub enabled: bool,
    /// Recipient address.
    #[serde(default)]
    pub to: String,
    /// Sender address. Defaults to the SMTP username.
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Login name. Defaults to the recipient address.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// TLS for ports other than 465 and 587.
    #[serde(default = "default_true")]
    pub use_ssl: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Also email when a worker pauses its task.
    #[serde(default)]
    pub notify_pauses: bool,
}

const fn default_smtp_port() -> u16 {
    PROVIDER_PORT
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            to: String::new(),
            from: None,
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            use_ssl: default_true(),
            timeout_secs: default_timeout_secs(),
            notify_pauses: false,
        }
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte.
    Implicit,
    /// Plain connection upgraded with `STARTTLS`.
    StartTls,
    /// No TLS at all.
    Plain,
}

impl SmtpSecurity {
    /// 465 is always implicit TLS and 587 always `STARTTLS`; any other port
    /// follows `use_ssl`.
    #[must_use]
    pub const fn for_port(port: u16, use_ssl: bool) -> Self {
        match port {
            465 => Self::Implicit,
            587 => Self::StartTls,
            _ if use_ssl => Self::Implicit,
            _ => Self::Plain,
        }
    }
}

impl std::fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Implicit => "ssl",
            Self::StartTls => "starttls",
            Self::Plain => "plain",
        })
    }
}

/// Fully resolved connection details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub username: String,
    /// Envelope and header sender.
    pub from: String,
    pub to: String,
}

impl EmailConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the server, port, security mode and credentials to use.
    ///
    /// # Errors
    ///
    /// Returns an error if the recipient is missing or malformed, or if the
    /// host is unset and the recipient's provider is not recognised.
    pub fn endpoint(&self) -> Result<SmtpEndpoint, ConfigError> {
        let to = self.to.trim();
        if to.is_empty() {
            return Err(ConfigError::MissingField { field: "email.to" });
        }
        let Some(domain) = domain_of(to) else {
            return Err(ConfigError::InvalidValue {
                field: "email.to",
                reason: format!("{to} is not an email address"),
            });
        };

        let configured = self.smtp_host.trim();
        let (host, port, use_ssl) = if PLACEHOLDER_HOSTS.contains(&configured) {
            let Some(host) = provider_host(&domain) else {
                return Err(ConfigError::InvalidValue {
                    field: "email.smtp_host",
                    reason: format!("not set and no known SMTP server for {domain}"),
                });
            };
            (host.to_string(), PROVIDER_PORT, true)
        } else {
            (configured.to_string(), self.smtp_port, self.use_ssl)
        };

        let username = self
            .smtp_username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(to)
            .to_string();
        let from = self
            .from
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map_or_else(|| username.clone(), ToString::to_string);

        Ok(SmtpEndpoint {
            host,
            port,
            security: SmtpSecurity::for_port(port, use_ssl),
            username,
            from,
            to: to.to_string(),
        })
    }
}

fn domain_of(address: &str) -> Option<String> {
    let (local, domain) = address.rsplit_once('@')?;
    (!local.is_empty() && domain.contains('.')).then(|| domain.to_ascii_lowercase())
}

/// SMTP server for mailbox providers that can be configured from the address alone.
fn provider_host(domain: &str) -> Option<&'static str> {
    match domain {
        "qq.com" => Some("smtp.qq.com"),
        "163.com" => Some("smtp.163.com"),
        "gmail.com" => Some("smtp.gmail.com"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(to: &str, host: &str) -> EmailConfig {
        EmailConfig {
            enabled: true,
            to: to.into(),
            smtp_host: host.into(),
            ..EmailConfig::default()
        }
    }

    #[test]
    fn known_providers_are_detected_from_the_recipient() {
        for (to, host) in [
            ("me@qq.com", "smtp.qq.com"),
            ("me@163.com", "smtp.163.com"),
            ("Me@Gmail.com", "smtp.gmail.com"),
        ] {
            let endpoint = config(to, "").endpoint().unwrap();
            assert_eq!(endpoint.host, host);
            assert_eq!(endpoint.port, 465);
            assert_eq!(endpoint.security, SmtpSecurity::Implicit);
            assert_eq!(endpoint.username, to);
            assert_eq!(endpoint.from, to);
        }
    }

    #[test]
    fn placeholder_hosts_trigger_detection() {
        let mut cfg = config("me@qq.com", "smtp.example.com");
        cfg.smtp_port = 25;
        cfg.use_ssl = false;
        let endpoint = cfg.endpoint().unwrap();
        assert_eq!(endpoint.host, "smtp.qq.com");
        assert_eq!(endpoint.port, 465);
        assert_eq!(endpoint.security, SmtpSecurity::Implicit);

        assert_eq!(
            config("me@qq.com", "example.com").endpoint().unwrap().host,
            "smtp.qq.com"
        );
    }

    #[test]
    fn unknown_provider_without_host_is_rejected() {
        assert!(matches!(
            config("me@corp.example.org", "").endpoint(),
            Err(ConfigError::InvalidValue {
                field: "email.smtp_host",
                ..
            })
        ));
        assert!(matches!(
            config("", "smtp.corp.org").endpoint(),
            Err(ConfigError::MissingField { field: "email.to" })
        ));
        assert!(matches!(
            config("nobody", "smtp.corp.org").endpoint(),
            Err(ConfigError::InvalidValue {
                field: "email.to",
                ..
            })
        ));
    }

    #[test]
    fn explicit_host_keeps_port_and_credentials() {
        let mut cfg = config("ops@corp.org", "mail.corp.org");
        cfg.smtp_port = 587;
        cfg.smtp_username = Some("relay-user".into());
        cfg.from = Some("keygrab@corp.org".into());

        let endpoint = cfg.endpoint().unwrap();
        assert_eq!(endpoint.host, "mail.corp.org");
        assert_eq!(endpoint.port, 587);
        assert_eq!(endpoint.security, SmtpSecurity::StartTls);
        assert_eq!(endpoint.username, "relay-user");
        assert_eq!(endpoint.from, "keygrab@corp.org");
        assert_eq!(endpoint.to, "ops@corp.org");
    }

    #[test]
    fn security_follows_port_then_flag() {
        assert_eq!(SmtpSecurity::for_port(465, false), SmtpSecurity::Implicit);
        assert_eq!(SmtpSecurity::for_port(587, true), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::for_port(2525, true), SmtpSecurity::Implicit);
        assert_eq!(SmtpSecurity::for_port(25, false), SmtpSecurity::Plain);
    }

    #[test]
    fn section_defaults_from_toml() {
        let cfg: EmailConfig = toml::from_str("enabled = true\nto = \"me@163.com\"").unwrap();
        assert_eq!(cfg.smtp_port, 465);
        assert!(cfg.use_ssl);
        assert_eq!(cfg.timeout(), Duration::from_secs(10));
        assert!(!cfg.notify_pauses);
    }
}
