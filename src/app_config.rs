//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rapidshare::TokenInit;

/// File configuration for credentials, paths and timeouts.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Account login, used together with `password`.
    pub login: Option<String>,
    /// Account password.
    pub password: Option<String>,
    /// Session cookie of an existing login.
    pub cookie: Option<String>,
    /// Call without a session even when credentials are configured.
    pub anonymous: Option<bool>,
    /// Default directory for downloads.
    pub downloads_dir: Option<PathBuf>,
    /// Default queue file for `download`.
    pub queue: Option<PathBuf>,
    /// Optional API client connect timeout in seconds.
    pub api_connect_timeout_secs: Option<u64>,
    /// Optional API client read timeout in seconds.
    pub api_read_timeout_secs: Option<u64>,
    /// Optional download client connect timeout in seconds.
    pub download_connect_timeout_secs: Option<u64>,
    /// Optional download client read timeout in seconds.
    pub download_read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        validate_timeout_secs("api_connect_timeout_secs", self.api_connect_timeout_secs)?;
        validate_timeout_secs("api_read_timeout_secs", self.api_read_timeout_secs)?;
        validate_timeout_secs(
            "download_connect_timeout_secs",
            self.download_connect_timeout_secs,
        )?;
        validate_timeout_secs(
            "download_read_timeout_secs",
            self.download_read_timeout_secs,
        )?;
        if self.login.is_some() != self.password.is_some() {
            bail!("`login` and `password` must be configured together");
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Credentials given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialFlags<'a> {
    pub cookie: Option<&'a str>,
    pub login: Option<&'a str>,
    pub password: Option<&'a str>,
    pub anonymous: bool,
}

/// Picks how the session is initialized.
///
/// Flags take precedence over the file. Within each source the order is
/// anonymous, then cookie, then login and password. With nothing configured
/// the session is anonymous.
pub fn select_token_init(flags: CredentialFlags<'_>, file: &FileConfig) -> Result<TokenInit> {
    if flags.anonymous {
        return Ok(TokenInit::Anonymous);
    }
    if let Some(cookie) = flags.cookie {
        return Ok(TokenInit::token(cookie));
    }
    if let Some(login) = flags.login {
        let Some(password) = flags.password.or(file.password.as_deref()) else {
            bail!("`--login` needs a password");
        };
        return Ok(TokenInit::credentials(login, password));
    }

    if file.anonymous == Some(true) {
        return Ok(TokenInit::Anonymous);
    }
    if let Some(cookie) = file.cookie.as_deref() {
        return Ok(TokenInit::token(cookie));
    }
    let password = flags.password.or(file.password.as_deref());
    if let (Some(login), Some(password)) = (file.login.as_deref(), password) {
        return Ok(TokenInit::credentials(login, password));
    }
    Ok(TokenInit::Anonymous)
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/rapidshare/config.toml`
/// 2. `$HOME/.config/rapidshare/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("rapidshare")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("rapidshare")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig {
            path,
            config: None,
            loaded_from_file: false,
        });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
        loaded_from_file: true,
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let string_value = || {
            parse_string_literal(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };
        let integer_value = || {
            parse_integer_u64(value)
                .with_context(|| format!("Invalid `{key}` value on line {line_no}"))
        };

        match key {
            "login" => cfg.login = Some(string_value()?),
            "password" => cfg.password = Some(string_value()?),
            "cookie" => cfg.cookie = Some(string_value()?),
            "anonymous" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `anonymous` value on line {line_no}"))?;
                cfg.anonymous = Some(parsed);
            }
            "downloads_dir" => cfg.downloads_dir = Some(PathBuf::from(string_value()?)),
            "queue" => cfg.queue = Some(PathBuf::from(string_value()?)),
            "api_connect_timeout_secs" => cfg.api_connect_timeout_secs = Some(integer_value()?),
            "api_read_timeout_secs" => cfg.api_read_timeout_secs = Some(integer_value()?),
            "download_connect_timeout_secs" => {
                cfg.download_connect_timeout_secs = Some(integer_value()?);
            }
            "download_read_timeout_secs" => {
                cfg.download_read_timeout_secs = Some(integer_value()?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
