//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (or the path given with `-f`), then applies `PERFUME_BOT_LOG_LEVEL` and
//! `PERFUME_BOT_TEMPLATES` env overrides. Every section is optional; a
//! missing default file yields the built-in defaults.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Socket address to bind.
    pub bind: String,
    /// Upper bound on one pipeline call (LLM round-trips included).
    pub request_timeout_seconds: u64,
}

/// Where the prompt template document lives.
#[derive(Debug, Clone)]
pub struct PromptsConfig {
    pub template_path: PathBuf,
}

/// Product catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// JSON product list. `None` runs with an empty catalog.
    pub path: Option<PathBuf>,
    /// Maximum number of products rendered into one prompt.
    pub max_products: usize,
}

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Model name passed in the request body.
    pub model: String,
    pub temperature: f32,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM gateway configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"dummy"`, `"openai"`, `"openai-compatible"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub log_level: String,
    pub http: HttpConfig,
    pub prompts: PromptsConfig,
    pub catalog: CatalogConfig,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY`. Never sourced from TOML.
    pub llm_api_key: Option<String>,
}

// ── Raw TOML shape ───────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    server: RawServer,
    #[serde(default)]
    http: RawHttp,
    #[serde(default)]
    prompts: RawPrompts,
    #[serde(default)]
    catalog: RawCatalog,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawServer {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

#[derive(Deserialize)]
struct RawHttp {
    #[serde(default = "default_http_bind")]
    bind: String,
    #[serde(default = "default_request_timeout_seconds")]
    request_timeout_seconds: u64,
}

#[derive(Deserialize)]
struct RawPrompts {
    #[serde(default = "default_template_path")]
    template_path: String,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    path: Option<String>,
    #[serde(default = "default_max_products")]
    max_products: usize,
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_model")]
    model: String,
    #[serde(default = "default_openai_temperature")]
    temperature: f32,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawServer {
    fn default() -> Self {
        Self { name: default_name(), log_level: default_log_level() }
    }
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            bind: default_http_bind(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for RawPrompts {
    fn default() -> Self {
        Self { template_path: default_template_path() }
    }
}

impl Default for RawCatalog {
    fn default() -> Self {
        Self { path: None, max_products: default_max_products() }
    }
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

fn default_name() -> String { "perfume-bot".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_http_bind() -> String { "127.0.0.1:8080".to_string() }
fn default_request_timeout_seconds() -> u64 { 120 }
fn default_template_path() -> String { "config/prompt_template.json".to_string() }
fn default_max_products() -> usize { 25 }
fn default_llm_provider() -> String { "dummy".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_model() -> String { "gpt-4o-mini".to_string() }
fn default_openai_temperature() -> f32 { 0.7 }
fn default_openai_timeout_seconds() -> u64 { 60 }

// ── Loading ──────────────────────────────────────────────────────────────────

/// Load config from `config_path` (or `config/default.toml`), then apply
/// env-var overrides.
///
/// An explicit path that cannot be read is an error. A missing default file
/// is not: the built-in defaults are used instead.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let log_level_override = env::var("PERFUME_BOT_LOG_LEVEL").ok();
    let template_override = env::var("PERFUME_BOT_TEMPLATES").ok();

    match config_path {
        Some(path) => load_from(
            Path::new(path),
            log_level_override.as_deref(),
            template_override.as_deref(),
        ),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from(
            Path::new(DEFAULT_CONFIG_PATH),
            log_level_override.as_deref(),
            template_override.as_deref(),
        ),
        None => resolve(
            RawConfig::default(),
            log_level_override.as_deref(),
            template_override.as_deref(),
        ),
    }
}

/// Internal loader. Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    template_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    resolve(parsed, log_level_override, template_override)
}

fn resolve(
    parsed: RawConfig,
    log_level_override: Option<&str>,
    template_override: Option<&str>,
) -> Result<Config, AppError> {
    if parsed.catalog.max_products == 0 {
        return Err(AppError::Config("catalog.max_products must be at least 1".into()));
    }
    if parsed.http.request_timeout_seconds == 0 {
        return Err(AppError::Config("http.request_timeout_seconds must be at least 1".into()));
    }

    let log_level = log_level_override.unwrap_or(&parsed.server.log_level).to_string();
    let template_path = expand_home(template_override.unwrap_or(&parsed.prompts.template_path));

    Ok(Config {
        name: parsed.server.name,
        log_level,
        http: HttpConfig {
            bind: parsed.http.bind,
            request_timeout_seconds: parsed.http.request_timeout_seconds,
        },
        prompts: PromptsConfig { template_path },
        catalog: CatalogConfig {
            path: parsed.catalog.path.as_deref().map(expand_home),
            max_products: parsed.catalog.max_products,
        },
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                model: parsed.llm.openai.model,
                temperature: parsed.llm.openai.temperature,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty()),
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
