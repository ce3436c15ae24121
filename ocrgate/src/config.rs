use std::env;

/// Instruction sent with every upload unless the caller supplies its own.
pub const DEFAULT_PROMPT: &str =
    "Extract all text from this image. Preserve the layout and structure as much as possible.";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Booleans accept the usual spellings (`true/false`, `1/0`, `yes/no`, `on/off`).
fn parse_env_bool(var: &str, default: bool) -> bool {
    match env::var(var) {
        Ok(val) => match val.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                tracing::warn!("Invalid value '{}' for {}. Using default.", val, var);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_string(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma-separated list, e.g. `ALLOWED_FILE_TYPES=image/png,image/jpeg`.
/// Empty entries are dropped; an unset variable yields `default`.
fn parse_env_list(var: &str, default: &[String]) -> Vec<String> {
    match env::var(var) {
        Ok(val) => split_list(&val),
        Err(_) => default.to_vec(),
    }
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn wildcard() -> Vec<String> {
    vec!["*".to_string()]
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub database: DatabaseConfig,
    pub request: RequestConfig,
    pub security: SecurityConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "OCR API".to_string(),
            version: "1.0.0".to_string(),
            debug: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// Kept wide so out-of-range values reach [`Config::validate`].
    pub port: i64,
    pub workers: usize,
    pub reload: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 1,
            reload: false,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// External vision model settings.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: String,
    /// Provider-prefixed model name, e.g. `gemini-2.0-flash` or `openai/gpt-4o-mini`.
    pub model: String,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            base_url: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Ceiling in bytes.
    pub max_file_size: i64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024,
            allowed_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/gif".to_string(),
                "image/webp".to_string(),
            ],
        }
    }
}

impl UploadConfig {
    /// Ceiling as a byte count. Non-positive values (rejected at startup) clamp to zero.
    pub fn max_bytes(&self) -> usize {
        usize::try_from(self.max_file_size).unwrap_or(0)
    }

    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size as f64 / BYTES_PER_MB
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
    pub credentials: bool,
    pub methods: Vec<String>,
    pub headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: wildcard(),
            credentials: true,
            methods: wildcard(),
            headers: wildcard(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = std::convert::Infallible;

    /// Anything other than `json` falls back to human-readable text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Ok(LogFormat::Text)
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: String,
    pub enable_file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            format: LogFormat::Text,
            file: "ocr_api.log".to_string(),
            enable_file_logging: false,
        }
    }
}

// Rate limiting, caching and persistence are validated at startup but not
// enforced by any route.

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests: i64,
    pub period_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests: 100,
            period_secs: 3600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_secs: i64,
    pub redis_url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: 3600,
            redis_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_hosts: Vec<String>,
    pub enable_https_redirect: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: wildcard(),
            enable_https_redirect: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub health_check_enabled: bool,
    pub metrics_enabled: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            health_check_enabled: true,
            metrics_enabled: false,
        }
    }
}

impl Config {
    /// Build the configuration from environment variables layered over defaults.
    pub fn from_env() -> Self {
        let app = AppConfig::default();
        let server = ServerConfig::default();
        let vision = VisionConfig::default();
        let upload = UploadConfig::default();
        let cors = CorsConfig::default();
        let logging = LoggingConfig::default();
        let rate_limit = RateLimitConfig::default();
        let cache = CacheConfig::default();
        let database = DatabaseConfig::default();
        let request = RequestConfig::default();
        let security = SecurityConfig::default();
        let monitoring = MonitoringConfig::default();

        Self {
            app: AppConfig {
                name: parse_env_string("APP_NAME", &app.name),
                version: parse_env_string("APP_VERSION", &app.version),
                debug: parse_env_bool("DEBUG", app.debug),
            },
            server: ServerConfig {
                host: parse_env_string("HOST", &server.host),
                port: parse_env_or("PORT", server.port),
                workers: parse_env_or("WORKERS", server.workers),
                reload: parse_env_bool("RELOAD", server.reload),
            },
            vision: VisionConfig {
                api_key: parse_env_string("GEMINI_API_KEY", &vision.api_key),
                model: parse_env_string("GEMINI_MODEL", &vision.model),
                base_url: env::var("GEMINI_BASE_URL").ok().filter(|s| !s.is_empty()),
                timeout_secs: parse_env_or("GEMINI_TIMEOUT", vision.timeout_secs),
            },
            upload: UploadConfig {
                max_file_size: parse_env_or("MAX_FILE_SIZE", upload.max_file_size),
                allowed_types: parse_env_list("ALLOWED_FILE_TYPES", &upload.allowed_types),
            },
            cors: CorsConfig {
                enabled: parse_env_bool("CORS_ENABLED", cors.enabled),
                origins: parse_env_list("CORS_ORIGINS", &cors.origins),
                credentials: parse_env_bool("CORS_CREDENTIALS", cors.credentials),
                methods: parse_env_list("CORS_METHODS", &cors.methods),
                headers: parse_env_list("CORS_HEADERS", &cors.headers),
            },
            logging: LoggingConfig {
                level: parse_env_string("LOG_LEVEL", &logging.level),
                format: parse_env_or("LOG_FORMAT", logging.format),
                file: parse_env_string("LOG_FILE", &logging.file),
                enable_file_logging: parse_env_bool(
                    "ENABLE_FILE_LOGGING",
                    logging.enable_file_logging,
                ),
            },
            rate_limit: RateLimitConfig {
                enabled: parse_env_bool("RATE_LIMIT_ENABLED", rate_limit.enabled),
                requests: parse_env_or("RATE_LIMIT_REQUESTS", rate_limit.requests),
                period_secs: parse_env_or("RATE_LIMIT_PERIOD", rate_limit.period_secs),
            },
            cache: CacheConfig {
                enabled: parse_env_bool("CACHE_ENABLED", cache.enabled),
                ttl_secs: parse_env_or("CACHE_TTL", cache.ttl_secs),
                redis_url: parse_env_string("REDIS_URL", &cache.redis_url),
            },
            database: DatabaseConfig {
                enabled: parse_env_bool("DATABASE_ENABLED", database.enabled),
                url: parse_env_string("DATABASE_URL", &database.url),
            },
            request: RequestConfig {
                timeout_secs: parse_env_or("REQUEST_TIMEOUT", request.timeout_secs),
                max_retries: parse_env_or("MAX_RETRIES", request.max_retries),
            },
            security: SecurityConfig {
                allowed_hosts: parse_env_list("ALLOWED_HOSTS", &security.allowed_hosts),
                enable_https_redirect: parse_env_bool(
                    "ENABLE_HTTPS_REDIRECT",
                    security.enable_https_redirect,
                ),
            },
            monitoring: MonitoringConfig {
                health_check_enabled: parse_env_bool(
                    "HEALTH_CHECK_ENABLED",
                    monitoring.health_check_enabled,
                ),
                metrics_enabled: parse_env_bool("METRICS_ENABLED", monitoring.metrics_enabled),
            },
        }
    }

    /// Check the cross-field invariants that must hold before serving.
    ///
    /// Returns every violation, not just the first, so operators can fix
    /// them in one pass.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.vision.api_key.trim().is_empty() {
            errors.push("GEMINI_API_KEY is not set in environment variables".to_string());
        }

        if self.upload.max_file_size <= 0 {
            errors.push("MAX_FILE_SIZE must be greater than 0".to_string());
        }

        if !(1..=65535).contains(&self.server.port) {
            errors.push("PORT must be between 1 and 65535".to_string());
        }

        if self.rate_limit.enabled {
            if self.rate_limit.requests <= 0 {
                errors.push("RATE_LIMIT_REQUESTS must be greater than 0".to_string());
            }
            if self.rate_limit.period_secs <= 0 {
                errors.push("RATE_LIMIT_PERIOD must be greater than 0".to_string());
            }
        }

        if self.cache.enabled && self.cache.redis_url.is_empty() {
            errors.push("REDIS_URL must be set when CACHE_ENABLED is true".to_string());
        }

        if self.database.enabled && self.database.url.is_empty() {
            errors.push("DATABASE_URL must be set when DATABASE_ENABLED is true".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Log the effective configuration. Credentials are never printed.
    pub fn log_summary(&self) {
        let rule = "=".repeat(60);
        tracing::info!("{}", rule);
        tracing::info!("OCR API Configuration Summary");
        tracing::info!("{}", rule);
        tracing::info!("App Name: {}", self.app.name);
        tracing::info!("App Version: {}", self.app.version);
        tracing::info!("Debug Mode: {}", self.app.debug);
        tracing::info!("Server: {}", self.server.bind_addr());
        tracing::info!("Workers: {}", self.server.workers);
        tracing::info!("Vision Model: {}", self.vision.model);
        tracing::info!("Vision Timeout: {}s", self.vision.timeout_secs);
        tracing::info!("Max File Size: {:.2}MB", self.upload.max_file_size_mb());
        tracing::info!(
            "Allowed File Types: {}",
            self.upload.allowed_types.join(", ")
        );
        tracing::info!("CORS Enabled: {}", self.cors.enabled);
        tracing::info!("Rate Limiting: {}", self.rate_limit.enabled);
        tracing::info!("Caching: {}", self.cache.enabled);
        tracing::info!("Database: {}", self.database.enabled);
        tracing::info!("Health Check: {}", self.monitoring.health_check_enabled);
        tracing::info!("Metrics: {}", self.monitoring.metrics_enabled);
        tracing::info!("{}", rule);
    }
}

/// Known vision providers addressed with a `provider/model` prefix.
pub const KNOWN_VISION_PROVIDERS: &[&str] = &["gemini", "openai", "openrouter"];

/// Split a model name into `(provider, model)`.
///
/// Bare names default to Gemini, so `gemini-2.0-flash` and
/// `gemini/gemini-2.0-flash` are equivalent.
pub fn parse_vision_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_VISION_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("gemini", model)
}
