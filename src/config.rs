use anyhow::{Context, Result};
use clap::Parser;
use std::{env, fmt};

const DEFAULT_BUCKET: &str = "content";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_STORAGE_PATH: &str = "content/images";
const DEFAULT_STATIC_PREFIX: &str = "content/images";

/// Resolved configuration for the storage adapter.
///
/// Built once at process start; the adapter never reads the environment
/// itself.
#[derive(Clone, PartialEq)]
pub struct StorageConfig {
    /// Endpoint of an S3-compatible service, with or without scheme.
    /// `None` targets AWS S3.
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: String,
    pub region: String,
    /// Scheme used when `endpoint` has none.
    pub use_ssl: bool,
    pub force_path_style: bool,
    /// Base directory for files written through `save`.
    pub storage_path: String,
    /// Prefix for `save_raw` targets and served request paths.
    pub static_file_url_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            bucket: DEFAULT_BUCKET.into(),
            region: DEFAULT_REGION.into(),
            use_ssl: true,
            force_path_style: true,
            storage_path: DEFAULT_STORAGE_PATH.into(),
            static_file_url_prefix: DEFAULT_STATIC_PREFIX.into(),
        }
    }
}

impl StorageConfig {
    /// Endpoint URL with a scheme, if a custom endpoint is configured.
    pub fn endpoint_url(&self) -> Option<String> {
        let endpoint = self.endpoint.as_deref()?.trim();
        if endpoint.is_empty() {
            return None;
        }
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Some(endpoint.to_string());
        }
        let scheme = if self.use_ssl { "https" } else { "http" };
        Some(format!("{}://{}", scheme, endpoint))
    }
}

// Keep secrets out of startup logs.
impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("use_ssl", &self.use_ssl)
            .field("force_path_style", &self.force_path_style)
            .field("storage_path", &self.storage_path)
            .field("static_file_url_prefix", &self.static_file_url_prefix)
            .finish()
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Serve from an in-process object map instead of a real bucket.
    pub in_memory: bool,
    pub storage: StorageConfig,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Serve content-management uploads from S3-compatible storage")]
pub struct Args {
    /// Host to bind to (overrides CONTENT_STORE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CONTENT_STORE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// S3-compatible endpoint (overrides S3_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Access key id (overrides S3_ACCESS_KEY_ID)
    #[arg(long)]
    pub access_key_id: Option<String>,

    /// Secret access key (overrides S3_SECRET_ACCESS_KEY)
    #[arg(long)]
    pub secret_access_key: Option<String>,

    /// Bucket name (overrides S3_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Region (overrides S3_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Use https for a scheme-less endpoint (overrides S3_USE_SSL)
    #[arg(long)]
    pub use_ssl: Option<bool>,

    /// Path-style bucket addressing (overrides S3_FORCE_PATH_STYLE)
    #[arg(long)]
    pub force_path_style: Option<bool>,

    /// Base directory for saved files (overrides S3_STORAGE_PATH)
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Prefix for raw saves and served paths (overrides S3_STATIC_FILE_URL_PREFIX)
    #[arg(long)]
    pub static_file_url_prefix: Option<String>,

    /// Keep objects in memory instead of talking to a bucket
    #[arg(long)]
    pub in_memory: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();
        Self::resolve(args, |name| env::var(name).ok())
    }

    /// Merge CLI args over environment values over defaults.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = lookup("CONTENT_STORE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match lookup("CONTENT_STORE_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing CONTENT_STORE_PORT value `{}`", value))?,
            None => 3000,
        };
        let env_use_ssl = parse_flag(&lookup, "S3_USE_SSL", true)?;
        let env_path_style = parse_flag(&lookup, "S3_FORCE_PATH_STYLE", true)?;

        let defaults = StorageConfig::default();
        let storage = StorageConfig {
            endpoint: args.endpoint.or_else(|| lookup("S3_ENDPOINT")),
            access_key_id: args.access_key_id.or_else(|| lookup("S3_ACCESS_KEY_ID")),
            secret_access_key: args
                .secret_access_key
                .or_else(|| lookup("S3_SECRET_ACCESS_KEY")),
            bucket: args
                .bucket
                .or_else(|| lookup("S3_BUCKET"))
                .unwrap_or(defaults.bucket),
            region: args
                .region
                .or_else(|| lookup("S3_REGION"))
                .unwrap_or(defaults.region),
            use_ssl: args.use_ssl.unwrap_or(env_use_ssl),
            force_path_style: args.force_path_style.unwrap_or(env_path_style),
            storage_path: args
                .storage_path
                .or_else(|| lookup("S3_STORAGE_PATH"))
                .unwrap_or(defaults.storage_path),
            static_file_url_prefix: args
                .static_file_url_prefix
                .or_else(|| lookup("S3_STATIC_FILE_URL_PREFIX"))
                .unwrap_or(defaults.static_file_url_prefix),
        };

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            in_memory: args.in_memory,
            storage,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> Result<bool> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("parsing {} value `{}`: expected a boolean", name, value),
    }
}
