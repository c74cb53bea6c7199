use crate::services::{
    access_policy::Combine,
    content_resolver::ContentResolver,
    normalizer::KeyCase,
    object_fetcher::DEFAULT_FETCH_TIMEOUT,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use std::{env, fs, path::PathBuf, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub gateway: GatewayConfig,
}

/// Everything that shapes how a path is resolved and served.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Served for empty paths; `None` turns empty paths into 400s.
    pub default_document: Option<String>,
    pub allowed_extensions: Vec<String>,
    pub allowed_prefixes: Vec<String>,
    pub combine: Combine,
    pub key_case: KeyCase,
    pub content_types: ContentResolver,
    pub fetch_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_document: Some(DEFAULT_DOCUMENT.into()),
            allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            allowed_prefixes: Vec::new(),
            combine: Combine::default(),
            key_case: KeyCase::default(),
            content_types: ContentResolver::builtin(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

const DEFAULT_DOCUMENT: &str = "index.html";
const DEFAULT_EXTENSIONS: [&str; 4] = [".xml", ".html", ".zip", ".exe"];

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Static asset gateway for update manifests, installers and pages"
)]
pub struct Args {
    /// Host to bind to (overrides GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory objects are served from (overrides GATEWAY_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Document served for empty paths (overrides GATEWAY_DEFAULT_DOCUMENT)
    #[arg(long)]
    pub default_document: Option<String>,

    /// Answer empty paths with 400 instead of a default document
    #[arg(long, conflicts_with = "default_document")]
    pub no_default_document: bool,

    /// Comma-separated extension allow-list, e.g. `.xml,.exe` (overrides GATEWAY_ALLOW_EXT)
    #[arg(long, value_delimiter = ',')]
    pub allow_ext: Option<Vec<String>>,

    /// Comma-separated path prefix allow-list (overrides GATEWAY_ALLOW_PREFIX)
    #[arg(long, value_delimiter = ',')]
    pub allow_prefix: Option<Vec<String>>,

    /// How extension and prefix lists combine when both are set (overrides GATEWAY_COMBINE)
    #[arg(long, value_enum)]
    pub combine: Option<Combine>,

    /// Key case policy (overrides GATEWAY_KEY_CASE)
    #[arg(long, value_enum)]
    pub key_case: Option<KeyCase>,

    /// JSON file adding or overriding content types (overrides GATEWAY_CONTENT_TYPES)
    #[arg(long)]
    pub content_types: Option<PathBuf>,

    /// Deadline for one storage fetch in milliseconds (overrides GATEWAY_FETCH_TIMEOUT_MS)
    #[arg(long)]
    pub fetch_timeout_ms: Option<u64>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_sources(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge parsed arguments over a variable lookup; arguments win.
    pub fn from_sources(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = lookup("GATEWAY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match lookup("GATEWAY_PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing GATEWAY_PORT value `{}`", value))?,
            None => 3000,
        };
        let env_storage = lookup("GATEWAY_STORAGE_DIR")
            .unwrap_or_else(|| "./downloads/autoupdate/app/client".into());

        let defaults = GatewayConfig::default();

        let default_document = if args.no_default_document {
            None
        } else {
            match args.default_document.or_else(|| lookup("GATEWAY_DEFAULT_DOCUMENT")) {
                // An explicitly empty value disables the default document.
                Some(doc) if doc.trim().is_empty() => None,
                Some(doc) => Some(doc),
                None => defaults.default_document,
            }
        };

        let allowed_extensions = args
            .allow_ext
            .or_else(|| lookup("GATEWAY_ALLOW_EXT").map(|v| split_list(&v)))
            .unwrap_or(defaults.allowed_extensions);
        let allowed_prefixes = args
            .allow_prefix
            .or_else(|| lookup("GATEWAY_ALLOW_PREFIX").map(|v| split_list(&v)))
            .unwrap_or(defaults.allowed_prefixes);

        let combine = match args.combine {
            Some(combine) => combine,
            None => parse_enum("GATEWAY_COMBINE", lookup("GATEWAY_COMBINE"))?
                .unwrap_or(defaults.combine),
        };
        let key_case = match args.key_case {
            Some(key_case) => key_case,
            None => parse_enum("GATEWAY_KEY_CASE", lookup("GATEWAY_KEY_CASE"))?
                .unwrap_or(defaults.key_case),
        };

        let mut content_types = defaults.content_types;
        if let Some(path) = args
            .content_types
            .or_else(|| lookup("GATEWAY_CONTENT_TYPES").map(PathBuf::from))
        {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading content types from {}", path.display()))?;
            let table = ContentResolver::parse_table(&raw)
                .with_context(|| format!("parsing content types in {}", path.display()))?;
            content_types.extend(table);
        }

        let fetch_timeout = match args.fetch_timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => match lookup("GATEWAY_FETCH_TIMEOUT_MS") {
                Some(value) => Duration::from_millis(value.parse::<u64>().with_context(|| {
                    format!("parsing GATEWAY_FETCH_TIMEOUT_MS value `{}`", value)
                })?),
                None => defaults.fetch_timeout,
            },
        };
        if fetch_timeout.is_zero() {
            anyhow::bail!("fetch timeout must be greater than zero");
        }

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            gateway: GatewayConfig {
                default_document,
                allowed_extensions,
                allowed_prefixes,
                combine,
                key_case,
                content_types,
                fetch_timeout,
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn parse_enum<T: ValueEnum>(name: &str, value: Option<String>) -> Result<Option<T>> {
    value
        .map(|v| {
            T::from_str(v.trim(), true)
                .map_err(|e| anyhow!("parsing {} value `{}`: {}", name, v, e))
        })
        .transpose()
}
