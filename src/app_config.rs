use crate::domain::BoundingBox;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    server: Server,
    store: StoreSettings,
    routes: Routes,
    #[serde(default)]
    bounding_box: Option<BoundingBox>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config_local").required(false))
            .add_source(Environment::with_prefix("LOCUS").prefix_separator("_").separator("__"))
            .set_override_option("server.port", env::var("PORT").ok())?
            .build()?
            .try_deserialize()
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn store(&self) -> &StoreSettings {
        &self.store
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5000_i64)?
        .set_default("server.request_timeout", "10s")?
        .set_default("store.backend", "file")?
        .set_default("store.path", "locations.json")?
        .set_default("store.buffer_size", 64_i64)?
        .set_default("routes.api_prefix", "/api")?
        .set_default("routes.list_format", "array")?
        .set_default("routes.echo_record", false)?
        .set_default("routes.capture_source_address", false)?
        .set_default("routes.admin_listing", true)
}

#[derive(Debug, Deserialize)]
pub struct Server {
    host: String,
    port: u16,
    #[serde(with = "humantime_serde")]
    request_timeout: Duration,
}

impl Server {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct StoreSettings {
    backend: StoreBackend,
    path: PathBuf,
    buffer_size: usize,
}

impl StoreSettings {
    pub fn backend(&self) -> StoreBackend {
        self.backend
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    /// A bare array of records.
    Array,
    /// `{ "count": n, "locations": [...] }`
    Counted,
}

#[derive(Debug, Deserialize)]
pub struct Routes {
    #[serde(deserialize_with = "deserialize_api_prefix")]
    api_prefix: String,
    list_format: ListFormat,
    echo_record: bool,
    capture_source_address: bool,
    admin_listing: bool,
}

impl Routes {
    /// Either empty or a path starting with `/`, never ending in one.
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn list_format(&self) -> ListFormat {
        self.list_format
    }

    pub fn echo_record(&self) -> bool {
        self.echo_record
    }

    pub fn capture_source_address(&self) -> bool {
        self.capture_source_address
    }

    pub fn admin_listing(&self) -> bool {
        self.admin_listing
    }
}

fn deserialize_api_prefix<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    let prefix = value.trim().trim_end_matches('/');

    if !prefix.is_empty() && !prefix.starts_with('/') {
        return Err(Error::invalid_value(Unexpected::Str(&value), &"an empty prefix or a path starting with '/'"));
    }

    // Segments the router would read as captures or wildcards
    let has_capture = prefix
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*') || segment.contains(['{', '}']));
    if has_capture {
        return Err(Error::invalid_value(Unexpected::Str(&value), &"a literal path without ':', '*', '{' or '}' segments"));
    }

    Ok(prefix.to_string())
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                server: Server {
                    host: "127.0.0.1".to_string(),
                    port: 0,
                    request_timeout: Duration::from_secs(5),
                },
                store: StoreSettings {
                    backend: StoreBackend::File,
                    path: PathBuf::from("locations.json"),
                    buffer_size: 8,
                },
                routes: Routes {
                    api_prefix: "/api".to_string(),
                    list_format: ListFormat::Array,
                    echo_record: false,
                    capture_source_address: false,
                    admin_listing: true,
                },
                bounding_box: None,
            },
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.server.request_timeout = request_timeout;
        self
    }

    pub fn store_backend(mut self, backend: StoreBackend) -> Self {
        self.config.store.backend = backend;
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = path.into();
        self
    }

    pub fn api_prefix(mut self, prefix: &str) -> Self {
        self.config.routes.api_prefix = prefix.to_string();
        self
    }

    pub fn list_format(mut self, list_format: ListFormat) -> Self {
        self.config.routes.list_format = list_format;
        self
    }

    pub fn echo_record(mut self, echo_record: bool) -> Self {
        self.config.routes.echo_record = echo_record;
        self
    }

    pub fn capture_source_address(mut self, capture: bool) -> Self {
        self.config.routes.capture_source_address = capture;
        self
    }

    pub fn admin_listing(mut self, admin_listing: bool) -> Self {
        self.config.routes.admin_listing = admin_listing;
        self
    }

    pub fn bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.config.bounding_box = Some(bounding_box);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
