use crate::client::Client;
use crate::pipeline::Language;
use crate::properties::Properties;
use crate::protocol::OutputFormat;
use crate::server::CHECK_ALIVE_TIMEOUT;
use crate::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:9000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const DEFAULT_THREADS: usize = 5;
pub const DEFAULT_ANNOTATORS: &str = "tokenize,ssplit,pos,lemma,ner,depparse";
pub const DEFAULT_OUTPUT_FORMAT: OutputFormat = OutputFormat::Json;
pub const DEFAULT_MEMORY: &str = "5G";
pub const DEFAULT_MAX_CHAR_LENGTH: usize = 100_000;
pub const DEFAULT_SERIALIZER: &str = "edu.stanford.nlp.pipeline.ProtobufAnnotationSerializer";

/// Whether the client launches its own server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartServer {
    /// Only talk to an already running server.
    DontStart,
    /// Launch a server; fail if the port is taken.
    ForceStart,
    /// Launch a server unless one already holds the port.
    #[default]
    TryStart,
}

impl FromStr for StartServer {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "dontstart" | "dont" | "never" => Ok(StartServer::DontStart),
            "forcestart" | "force" => Ok(StartServer::ForceStart),
            "trystart" | "try" => Ok(StartServer::TryStart),
            other => Err(crate::Error::config(format!("Unknown start mode: {}", other))),
        }
    }
}

/// Where a launched server takes its default properties from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ServerProperties {
    /// Client-side defaults written to a temporary file.
    #[default]
    Default,
    /// The stock properties of a supported language.
    Language(Language),
    /// A properties file on disk or on the server's classpath.
    File(PathBuf),
    /// Client-side defaults overlaid with these entries.
    Map(Properties),
}

impl ServerProperties {
    /// A language name selects its stock properties; anything else is a path.
    pub fn from_name_or_path(value: &str) -> Self {
        match Language::from_name(value) {
            Some(lang) => ServerProperties::Language(lang),
            None => ServerProperties::File(PathBuf::from(value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub start_server: StartServer,
    pub timeout: Duration,
    pub threads: usize,
    pub annotators: Option<Vec<String>>,
    pub properties: ServerProperties,
    pub output_format: Option<OutputFormat>,
    pub memory: String,
    pub be_quiet: bool,
    pub max_char_length: usize,
    pub preload: bool,
    pub classpath: String,
    pub server_flags: Vec<String>,
    pub server_options: BTreeMap<String, String>,
    pub check_alive_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            start_server: StartServer::default(),
            timeout: DEFAULT_TIMEOUT,
            threads: DEFAULT_THREADS,
            annotators: None,
            properties: ServerProperties::default(),
            output_format: None,
            memory: DEFAULT_MEMORY.to_string(),
            be_quiet: false,
            max_char_length: DEFAULT_MAX_CHAR_LENGTH,
            preload: true,
            classpath: String::new(),
            server_flags: Vec::new(),
            server_options: BTreeMap::new(),
            check_alive_timeout: CHECK_ALIVE_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn annotators_string(&self) -> Option<String> {
        self.annotators.as_ref().map(|a| a.join(","))
    }

    pub(crate) fn basic_auth(&self) -> Option<(String, String)> {
        let username = self.server_options.get("username")?;
        let password = self.server_options.get("password")?;
        Some((username.clone(), password.clone()))
    }

    pub async fn connect(self) -> Result<Client> {
        Client::new(self).await
    }
}

#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn with_start_server(mut self, start_server: StartServer) -> Self {
        self.config.start_server = start_server;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn with_annotators<I, S>(mut self, annotators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.annotators = Some(annotators.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_properties(mut self, properties: ServerProperties) -> Self {
        self.config.properties = properties;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = Some(format);
        self
    }

    pub fn with_memory(mut self, memory: impl Into<String>) -> Self {
        self.config.memory = memory.into();
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.config.be_quiet = quiet;
        self
    }

    pub fn with_max_char_length(mut self, max: usize) -> Self {
        self.config.max_char_length = max;
        self
    }

    pub fn with_preload(mut self, preload: bool) -> Self {
        self.config.preload = preload;
        self
    }

    pub fn with_classpath(mut self, classpath: impl Into<String>) -> Self {
        self.config.classpath = classpath.into();
        self
    }

    /// `ssl` or `strict`.
    pub fn with_server_flag(mut self, flag: impl Into<String>) -> Self {
        self.config.server_flags.push(flag.into());
        self
    }

    /// One of `status_port`, `uriContext`, `key`, `username`, `password`,
    /// `blacklist`, `server_id`.
    pub fn with_server_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.server_options.insert(name.into(), value.into());
        self
    }

    pub fn with_check_alive_timeout(mut self, timeout: Duration) -> Self {
        self.config.check_alive_timeout = timeout;
        self
    }

    pub fn build_without_connecting(self) -> ClientConfig {
        self.config
    }

    pub async fn connect(self) -> Result<Client> {
        Client::new(self.config).await
    }
}
