use crate::client::{
    ClientBuilder, ClientConfig, ServerProperties, StartServer, DEFAULT_ANNOTATORS,
    DEFAULT_OUTPUT_FORMAT, DEFAULT_SERIALIZER,
};
use crate::pipeline::{english_request_defaults, Language};
use crate::properties::Properties;
use crate::protocol::{Document, InputFormat, MatchResponse, OutputFormat};
use crate::server::{resolve_classpath, LaunchSettings, RobustService, ServerLaunch};
use crate::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Per-call overrides for [`Client::annotate_with`].
#[derive(Debug, Clone, Default)]
pub struct AnnotateOptions {
    pub annotators: Option<Vec<String>>,
    pub output_format: Option<OutputFormat>,
    pub properties_key: Option<String>,
    pub properties: Properties,
}

impl AnnotateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotators<I, S>(mut self, annotators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.annotators = Some(annotators.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn with_properties_key(mut self, key: impl Into<String>) -> Self {
        self.properties_key = Some(key.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.set(key, value);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties.update(&properties);
        self
    }
}

/// Per-call options for the pattern endpoints.
#[derive(Debug, Clone, Default)]
pub struct RegexOptions {
    /// Only return sentences that matched.
    pub filter: bool,
    pub annotators: Option<Vec<String>>,
    /// Replaces the client's default request properties.
    pub properties: Option<Properties>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Document(Document),
    Text { format: OutputFormat, body: String },
}

impl Annotation {
    pub fn into_document(self) -> Result<Document> {
        match self {
            Annotation::Document(doc) => Ok(doc),
            Annotation::Text { format, .. } => Err(Error::UnsupportedFormat(format!(
                "expected a json document, got {}",
                format
            ))),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Annotation::Text { body, .. } => Some(body),
            Annotation::Document(_) => None,
        }
    }
}

/// How the launched server was configured.
#[derive(Debug, Clone, Default)]
pub struct ServerStartInfo {
    pub props: Option<Properties>,
    pub props_file: Option<PathBuf>,
    pub preload_annotators: Option<String>,
    pub temp_props_file: bool,
}

#[derive(Debug)]
pub struct Client {
    config: ClientConfig,
    endpoint: String,
    http: reqwest::Client,
    service: Mutex<RobustService>,
    start_info: ServerStartInfo,
    properties_cache: RwLock<HashMap<String, Properties>>,
    props_file_removed: AtomicBool,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub async fn new(config: ClientConfig) -> Result<Self> {
        let url = Url::parse(&config.endpoint)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout * 2)
            .build()?;

        let (launch, start_info) = if config.start_server == StartServer::DontStart {
            (None, ServerStartInfo::default())
        } else {
            ensure_local(&url)?;
            let classpath = resolve_classpath(&config.classpath, |name| std::env::var(name).ok())?;
            let port = url
                .port_or_known_default()
                .ok_or_else(|| Error::config(format!("Endpoint {} has no port", url)))?;
            let start_info = server_start_info(&config)?;
            let preload = if config.preload {
                start_info.preload_annotators.as_deref()
            } else {
                None
            };
            let launch = ServerLaunch::java(&LaunchSettings {
                memory: &config.memory,
                classpath: &classpath,
                port,
                timeout_ms: config.timeout.as_millis() as u64,
                threads: config.threads,
                max_char_length: config.max_char_length,
                quiet: config.be_quiet,
                server_properties: start_info.props_file.as_deref(),
                preload,
                flags: &config.server_flags,
                options: &config.server_options,
            });
            (Some(launch), start_info)
        };

        let service = RobustService::new(
            &url,
            http.clone(),
            launch,
            config.start_server == StartServer::TryStart,
            config.check_alive_timeout,
        )?;

        let client = Self {
            endpoint: url.as_str().trim_end_matches('/').to_string(),
            config,
            http,
            service: Mutex::new(service),
            start_info,
            properties_cache: RwLock::new(HashMap::new()),
            props_file_removed: AtomicBool::new(false),
        };

        // Dropping the client on failure still removes the temporary props file.
        client.service.lock().await.start().await?;
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn server_start_info(&self) -> &ServerStartInfo {
        &self.start_info
    }

    pub async fn owns_server(&self) -> bool {
        self.service.lock().await.owns_process()
    }

    /// Annotates `text` and returns the JSON document.
    pub async fn annotate(&self, text: &str) -> Result<Document> {
        let options = AnnotateOptions::new().with_output_format(OutputFormat::Json);
        self.annotate_with(text, &options).await?.into_document()
    }

    #[instrument(skip(self, text, options), fields(chars = text.len()))]
    pub async fn annotate_with(&self, text: &str, options: &AnnotateOptions) -> Result<Annotation> {
        let properties = self.request_properties(options).await?;
        let format: OutputFormat = properties
            .get("outputFormat")
            .unwrap_or(DEFAULT_OUTPUT_FORMAT.as_str())
            .parse()?;

        if format != OutputFormat::Json && !format.is_textual() {
            return Err(Error::UnsupportedFormat(format!(
                "{} responses cannot be decoded; request json",
                format
            )));
        }

        let body = self.request(text, &properties, "/", None).await?;
        if format.is_textual() {
            return Ok(Annotation::Text { format, body });
        }
        Ok(Annotation::Document(serde_json::from_str(&body)?))
    }

    /// Layers request properties: client defaults, the properties key,
    /// explicit properties, then explicit annotators and output format.
    pub async fn request_properties(&self, options: &AnnotateOptions) -> Result<Properties> {
        let mut properties = Properties::new();
        if let Some(annotators) = self.config.annotators_string() {
            properties.set("annotators", annotators);
        }
        if let Some(format) = self.config.output_format {
            properties.set("outputFormat", format.as_str());
        }

        if let Some(key) = &options.properties_key {
            let lower = key.to_lowercase();
            match Language::from_name(&lower) {
                Some(Language::English) => properties = english_request_defaults(),
                Some(_) => properties.set("pipelineLanguage", lower),
                None => {
                    let cache = self.properties_cache.read().await;
                    properties = cache
                        .get(key)
                        .cloned()
                        .ok_or_else(|| Error::UnknownPropertiesKey(key.clone()))?;
                }
            }
        }

        properties.update(&options.properties);

        if let Some(annotators) = &options.annotators {
            properties.set("annotators", annotators.join(","));
        }
        if let Some(format) = options.output_format {
            properties.set("outputFormat", format.as_str());
        }

        if !properties.contains_key("outputFormat") {
            let fallback = self
                .start_info
                .props
                .as_ref()
                .and_then(|p| p.get("outputFormat"))
                .unwrap_or(DEFAULT_OUTPUT_FORMAT.as_str())
                .to_string();
            properties.set("outputFormat", fallback);
        }

        Ok(properties)
    }

    /// Stores `properties` under `key` for use with
    /// [`AnnotateOptions::with_properties_key`]. Language names are reserved
    /// for the server's stock defaults; returns whether the key was stored.
    pub async fn register_properties_key(&self, key: impl Into<String>, properties: Properties) -> bool {
        let key = key.into();
        if Language::is_language(&key) {
            warn!(
                "Key {} not registered in properties cache. Names of supported languages are reserved \
                 for the server's defaults for that language; use a key like \"{}-custom\" instead",
                key, key
            );
            return false;
        }
        self.properties_cache.write().await.insert(key, properties);
        true
    }

    #[instrument(skip(self, text))]
    pub async fn tokensregex(&self, text: &str, pattern: &str) -> Result<MatchResponse> {
        self.regex("/tokensregex", text, pattern, &RegexOptions::default()).await
    }

    #[instrument(skip(self, text))]
    pub async fn semgrex(&self, text: &str, pattern: &str) -> Result<MatchResponse> {
        self.regex("/semgrex", text, pattern, &RegexOptions::default()).await
    }

    #[instrument(skip(self, text))]
    pub async fn tregex(&self, text: &str, pattern: &str) -> Result<MatchResponse> {
        self.regex("/tregex", text, pattern, &RegexOptions::default()).await
    }

    pub async fn tokensregex_with(&self, text: &str, pattern: &str, options: &RegexOptions) -> Result<MatchResponse> {
        self.regex("/tokensregex", text, pattern, options).await
    }

    pub async fn semgrex_with(&self, text: &str, pattern: &str, options: &RegexOptions) -> Result<MatchResponse> {
        self.regex("/semgrex", text, pattern, options).await
    }

    pub async fn tregex_with(&self, text: &str, pattern: &str, options: &RegexOptions) -> Result<MatchResponse> {
        self.regex("/tregex", text, pattern, options).await
    }

    async fn regex(&self, path: &str, text: &str, pattern: &str, options: &RegexOptions) -> Result<MatchResponse> {
        let mut properties = match &options.properties {
            Some(properties) => properties.clone(),
            None => {
                let mut properties = self.start_info.props.clone().unwrap_or_default();
                properties.set("inputFormat", InputFormat::Text.as_str());
                properties.set("serializer", DEFAULT_SERIALIZER);
                properties
            }
        };
        if let Some(annotators) = &options.annotators {
            properties.set("annotators", annotators.join(","));
        }
        properties.set("outputFormat", OutputFormat::Json.as_str());

        let query = vec![
            ("properties".to_string(), properties.to_json_string()?),
            ("pattern".to_string(), pattern.to_string()),
            ("filter".to_string(), options.filter.to_string()),
        ];

        let body = self.request(text, &properties, path, Some(query)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POSTs `text` to `<endpoint><path>`. Without an explicit query the
    /// properties (with an output format) travel as the `properties` parameter.
    pub async fn request(
        &self,
        text: &str,
        properties: &Properties,
        path: &str,
        query: Option<Vec<(String, String)>>,
    ) -> Result<String> {
        self.service.lock().await.ensure_alive().await?;

        let query = match query {
            Some(query) => query,
            None => {
                let mut props = properties.clone();
                if !props.contains_key("outputFormat") {
                    props.set("outputFormat", DEFAULT_OUTPUT_FORMAT.as_str());
                }
                vec![("properties".to_string(), props.to_json_string()?)]
            }
        };

        let input = InputFormat::from_name(properties.get("inputFormat").unwrap_or("text"));
        let url = format!("{}{}", self.endpoint, path);
        debug!("POST {} ({} bytes)", url, text.len());

        let mut request = self
            .http
            .post(&url)
            .query(&query)
            .header(CONTENT_TYPE, input.content_type())
            .header(ACCEPT, "*/*")
            .body(text.to_string());
        if let Some((username, password)) = self.config.basic_auth() {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("{} did not answer in time", url))
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Stops a server this client launched and removes its temporary
    /// properties file.
    pub async fn shutdown(&self) -> Result<()> {
        self.service.lock().await.stop().await?;
        self.remove_temp_props_file();
        Ok(())
    }

    /// Returns whether this call removed the file; later calls are no-ops.
    fn remove_temp_props_file(&self) -> bool {
        if !self.start_info.temp_props_file || self.props_file_removed.swap(true, Ordering::SeqCst) {
            return false;
        }
        let Some(path) = &self.start_info.props_file else {
            return false;
        };
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                true
            }
            Err(e) => {
                warn!("Could not remove {}: {}", path.display(), e);
                false
            }
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // The server child is kill-on-drop; only the props file needs cleanup.
        self.remove_temp_props_file();
    }
}

fn ensure_local(url: &Url) -> Result<()> {
    match url.host_str() {
        Some(host) if host.starts_with("localhost") || host == "127.0.0.1" || host == "[::1]" => Ok(()),
        _ => Err(Error::config(format!(
            "Can only start a CoreNLP server on localhost, not {}",
            url
        ))),
    }
}

fn server_start_info(config: &ClientConfig) -> Result<ServerStartInfo> {
    match &config.properties {
        ServerProperties::Language(lang) => {
            info!(
                "Using Stanford CoreNLP default properties for: {}. Make sure to have {} models jar \
                 (available for download here: https://stanfordnlp.github.io/CoreNLP/) in CLASSPATH",
                lang, lang
            );
            Ok(ServerStartInfo {
                props_file: Some(PathBuf::from(lang.properties_file())),
                preload_annotators: Some(lang.default_annotators().to_string()),
                ..ServerStartInfo::default()
            })
        }
        ServerProperties::File(path) => {
            let mut start_info = ServerStartInfo {
                props_file: Some(path.clone()),
                ..ServerStartInfo::default()
            };
            if path.is_file() {
                let props = Properties::read_file(path)?;
                start_info.preload_annotators = props.get("annotators").map(str::to_string);
                start_info.props = Some(props);
            } else {
                warn!("{} does not correspond to a file path", path.display());
            }
            info!("Setting server defaults from: {}", path.display());

            if let Some(annotators) = config.annotators_string() {
                warn!("Server defaults being set server side, ignoring annotators={}", annotators);
            }
            if let Some(format) = config.output_format {
                warn!("Server defaults being set server side, ignoring output_format={}", format);
            }
            Ok(start_info)
        }
        ServerProperties::Default | ServerProperties::Map(_) => {
            let mut props = Properties::new()
                .with("annotators", DEFAULT_ANNOTATORS)
                .with("outputFormat", DEFAULT_OUTPUT_FORMAT.as_str())
                .with("serializer", DEFAULT_SERIALIZER);
            if let ServerProperties::Map(custom) = &config.properties {
                props.update(custom);
            }
            if let Some(annotators) = config.annotators_string() {
                props.set("annotators", annotators);
            }
            if let Some(format) = config.output_format {
                props.set("outputFormat", format.as_str());
            }

            let path = props.write_temp()?;
            Ok(ServerStartInfo {
                preload_annotators: props.get("annotators").map(str::to_string),
                props: Some(props),
                props_file: Some(path),
                temp_props_file: true,
            })
        }
    }
}
