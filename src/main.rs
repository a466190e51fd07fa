use clap::{Parser, ValueEnum};
use corenlp_client::client::DEFAULT_ENDPOINT;
use corenlp_client::demo::{self, ANNOTATORS, SAMPLE_TEXT};
use corenlp_client::{Client, StartServer};
use std::io::Write;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "corenlp-demo", version)]
#[command(about = "Annotate a sample text with a CoreNLP server and print the results", long_about = None)]
struct Cli {
    /// CoreNLP server endpoint
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Whether to launch a local server
    #[arg(short, long, value_enum, default_value_t = StartMode::Try)]
    start_server: StartMode,

    /// Server-side annotation timeout in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout: u64,

    /// Java heap size for a launched server
    #[arg(short, long, default_value = "8G")]
    memory: String,

    /// Directory holding the CoreNLP jars (defaults to $CORENLP_HOME)
    #[arg(long, default_value = "")]
    classpath: String,

    /// Text to annotate
    #[arg(short, long, default_value = SAMPLE_TEXT)]
    text: String,

    /// Silence a launched server's output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StartMode {
    Try,
    Force,
    Dont,
}

impl From<StartMode> for StartServer {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Try => StartServer::TryStart,
            StartMode::Force => StartServer::ForceStart,
            StartMode::Dont => StartServer::DontStart,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut stdout = std::io::stdout().lock();
    demo::write_input(&mut stdout, &cli.text)?;
    stdout.flush()?;

    let client = Client::builder()
        .with_endpoint(&cli.endpoint)
        .with_start_server(cli.start_server.into())
        .with_annotators(ANNOTATORS)
        .with_timeout(Duration::from_millis(cli.timeout))
        .with_memory(&cli.memory)
        .with_classpath(&cli.classpath)
        .with_quiet(cli.quiet)
        .connect()
        .await?;
    info!("Connected to CoreNLP at {}", client.endpoint());

    let outcome = demo::run(&client, &cli.text, &mut stdout).await;
    let shutdown = client.shutdown().await;
    outcome?;
    shutdown?;
    Ok(())
}
