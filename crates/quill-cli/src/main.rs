//! quill - streaming AI chat client

mod config;
mod models;
mod ui;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use quill_ai::ChatClient;
use quill_chat::{
    ChatController, ControllerConfig, EndpointTransport, PresentationSurface, StreamTransport,
};

use crate::config::Config;
use crate::models::ModelInfo;

/// quill - streaming AI chat client
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model to use (display name or identifier)
    #[arg(short, long)]
    model: Option<String>,

    /// Endpoint base URL override
    #[arg(long)]
    endpoint: Option<String>,

    /// Send a single prompt and stream the reply to stdout (no TUI)
    #[arg(short, long)]
    prompt: Option<String>,

    /// List registered models
    #[arg(long)]
    list_models: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Presentation surface for one-shot mode: deltas go straight to stdout.
struct PlainSurface;

impl PresentationSurface for PlainSurface {
    fn render_user_message(&mut self, _text: &str) {}

    fn begin_assistant_message(&mut self) {}

    fn append_assistant_delta(&mut self, delta: &str) {
        print!("{}", delta);
        let _ = std::io::stdout().flush();
    }

    fn set_font_scale(&mut self, _size: u16) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing (stderr, so TUI output stays clean)
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("quill=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = Config::load();
    tracing::debug!(path = %Config::config_path().display(), "config loaded");
    let registry = models::registry(&cfg.models);

    if args.list_models {
        for model in &registry {
            println!("{:<36} {}", model.name, model.id);
        }
        return Ok(());
    }

    // CLI takes precedence over config; unknown names pass through as ids
    let requested = args
        .model
        .or(cfg.model.clone())
        .unwrap_or_else(|| registry[0].name.clone());
    let model = models::resolve(&registry, &requested)
        .cloned()
        .unwrap_or_else(|| ModelInfo {
            name: requested.clone(),
            id: requested,
        });

    let endpoint = args.endpoint.or(cfg.endpoint.clone());
    let max_tokens = cfg.max_tokens.unwrap_or(quill_ai::client::DEFAULT_MAX_TOKENS);

    // Missing credentials are non-fatal: the TUI starts with submission
    // disabled and a warning instead.
    let transport: Option<Arc<dyn StreamTransport>> = cfg.resolve_api_key().map(|key| {
        let mut client = ChatClient::new(key);
        if let Some(ref base_url) = endpoint {
            client = client.with_base_url(base_url);
        }
        Arc::new(EndpointTransport::new(client, max_tokens)) as Arc<dyn StreamTransport>
    });

    let controller_config = ControllerConfig {
        model: model.id.clone(),
        context_limit: cfg.context_limit.unwrap_or(quill_chat::controller::DEFAULT_CONTEXT_LIMIT),
        font_scale: cfg.font_size.unwrap_or(14),
    };

    if let Some(prompt) = args.prompt {
        return run_prompt(controller_config, transport, &prompt).await;
    }

    let surface = ui::TuiSurface::new(registry, model.name.clone(), controller_config.font_scale);
    let mut controller = ChatController::new(controller_config, transport, surface);
    ui::run_tui(&mut controller).await
}

/// One-shot mode: submit a single prompt and stream the reply to stdout.
async fn run_prompt(
    config: ControllerConfig,
    transport: Option<Arc<dyn StreamTransport>>,
    prompt: &str,
) -> anyhow::Result<()> {
    if transport.is_none() {
        anyhow::bail!(
            "no API key configured; add api_key to the config file, \
             set OPENROUTER_API_KEY, or create APIKEY.txt"
        );
    }

    let mut controller = ChatController::new(config, transport, PlainSurface);
    controller
        .submit(prompt)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    while controller.is_streaming() {
        let event = controller.next_event().await;
        controller.handle_event(event);
    }
    println!();

    if let Some(reason) = &controller.conversation().last_error {
        anyhow::bail!("request failed: {}", reason);
    }
    Ok(())
}
