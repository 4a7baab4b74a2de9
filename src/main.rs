mod common;
mod config;
mod media;
mod network;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use network::{ApiClient, ApiWorker};
use tokio::sync::mpsc;
use ui::{AppState, ChatApp};

use crate::common::ChatMessage;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(
    name = "medibot_chat",
    version,
    about = "Desktop chat client for the MediBot medical information service"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Base URL of the MediBot API
    #[arg(long, env = "MEDIBOT_API_URL", value_name = "URL")]
    api_url: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, env = "MEDIBOT_TIMEOUT_SECS", value_name = "SECS")]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
enum Mode {
    /// Probe the service health endpoint and exit (no UI)
    Health,
    /// Send a single message and print the reply (no UI)
    Ask {
        /// Question text
        #[arg(default_value = "")]
        message: String,
        /// Image of medication packaging to attach
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config).with_overrides(cli.api_url, cli.timeout_secs);

    let client = match ApiClient::new(&app_config.api_base_url, app_config.request_timeout()) {
        Ok(client) => client,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match cli.mode {
        Some(Mode::Health) => run_health(&client).await,
        Some(Mode::Ask { message, image }) => {
            run_ask(&client, &app_config, message, image).await
        }
        None => match run_gui(client, &app_config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("UI terminated: {err}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_health(client: &ApiClient) -> ExitCode {
    match client.health().await {
        Ok(health) => {
            println!(
                "{}: status={} version={} image analysis={}",
                client.base_url(),
                health.status.as_deref().unwrap_or("unknown"),
                health.version.as_deref().unwrap_or("unknown"),
                if health.google_ai_configured {
                    "available"
                } else {
                    "unavailable"
                }
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("API health check failed: {err}");
            println!("{}: unreachable ({err})", client.base_url());
            ExitCode::FAILURE
        }
    }
}

/// One send through the same state machine the UI uses.
async fn run_ask(
    client: &ApiClient,
    app_config: &AppConfig,
    message: String,
    image: Option<PathBuf>,
) -> ExitCode {
    let mut state = AppState::new();
    state.composer.text = message;

    if let Some(path) = image {
        match media::load(&path, app_config.max_image_bytes).await {
            Ok(image) => state.composer.stage_image(image),
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let Some(request) = state.begin_send() else {
        eprintln!("error: nothing to send (provide a message or --image)");
        return ExitCode::FAILURE;
    };
    let event = network::client::send_chat(client, &request).await;
    state.handle_event(event);

    match state.store.last() {
        Some(reply) => {
            print_reply(reply);
            if reply.is_error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        None => ExitCode::FAILURE,
    }
}

fn print_reply(reply: &ChatMessage) {
    println!("{}", reply.text);
    if let Some(label) = ui::markup::confidence_label(reply.confidence) {
        println!("\n{label}");
    }
    if let Some(info) = &reply.medication_info {
        println!("\nMedication: {}", info.name);
        for (label, value) in [
            ("Purpose", &info.purpose),
            ("Dosage", &info.dosage),
            ("Warnings", &info.warnings),
        ] {
            if let Some(value) = value {
                println!(
                    "  {label}: {}",
                    ui::markup::preview(value, ui::markup::PREVIEW_CHARS)
                );
            }
        }
    }
    if !reply.sources.is_empty() {
        println!("\nSources: {}", reply.sources.join(", "));
    }
}

async fn run_gui(client: ApiClient, app_config: &AppConfig) -> Result<(), eframe::Error> {
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(32);

    let api_base_url = client.base_url().to_string();
    let max_image_bytes = app_config.max_image_bytes;
    tokio::spawn(ApiWorker::new(client, max_image_bytes, event_tx, cmd_rx).run());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MediBot")
            .with_inner_size([900.0, 720.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "MediBot",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!("Client started against {api_base_url}");

            Ok(Box::new(ChatApp::new(
                cc,
                api_base_url.clone(),
                max_image_bytes,
                cmd_tx.clone(),
                event_receiver,
            )))
        }),
    )
}
