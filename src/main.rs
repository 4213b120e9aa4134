use std::io::{BufRead, Write as _};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parla::turn::{HttpTurnClient, TurnController, TurnService, TurnState};
use parla::voice::{CpalPlayer, CpalRecorder, Player, Recorder, TextToSpeech};
use parla::{Config, TurnPipeline};

/// Parla - push-to-talk language practice with an AI conversation coach
#[derive(Parser)]
#[command(name = "parla", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Remote turn endpoint URL (overrides config; in-process when unset)
    #[arg(long, env = "PARLA_SERVER_URL")]
    server_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "¡Hola! Esto es una prueba de voz.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,parla=info",
        1 => "info,parla=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if cli.server_url.is_some() {
        config.server_url = cli.server_url;
    }

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration),
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    practice(config).await
}

/// Interactive push-to-talk practice loop
#[allow(clippy::future_not_send)]
async fn practice(config: Config) -> anyhow::Result<()> {
    let service: Box<dyn TurnService> = match &config.server_url {
        Some(url) => {
            tracing::info!(url = %url, "using remote turn endpoint");
            Box::new(HttpTurnClient::new(url.clone()))
        }
        None => {
            tracing::info!("using in-process pipeline");
            Box::new(TurnPipeline::from_config(&config)?)
        }
    };

    let recorder = CpalRecorder::new()?;
    let player = CpalPlayer::new()?;
    let mut controller = TurnController::new(recorder, player, service, config.history);

    println!(
        "Practicing {} with {}. Press Enter to start/stop speaking, \
         'r' to replay the last reply, 'q' to quit.",
        config.persona.language, config.persona.name
    );

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match controller.state() {
            TurnState::Idle => print!("[idle] Enter to speak > "),
            TurnState::Listening => print!("[listening] Enter to send > "),
            TurnState::Error => print!("[error] Enter to dismiss > "),
            TurnState::Uploading | TurnState::Speaking => {}
        }
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        match line?.trim() {
            "q" => break,
            "r" => {
                controller.replay().await;
            }
            "" => match controller.state() {
                TurnState::Idle => controller.press_down(),
                TurnState::Listening => {
                    controller.press_up().await;
                    if controller.state() == TurnState::Speaking {
                        for entry in controller.history().window(2) {
                            println!("  {}: {}", entry.role.as_str(), entry.content);
                        }
                        controller.await_playback().await;
                    }
                }
                TurnState::Error => controller.cancel(),
                TurnState::Uploading | TurnState::Speaking => {}
            },
            other => println!("unknown input '{other}' (Enter, 'r', or 'q')"),
        }

        if let Some(message) = controller.surfaced_error() {
            eprintln!("error: {message}");
        }
    }

    // Release any live recording/playback handles before exiting
    controller.shutdown().await;

    Ok(())
}

/// Record for a few seconds and report what was captured
fn test_mic(duration: u64) -> anyhow::Result<()> {
    let mut recorder = CpalRecorder::new()?;

    println!("Recording for {duration}s...");
    recorder.begin()?;
    std::thread::sleep(Duration::from_secs(duration));
    let wav = recorder.finish()?;

    println!("Captured {} bytes of WAV audio.", wav.len());
    Ok(())
}

/// Synthesize a phrase and play it back
#[allow(clippy::future_not_send)]
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    let tts = TextToSpeech::new(
        config.require_openai_key()?,
        config.voice.tts_voice.clone(),
        config.voice.tts_speed,
        config.voice.tts_model.clone(),
    )?;

    println!("Synthesizing: {text}");
    let audio = tts.synthesize(text).await?;

    let mut player = CpalPlayer::new()?;
    player.start(&audio).await?;
    player.wait_done().await?;

    Ok(())
}
