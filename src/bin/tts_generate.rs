//! Command line front end for the speech pipeline.
//!
//! Reads a text file, shows the chunk count and estimated cost, asks for
//! confirmation and writes a single MP3.

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tts_studio::domain::speech::{estimate_cost, GenerationRequest, SpeechModel, Voice};
use tts_studio::infrastructure::config::Config;
use tts_studio::infrastructure::repositories::OpenAiSpeechRepository;

const DEFAULT_TEXT: &str = "Your text here.";

/// Convert a text file to speech with the OpenAI TTS API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Path to the input text file
    #[arg(long, default_value = "input.txt")]
    input_file: PathBuf,

    /// Path to the output MP3 file
    #[arg(long, default_value = "speech.mp3")]
    output_file: PathBuf,

    /// TTS model (tts-1, tts-1-hd)
    #[arg(long, default_value = "tts-1")]
    model: SpeechModel,

    /// Voice (alloy, echo, fable, onyx, nova, shimmer)
    #[arg(long, default_value = "alloy")]
    voice: Voice,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tts_studio=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let Some(api_key) = cli.api_key.clone().filter(|key| !key.trim().is_empty()) else {
        bail!(
            "OpenAI API key not found. Set OPENAI_API_KEY or pass --api-key (e.g. tts-generate --api-key your-api-key)"
        );
    };
    let config = cli_config(&api_key, |key| std::env::var(key).ok())?;

    let text = read_input_text(&cli.input_file);
    let speech_repo = Arc::new(
        OpenAiSpeechRepository::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.request_timeout(),
        )
        .context("failed to build HTTP client")?,
    );
    let pipeline = tts_studio::build_pipeline(&config, speech_repo);
    let chunk_count = pipeline.chunker().split(&text).len();

    print_summary(&text, chunk_count, config.max_chunk_chars, cli.model);
    if !cli.force && !confirm()? {
        println!("Operation cancelled.");
        return Ok(());
    }

    let outcome = pipeline
        .generate(GenerationRequest {
            text,
            destination: cli.output_file.clone(),
            model: cli.model,
            voice: cli.voice,
        })
        .await
        .context("speech generation failed")?;

    println!(
        "Speech generated successfully and saved to {} ({} bytes, {} chunk(s), {:.1}s)",
        outcome.path.display(),
        outcome.size_bytes,
        outcome.chunk_count,
        outcome.elapsed.as_secs_f64()
    );

    Ok(())
}

/// Server configuration with the key resolved by clap taking precedence
fn cli_config<F>(api_key: &str, lookup: F) -> anyhow::Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    Config::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some(api_key.to_string()),
        _ => lookup(key),
    })
    .map_err(|e| anyhow!("invalid configuration: {}", e))
}

/// Contents of `path`, or the default text when it is missing, empty or unreadable
fn read_input_text(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => {
            println!(
                "Warning: Input file '{}' is empty. Using default text.",
                path.display()
            );
            DEFAULT_TEXT.to_string()
        }
        Ok(text) => text.trim().to_string(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!(
                "Input file '{}' not found. Using default text.",
                path.display()
            );
            DEFAULT_TEXT.to_string()
        }
        Err(e) => {
            println!(
                "Error reading file '{}': {}. Using default text.",
                path.display(),
                e
            );
            DEFAULT_TEXT.to_string()
        }
    }
}

fn print_summary(text: &str, chunk_count: usize, max_chunk_chars: usize, model: SpeechModel) {
    let text_length = text.chars().count();

    println!("\n====== Text-to-Speech Processing Information ======");
    println!("Text length: {} characters", text_length);
    if chunk_count > 1 {
        println!(
            "Processing required: {} chunks (max {} chars per chunk)",
            chunk_count, max_chunk_chars
        );
    } else {
        println!("Processing required: 1 chunk");
    }
    println!("Model: {}", model);
    println!(
        "Estimated cost: ${:.4}",
        estimate_cost(text_length, model)
    );
    if chunk_count > 1 {
        println!(
            "\nNote: The text will be split into {} parts and stitched together.",
            chunk_count
        );
    }
}

fn confirm() -> anyhow::Result<bool> {
    print!("\nDo you want to proceed? (y/n): ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().to_lowercase().starts_with('y'))
}
