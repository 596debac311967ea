//! CLI for photostyle - restyle photos with Gemini.

use clap::{Args, Parser, Subcommand};
use photostyle::session::{loading_message, SessionState};
use photostyle::{
    catalog, CredentialStore, GeminiClient, GeminiModel, ImagePayload, Session, StyleId,
    TransformConfig,
};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// How often the progress message changes.
const LOADING_MESSAGE_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(name = "photostyle")]
#[command(about = "Turn a photo into 3D, cartoon, Disney, out-focusing or caricature art via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Restyle a photo
    Transform(TransformArgs),

    /// List available styles
    Styles,

    /// Manage the stored Gemini API key
    #[command(subcommand)]
    Key(KeyCommand),

    /// Check that the API key and model are usable
    Check(CheckArgs),
}

#[derive(Args)]
struct TransformArgs {
    /// Photo to restyle (JPEG, PNG or WebP)
    input: PathBuf,

    /// Style to apply
    #[arg(short, long)]
    style: StyleId,

    /// Output file path (default: styled_image_<millis>.<ext>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    remote: RemoteArgs,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    remote: RemoteArgs,
}

#[derive(Args)]
struct RemoteArgs {
    /// Gemini model: `preview` (gemini-2.5-flash-image-preview) or `stable` (gemini-2.5-flash-image)
    #[arg(long, default_value = "gemini-2.5-flash-image-preview")]
    model: GeminiModel,

    /// API key (overrides GOOGLE_API_KEY and the stored key)
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Store an API key for later runs
    Set {
        /// The Gemini API key
        key: String,
    },
    /// Show the stored key (masked)
    Show,
    /// Remove the stored key
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform(args) => {
            run_transform(args, cli.json).await?;
        }
        Commands::Styles => {
            list_styles(cli.json)?;
        }
        Commands::Key(command) => {
            manage_key(command, cli.json)?;
        }
        Commands::Check(args) => {
            check(args, cli.json).await?;
        }
    }

    Ok(())
}

fn client_and_config(remote: &RemoteArgs) -> anyhow::Result<(GeminiClient, TransformConfig)> {
    let store = CredentialStore::open_default()?;
    let config = TransformConfig::resolve(remote.api_key.as_deref(), &store)?;
    let client = GeminiClient::builder().model(remote.model).build();
    Ok((client, config))
}

async fn run_transform(args: TransformArgs, json_output: bool) -> anyhow::Result<()> {
    let (client, config) = client_and_config(&args.remote)?;

    let mut session = Session::new();
    session.select_image(ImagePayload::from_file(&args.input)?)?;
    let pending = session.begin(args.style)?;

    if !json_output {
        eprintln!("Converting to {} style...", pending.style.name);
    }

    let request = photostyle::transform(
        &client,
        &pending.image,
        pending.style.instruction,
        &config,
    );
    tokio::pin!(request);

    let mut ticker = tokio::time::interval(LOADING_MESSAGE_INTERVAL);
    let mut tick = 0usize;
    let outcome = loop {
        tokio::select! {
            outcome = &mut request => break outcome,
            _ = ticker.tick() => {
                if !json_output {
                    eprintln!("{}", loading_message(tick));
                }
                tick += 1;
            }
        }
    };
    session.finish(outcome);

    match session.state() {
        SessionState::Completed {
            original,
            style,
            generated,
        } => {
            let output = match args.output {
                Some(path) => path,
                None => PathBuf::from(generated.download_file_name(now_millis())),
            };
            generated.save(&output)?;

            if json_output {
                let result = serde_json::json!({
                    "success": true,
                    "input": args.input.display().to_string(),
                    "output": output.display().to_string(),
                    "style": style,
                    "mime_type": generated.mime_type,
                    "size_bytes": generated.size(),
                    "input_size_bytes": original.size(),
                    "model": args.remote.model.as_str(),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!(
                    "Styled image: {} ({} bytes, {})",
                    output.display(),
                    generated.size(),
                    generated.mime_type
                );
            }
            Ok(())
        }
        SessionState::Failed { message, style, .. } => {
            if json_output {
                let result = serde_json::json!({
                    "success": false,
                    "style": style,
                    "error": message,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            anyhow::bail!("{message}")
        }
        other => anyhow::bail!("unexpected session state: {other:?}"),
    }
}

async fn check(args: CheckArgs, json_output: bool) -> anyhow::Result<()> {
    let (client, config) = client_and_config(&args.remote)?;
    let credential = config
        .credential
        .ok_or(photostyle::PhotoStyleError::MissingCredential)?;

    client
        .health_check(&credential)
        .await
        .map_err(|failure| photostyle::PhotoStyleError::from_remote_message(failure.0))?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "model": args.remote.model.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("OK: {} is reachable", args.remote.model.as_str());
    }
    Ok(())
}

fn manage_key(command: KeyCommand, json_output: bool) -> anyhow::Result<()> {
    let store = CredentialStore::open_default()?;

    match command {
        KeyCommand::Set { key } => {
            let credential = store.save(&key)?;
            if json_output {
                let result = serde_json::json!({
                    "stored": true,
                    "path": store.path().display().to_string(),
                    "key": credential.masked(),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Stored API key in {}", store.path().display());
            }
        }
        KeyCommand::Show => {
            let credential = store.load()?;
            if json_output {
                let result = serde_json::json!({
                    "path": store.path().display().to_string(),
                    "key": credential.as_ref().map(|c| c.masked()),
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match credential {
                    Some(c) => println!("{} ({})", c.masked(), store.path().display()),
                    None => println!("No API key stored"),
                }
            }
        }
        KeyCommand::Clear => {
            let removed = store.clear()?;
            if json_output {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else if removed {
                println!("Removed stored API key");
            } else {
                println!("No API key stored");
            }
        }
    }

    Ok(())
}

fn list_styles(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(catalog())?);
    } else {
        println!("Available styles:\n");
        for style in catalog() {
            println!("  {:<14} {}", style.id.as_str(), style.name);
            println!("    {}", style.instruction);
        }
    }

    Ok(())
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
