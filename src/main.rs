use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mailsmith::document::{extract_text, DocumentFormat};
use mailsmith::{analyze_document, compare_documents, generate_email, CompletionClient, Config};

/// Batch CLI over the outreach core. The web frontend consumes the same
/// library surface out-of-tree.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mailsmith v{}", env!("CARGO_PKG_VERSION"));

    let client = CompletionClient::new(&config);
    info!("Completion client initialized (primary model: {})", client.primary_model());

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("generate-email") => {
            let task = args.next().context("missing TASK argument")?;
            let recipient = args.next().context("missing RECIPIENT argument")?;
            let email = generate_email(&task, &recipient, &client).await?;
            println!("{}", serde_json::to_string_pretty(&email)?);
        }
        Some("analyze") => {
            let path = args.next().context("missing FILE argument")?;
            let analysis =
                analyze_document(&read_document(&path)?, &client, &config.analyzer_config())
                    .await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Some("compare") => {
            let path_a = args.next().context("missing first FILE argument")?;
            let path_b = args.next().context("missing second FILE argument")?;
            let comparison = compare_documents(
                &path_a,
                &read_document(&path_a)?,
                &path_b,
                &read_document(&path_b)?,
                &client,
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        _ => bail!(
            "usage: mailsmith <generate-email TASK RECIPIENT | analyze FILE | compare FILE FILE>"
        ),
    }

    Ok(())
}

fn read_document(path: &str) -> Result<String> {
    let format = DocumentFormat::from_filename(path)
        .with_context(|| format!("unrecognized document format: {path}"))?;
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
    let text = extract_text(&bytes, format)?;
    Ok(text)
}
