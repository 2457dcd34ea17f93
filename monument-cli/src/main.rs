use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use monument_cli::capture::ImageSelection;
use monument_cli::client::HttpFunctionsClient;
use monument_cli::render::render_card;
use monument_cli::session::{NoticeLevel, Session, IDENTIFY_FUNCTION};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "monument-cli", version, about = "Identify monuments from photos")]
struct Cli {
    /// Base URL of the identification relay
    #[arg(long, env = "MONUMENT_RELAY_URL", default_value = "http://localhost:8080", global = true)]
    relay_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify the monument in a local image file or image URL
    Identify {
        /// File path, http(s) URL, or data:image/ URL
        image: String,

        /// Relay function to invoke
        #[arg(long, default_value = IDENTIFY_FUNCTION)]
        function: String,

        /// Bearer token sent to the relay
        #[arg(long, env = "MONUMENT_API_KEY")]
        api_key: Option<String>,

        /// Print the record as JSON instead of a card
        #[arg(long)]
        json: bool,
    },
    /// Check relay health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Identify {
            image,
            function,
            api_key,
            json,
        } => identify(&cli.relay_url, &image, &function, api_key, json).await,
        Commands::Health => {
            let client = HttpFunctionsClient::new(&cli.relay_url, None);
            let status = client
                .health()
                .await
                .with_context(|| format!("Relay at {} is not healthy", cli.relay_url))?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
    }
}

async fn identify(
    relay_url: &str,
    image: &str,
    function: &str,
    api_key: Option<String>,
    json: bool,
) -> Result<()> {
    let selection = ImageSelection::from_arg(image)?;
    eprintln!("Analyzing {}...", selection.source());

    let mut session = Session::default();
    session.select_image(selection);

    let client = HttpFunctionsClient::new(relay_url, api_key);
    let notice = session.analyze(&client, function).await;
    eprintln!("{}", notice);

    let record = match (notice.level, session.record()) {
        (NoticeLevel::Success, Some(record)) => record,
        _ => bail!("{}", notice.description),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print!("{}", render_card(record));
    }

    Ok(())
}
