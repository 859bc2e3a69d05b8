use clap::{Parser, Subcommand};
use mint_front::{render::render, ApiClient, Controller};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mint", about = "Todo list client")]
struct Cli {
    /// Defaults to `MINT_API_URL`, then `http://localhost:4000`.
    #[arg(long, env = "MINT_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the list.
    List,
    Add {
        title: String,
    },
    Toggle {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let api = match cli.api_url {
        Some(url) => ApiClient::new(url),
        None => ApiClient::from_env(),
    };

    let mut controller = Controller::new(api);
    controller.mount().await;

    match cli.command.unwrap_or(Command::List) {
        Command::List => {}
        Command::Add { title } => {
            controller.edit_title(title);
            controller.submit().await;
        }
        Command::Toggle { id } => controller.toggle(id).await,
        Command::Delete { id } => controller.delete(id).await,
    }

    print!("{}", render(controller.state()));

    Ok(())
}
