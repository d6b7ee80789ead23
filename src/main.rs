use clap::Parser;
use graphcli::cli::{handle_keyring_clear, Cli};
use graphcli::commands::greet_user;
use graphcli::console::Console;
use graphcli::graph_api::{ConsolePrompter, GraphContext};
use graphcli::menu::run_menu;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let cli = Cli::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Cannot load settings: {}", e);
            return Err(e.into());
        }
    };

    if cli.clear_keyring {
        handle_keyring_clear(&settings)?;
        return Ok(());
    }

    let defaults = settings.defaults.clone();
    let mut graph = GraphContext::new();
    graph.initialize(settings, Arc::new(ConsolePrompter)).await?;

    let mut console = Console::stdio();

    // Sign-in happens here, on the first token request
    if let Err(e) = greet_user(&graph, &mut console).await {
        tracing::error!("greeting failed: {}", e);
        println!("Error getting user: {}", e);
    }

    run_menu(&graph, &mut console, &defaults).await?;
    Ok(())
}

fn init_logger() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graphcli=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
