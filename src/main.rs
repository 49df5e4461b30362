use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use weir::app::AppContext;
use weir::cli::{commands, Cli, Commands};
use weir::domain::Capabilities;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::new(None, Capabilities { pro: cli.pro })?;

    match cli.command {
        Commands::Add { url, title } => {
            commands::add_feed(&ctx, &url, title.as_deref()).await?;
        }
        Commands::Detect { url } => {
            commands::detect_feed(&ctx, &url).await?;
        }
        Commands::Remove { url } => {
            commands::remove_feed(&ctx, &url)?;
        }
        Commands::Sync => {
            commands::sync(&ctx).await?;
        }
        Commands::List { articles, all } => {
            if articles {
                commands::list_articles(&ctx, all)?;
            } else {
                commands::list_feeds(&ctx)?;
            }
        }
        Commands::Read { id } => {
            commands::toggle_read(&ctx, id)?;
        }
        Commands::Star { id } => {
            commands::toggle_star(&ctx, id)?;
        }
        Commands::Delete { id } => {
            commands::delete_article(&ctx, id)?;
        }
        Commands::Filter { action } => {
            commands::filter_command(&ctx, action)?;
        }
        Commands::Allow { action } => {
            commands::allow_command(&ctx, action)?;
        }
        Commands::Prune {
            days,
            include_starred,
            dry_run,
        } => {
            commands::prune(&ctx, days, include_starred, dry_run)?;
        }
    }

    Ok(())
}
