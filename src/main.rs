use clap::Parser;

use claroche::cli::{Cli, Commands, seed};
use claroche::config::StaticConfig;
use claroche::runtime::server::run_server;
use claroche::services::LinkService;
use claroche::storage::StorageFactory;
use claroche::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = StaticConfig::load();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let _guard = init_logging(&config.logging);
            run_server(config).await
        }
        Commands::Seed => {
            let _guard = init_logging(&config.logging);
            let storage = StorageFactory::create(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!(e.format_colored()))?;
            let link_service = LinkService::new(storage.clone(), config.site.clone());
            seed::seed_demo_catalog(&storage, &link_service)
                .await
                .map_err(|e| anyhow::anyhow!(e.format_colored()))?;
            Ok(())
        }
        Commands::Landing { url } => {
            let _guard = init_logging(&config.logging);
            claroche::cli::landing::simulate_landing(&config, &url)
                .await
                .map_err(|e| anyhow::anyhow!(e.format_colored()))
        }
        Commands::SampleConfig => {
            println!("{}", StaticConfig::generate_sample_config());
            Ok(())
        }
    }
}
