use clap::Parser;
use smart_basket::api;
use smart_basket::utils::error::ErrorSeverity;
use smart_basket::utils::{logger, validation::Validate};
use smart_basket::{BasketConfig, BasketError, CliConfig, ComparisonService, OutputFormat, RankedResultSet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting smart-basket CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Comparison failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 2,
            ErrorSeverity::Medium => 4,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<(), BasketError> {
    cli.validate()?;

    let mut config = BasketConfig::from_file(&cli.config)?;
    if let Some(ttl) = cli.ttl_seconds {
        config.set_ttl_seconds(ttl);
        tracing::info!("🔧 Cache TTL overridden to {}s", ttl);
    }
    config.validate()?;

    let raw = cli.shopping_list()?;
    let service = ComparisonService::from_config(&config)?;

    let mut results = service.compare(&raw).await?;
    for attempt in 2..=cli.repeat {
        let started = std::time::Instant::now();
        results = service.compare(&raw).await?;
        tracing::info!("Run {} finished in {:?}", attempt, started.elapsed());
    }

    match cli.format {
        OutputFormat::Table => print_table(&results),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&api::to_views(&results))?)
        }
        OutputFormat::Csv => print!("{}", api::to_csv(&results)?),
    }

    Ok(())
}

fn print_table(results: &RankedResultSet) {
    if let Some(best) = results.cheapest() {
        println!("🏆 Cheapest store: {} with a total of {}", best.store, best.total);
        println!();
    }

    for (rank, store) in results.stores().iter().enumerate() {
        println!("{}. {:<20} Total: {}", rank + 1, store.store.name, store.total);
        for found in &store.items {
            let price = found
                .price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            println!("     {:<40} {:>10}", found.name, price);
        }
        if !store.is_complete() {
            println!("     ({} item(s) without a price, not counted)", store.unpriced);
        }
        println!();
    }

    println!(
        "Prices fetched at {}",
        results.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}
