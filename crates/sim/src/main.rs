//! Chain engine simulator.
//!
//! Loads a content directory, builds a [`Dispatcher`] over the in-memory host,
//! runs the world file's request once and prints the result.
//!
//! # Examples
//!
//! ```bash
//! CHAIN_WORLD=wheat_farm cargo run -p chain-sim
//! CHAIN_WORLD=ore_vein CHAIN_OUTPUT=json RUST_LOG=chain=debug cargo run -p chain-sim
//! ```
mod config;

use std::sync::Arc;

use anyhow::Result;
use chain_content::ContentFactory;
use chain_core::{ActionResult, Dispatcher};
use serde_json::json;

use crate::config::{OutputFormat, SimConfig};

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();

    let config = SimConfig::from_env();
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("World: {}", config.world);

    let factory = ContentFactory::new(&config.data_dir);
    let dispatcher = Dispatcher::builder()
        .config(factory.load_config()?)
        .filters(Arc::new(factory.load_filters()?))
        .rules(Arc::new(factory.load_rules()?))
        .build();

    let scenario = factory.load_world(&config.world)?;
    let action = config.action.unwrap_or(scenario.request.action);
    let ctx = scenario.context_for(action)?;

    let result = dispatcher.dispatch(&ctx);
    tracing::info!("Finished: {}", result.summary());

    match config.output {
        OutputFormat::Summary => println!("{}", result.summary()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report(&result))?),
    }
    Ok(())
}

/// Logs to stderr; `RUST_LOG` adds directives on top of the INFO default.
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(result: &ActionResult) -> serde_json::Value {
    json!({
        "action": result.action_type(),
        "stop_reason": result.stop_reason(),
        "search_limit": result.search_limit(),
        "count": result.total_count(),
        "targets": result.targets(),
        "durability_used": result.durability_used(),
        "hunger_used": result.hunger_used(),
        "yields": result.yields(),
        "experience": result.experience(),
    })
}
