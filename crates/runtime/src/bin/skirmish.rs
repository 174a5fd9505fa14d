//! Runs the bundled skirmish scenario with both teams on autopilot.
//!
//! Usage: `skirmish [DATA_DIR] [SCENARIO]`
use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::broadcast::error::RecvError;
use combat_content::ContentFactory;
use runtime::{Event, GridMap, NearestEnemyProvider, OracleManager, Runtime, Topic};

const MAX_TURNS: u32 = 500;

const LAYOUT: [&str; 7] = [
    ".........",
    "....#....",
    "..+...+..",
    "....#....",
    ".........",
    "...+.#...",
    ".........",
];

#[tokio::main]
async fn main() -> Result<()> {
    runtime::init_tracing()?;

    let mut args = std::env::args().skip(1);
    let data_dir = args.next().map(PathBuf::from).unwrap_or_else(|| {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../combat/content/data"))
    });
    let scenario_name = args.next().unwrap_or_else(|| "skirmish".to_owned());

    let factory = ContentFactory::new(data_dir);
    let config = factory.load_config()?;
    let catalog = factory.load_catalog()?;
    let archetypes = factory.load_archetypes()?;
    let scenario = factory.load_scenario(&scenario_name, &catalog, &archetypes)?;

    let oracles = OracleManager::new(GridMap::from_rows(&LAYOUT)?, catalog);
    let mut runtime = Runtime::builder()
        .scenario(config, scenario)
        .oracles(oracles.clone())
        .default_provider(NearestEnemyProvider::new(oracles))
        .build()
        .await?;

    let mut combat = runtime.subscribe(Topic::Combat);
    let printer = tokio::spawn(async move {
        loop {
            match combat.recv().await {
                Ok(Event::Combat(event)) => println!("{event:?}"),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event printer fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = runtime.run_until_finished(MAX_TURNS).await?;
    println!("outcome: {outcome:?}");

    runtime.shutdown().await?;
    printer.await?;
    Ok(())
}
