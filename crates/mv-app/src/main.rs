//! Main application entry point
//!
//! Usage: `multiview [CSV_PATH] [FRAGMENT]`. Without a path a small inline
//! dataset is used.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::{error, info};

use mv_app::{Coordinator, CoordinatorOptions};
use mv_core::{DatasetModel, Element, Settings};
use mv_data::{MemoryDataset, Record};

fn sample_records() -> Vec<Record> {
    [
        json!({"date": "2024-01-01", "city": "Paris", "temperature": 4.5, "lat": 48.86, "lon": 2.35}),
        json!({"date": "2024-01-01", "city": "Berlin", "temperature": -1.0, "lat": 52.52, "lon": 13.40}),
        json!({"date": "2024-01-02", "city": "Paris", "temperature": 6.1, "lat": 48.86, "lon": 2.35}),
        json!({"date": "2024-01-02", "city": "Berlin", "temperature": 0.5, "lat": 52.52, "lon": 13.40}),
    ]
    .into_iter()
    .filter_map(|record| record.as_object().cloned())
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let fragment = args.next();

    let settings = Settings::default().with_env_overrides()?;
    let model: Arc<dyn DatasetModel> = match path {
        Some(path) => {
            info!("Loading {}", path);
            MemoryDataset::from_csv(path)
        }
        None => MemoryDataset::new(sample_records()),
    };

    let mut options = CoordinatorOptions::new()
        .model(model)
        .element(Element::new("multiview"))
        .settings(settings);
    if let Some(fragment) = fragment {
        options = options.fragment(fragment);
    }

    let coordinator = Coordinator::new(options)?;
    if let Err(e) = coordinator.load().await {
        error!("Load failed: {}", e);
    }

    println!("{}", serde_json::to_string_pretty(&coordinator.to_json())?);
    for item in coordinator.navigation().nav_items() {
        let marker = if item.active { "*" } else { " " };
        println!("{} {}", marker, item.label);
    }
    if let Some(count) = coordinator.shell().doc_count_text() {
        println!("Records: {}", count);
    }
    for notification in coordinator.notifications().displayed() {
        println!("[{}] {}", notification.category.as_str(), notification.message);
    }
    println!("#{}", coordinator.to_fragment());

    Ok(())
}
