//! Basic usage example for the OpenKeyval client
//!
//! Run with: cargo run --example basic_usage
//!
//! The endpoint and timeout come from `OKV_*` environment variables
//! (e.g. `OKV_BASE_URL=http://localhost:8080`).

use openkeyval_client::{Serializable, Store, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, PartialEq)]
struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Serializable for Coordinates {
    type Repr = String;
    type Error = std::num::ParseFloatError;

    fn serialize(&self) -> String {
        format!("{};{}", self.lat, self.lon)
    }

    fn deserialize(repr: String) -> Result<Self, Self::Error> {
        let (lat, lon) = repr.split_once(';').unwrap_or((repr.as_str(), ""));
        Ok(Coordinates {
            lat: lat.parse()?,
            lon: lon.parse()?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,openkeyval_client=debug")),
        )
        .init();

    let config = StoreConfig::from_env();
    info!("Using endpoint {}", config.base_url);
    let store = Store::with_config(config)?;

    // Raw bytes
    info!("Storing key 'example_hello'...");
    store.set("example_hello", b"Hello, OpenKeyval!").await?;
    match store.get_str("example_hello").await? {
        Some(text) => info!("Retrieved: {}", text),
        None => info!("Key not found"),
    }

    // A domain type
    let office = Coordinates {
        lat: 52.3676,
        lon: 4.9041,
    };
    store.set_value("example_office", &office).await?;
    let read_back = store.get_as::<Coordinates>("example_office").await?;
    info!("Round trip equal: {}", read_back.as_ref() == Some(&office));

    // Keys are checked before anything is sent
    if let Err(e) = store.get("not/a/key").await {
        info!("Rejected locally: {}", e);
    }

    // Missing keys read as None
    let missing = store.get("example_never_written").await?;
    info!("Missing key value: {:?}", missing);

    Ok(())
}
