//! Prints every weather attribute WorldWeatherOnline returns for a past-weather request.
//!
//! Needs `WWO_API_KEY` in the environment.

use wwo_hist::{WwoError, WwoHist};

#[tokio::main]
async fn main() -> Result<(), WwoError> {
    env_logger::init();
    let client = WwoHist::from_env()?;

    let attributes = client.list_attributes().verbose(true).call().await?;
    println!("{} attributes in total", attributes.len());

    Ok(())
}
