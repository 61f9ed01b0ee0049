//! Retrieves two days of three-hourly temperature and humidity for London, exports them to
//! CSV and prints the warmest afternoon slots.
//!
//! Needs `WWO_API_KEY` in the environment.

use chrono::NaiveDate;
use polars::prelude::*;
use std::env;
use std::path::Path;
use wwo_hist::{WwoError, WwoHist};

#[tokio::main]
async fn main() -> Result<(), WwoError> {
    env_logger::init();
    configure_polars_display();
    let client = WwoHist::from_env()?;

    let dataset = client
        .by_attributes()
        .attributes(&["tempC", "humidity"])
        .city("London")
        .start_date("2020-01-01")
        .end_date("2020-01-02")
        .frequency(3)
        .csv_directory(Path::new("wwo_export"))
        .call()
        .await?;

    println!("{}", dataset.frame());

    let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let afternoon = dataset
        .get_range(
            day.and_hms_opt(12, 0, 0).unwrap(),
            day.and_hms_opt(18, 0, 0).unwrap(),
        )
        .sort(["tempC"], SortMultipleOptions::default().with_order_descending(true))
        .collect()?;
    println!("Afternoon of {day}, warmest first:\n{afternoon}");

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
