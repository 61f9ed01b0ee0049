pub mod attribute_selection;
pub mod dataset;
pub mod date_range;
pub mod frequency;
pub mod utils;
pub mod weather_record;
