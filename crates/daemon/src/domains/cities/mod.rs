mod fetch_cities;

pub use fetch_cities::*;
