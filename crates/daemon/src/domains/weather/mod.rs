mod fetch_weather;
mod transform;

pub use fetch_weather::*;
pub use transform::*;
