mod cities;
mod weather;

pub use cities::*;
pub use weather::*;
