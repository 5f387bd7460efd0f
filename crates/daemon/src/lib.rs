mod db;
mod domains;
mod error;
mod models;
mod pipeline;
mod scheduler;
mod utils;

pub use db::*;
pub use domains::*;
pub use error::*;
pub use models::*;
pub use pipeline::*;
pub use scheduler::*;
pub use utils::*;
