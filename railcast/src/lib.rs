pub mod app;
pub mod io;
pub mod pipeline;
pub mod synthetic;

mod error;

pub use error::RailcastError;
