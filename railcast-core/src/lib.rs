pub mod capacity;
pub mod feature;
pub mod forecast;
pub mod model;
pub mod optimize;
