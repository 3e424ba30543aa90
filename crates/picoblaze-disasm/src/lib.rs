pub mod model;

pub use model::{load_hex, Image};
