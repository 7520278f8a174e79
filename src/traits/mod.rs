pub mod backend;
pub mod model_reader;

pub use backend::{Backend, Capabilities, Capability};
pub use model_reader::ModelReader;
