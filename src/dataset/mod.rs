pub mod generator;
pub mod writer;

pub use generator::{DatasetGenerator, DatasetRow};
pub use writer::{save_dataset, write_rows};
