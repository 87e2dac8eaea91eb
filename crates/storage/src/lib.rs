#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;
pub mod seed;

pub use catalog::{LevelCatalog, LevelConfigRecord};
pub use repository::{QuestionBank, QuestionRepository, StorageError};
