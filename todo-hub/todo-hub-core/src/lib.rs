pub mod error;
pub mod model;
pub mod repository;
pub mod storage;

pub use error::{Result, StoreError};
pub use repository::{ListRoute, Loaded, Repository};
