// src/core/mod.rs — Query execution

pub mod executor;
pub mod result;
pub mod token_budget;

pub use executor::{query_local, QueryExecutor, QueryRequest};
pub use result::{ModelPosteriors, QueryResult};
