pub mod cache;
pub mod config;
pub mod effectiveness;
pub mod error;
pub mod evolution;
pub mod gql;
pub mod list_state;
pub mod pagination;
pub mod pokemon;
pub mod query;
pub mod routes;
pub mod views;

pub use config::Config;
pub use error::AppError;
pub use query::{CachedSource, GraphqlSource, PokedexSource};
pub use routes::{AppState, router};
