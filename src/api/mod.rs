mod error;
pub mod models;
mod server;
pub mod services;
pub mod state;

pub use error::{ApiError, NewznabError};
pub use server::{router, run};
pub use state::AppState;
