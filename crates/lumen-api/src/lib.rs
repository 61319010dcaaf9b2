pub mod auth;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod password;
pub mod routes;
pub mod state;

pub use state::{AppState, AppStateInner};
