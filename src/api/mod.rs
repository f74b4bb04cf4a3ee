//! HTTP API layer: router, handlers, error mapping, and the shared state.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use routes::build_router;
pub use server::start_api_server;
pub use state::AppState;
