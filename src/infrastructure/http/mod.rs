//! HTTP Layer - RESTful API + WebSocket
//!
//! JSON 信封 `{errno, error, data}`；会话事件通过 `/ws/session/{id}` 推送

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::{AppState, Collaborators};
