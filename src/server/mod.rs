pub mod handler;

pub use handler::{router, serve, status_for, DebugRequest, DebugResponse, ErrorResponse};
