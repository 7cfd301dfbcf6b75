//! Persistence gateway implementations.

mod http;
mod in_memory;

pub use http::HttpGateway;
pub use in_memory::InMemoryGateway;
