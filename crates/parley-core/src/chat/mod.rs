//! Chat resolution and the message ingest pipeline.

pub mod resolver;
pub mod service;

pub use resolver::ChatResolver;
pub use service::ChatService;
