//! Live delivery: connection registry and message fan-out.

pub mod fanout;
pub mod registry;

pub use fanout::Fanout;
pub use registry::ConnectionRegistry;
