//! `modbot-queue` — where routed payloads go.
//!
//! Every destination implements [`modbot_core::Queuer`]. Which one a route
//! uses is decided by its `destination` config block.

pub mod bus;
pub mod factory;
pub mod http;
pub mod log;
pub mod memory;

pub use bus::QueueBus;
pub use factory::build_destination;
pub use http::HttpQueue;
pub use log::LogQueue;
pub use memory::MemoryQueue;
