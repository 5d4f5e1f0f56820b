//! Refresh-session storage.

mod memory;
mod refresh_token;

pub use memory::MemorySessionStore;
pub use refresh_token::RedisSessionStore;
