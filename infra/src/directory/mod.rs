//! User directory adapters

pub mod memory;
#[cfg(feature = "mysql")]
pub mod mysql;

pub use memory::InMemoryUserDirectory;
#[cfg(feature = "mysql")]
pub use self::mysql::MySqlUserDirectory;
