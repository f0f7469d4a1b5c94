pub mod app_config;
pub mod file_store;
pub mod memory_store;
pub mod mirror;

pub use app_config::Config;
pub use file_store::FileStorage;
pub use memory_store::MemoryStorage;
pub use mirror::PersistentMirror;
