mod config;
mod hosted;
mod memory;
mod types;

pub(crate) use config::GENERIC_OBJECT_STORE;
pub(crate) use types::ObjectStore;
pub use memory::MEMORY_OBJECT_PATH;
