mod config;
mod memory;
mod types;

pub(crate) use config::GENERIC_CACHE_STORE;
