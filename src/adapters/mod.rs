// Adapters layer: concrete implementations of the domain ports (HTTP backends, storage).

pub mod http;
pub mod storage;
