pub mod audit;
pub mod kv_stores;
