pub mod audit;
pub mod kv_store;
pub mod openpgp;
pub mod passphrase;
