pub mod backup_codec;
pub mod keyring_api;
pub mod keyring_repository;
pub mod keyring_store;
pub mod sync_codec;
pub mod trust_override;
pub mod unlock_queue;
