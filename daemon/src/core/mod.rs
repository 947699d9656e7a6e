pub mod entropy;
pub mod error;
pub mod events;
pub mod manager;
pub mod scheduler;
pub mod storage;
