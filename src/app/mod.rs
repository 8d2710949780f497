pub mod api;
pub mod config;
pub mod favorites;
pub mod notice;
pub mod session;
pub mod storage;
