pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod export;
pub mod models;
pub mod private;
pub mod stats;
pub mod storage;
pub mod task_manager;
pub mod templates;
pub mod view;
