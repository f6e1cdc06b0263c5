pub mod app;
pub mod config;
pub mod coordinator;
pub mod data;
pub mod engine;
pub mod events;
pub mod panel;
pub mod sys;
