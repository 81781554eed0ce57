pub mod app;
pub mod config;
pub mod models;
pub mod services;
mod text;
