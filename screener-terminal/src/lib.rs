pub mod app;
pub mod cli;
pub mod config;
pub mod network;
pub mod theme;
pub mod ui;
