pub mod app;
pub mod assignment_store;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod date;
pub mod panel;
pub mod task;
pub mod ui;
