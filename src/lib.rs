pub mod analytics;
pub mod app;
pub mod charts;
pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod console;
pub mod controller;
pub mod forms;
pub mod markdown;
pub mod model;
pub mod output;
pub mod state;
pub mod store;
pub mod view;

#[cfg(test)]
mod tests;
