pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod geo;
pub mod location;
pub mod logging;
pub mod models;
pub mod tracker;
pub mod ui;
