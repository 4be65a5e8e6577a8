pub mod app;
pub mod config;
pub mod error;
pub mod present;
pub mod render;
pub mod tmdb;
pub mod view;
