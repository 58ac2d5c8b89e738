pub mod auth;
pub mod config;
pub mod forms;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;
pub mod utils;
