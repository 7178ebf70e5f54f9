pub mod api;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod services;
pub mod state;
