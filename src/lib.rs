pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod forms;
pub mod models;
pub mod render;
pub mod resource;
pub mod routes;
pub mod store;

pub use routes::{router, AppState};
