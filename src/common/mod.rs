pub mod auth;
pub mod errors;
pub mod guard;
pub mod models;
pub mod session;
pub mod state;
pub mod views;
