#![doc = "The `taskguard` library crate."]
#![doc = ""]
#![doc = "A multi-tenant task API: users own tasks, admins see and manage everything."]
#![doc = "This crate holds the domain models, the authorization policy, the storage"]
#![doc = "backends, the HTTP routes and the error type. `main.rs` wires them into a server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
