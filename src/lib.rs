#![doc = "The `postboard` library crate."]
#![doc = ""]
#![doc = "Domain models, payload validation, token authentication, persistence and"]
#![doc = "routing for the postboard blog backend. The binary (`main.rs`) wires them"]
#![doc = "into an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod serializers;
pub mod store;

pub use error::AppError;
pub use store::Store;
