#![doc = "The `boardforge` library crate."]
#![doc = ""]
#![doc = "A multi-tenant Kanban backend: users share boards, boards hold tasks, tasks carry"]
#![doc = "comments. The crate contains the authorization policy, the board membership rules,"]
#![doc = "the service operations built on them, the storage adapters, and the HTTP surface."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod membership;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod store;

pub use crate::error::{AppError, AppResult};
pub use crate::store::{InMemoryStore, PgStore, SharedStore, Store};
