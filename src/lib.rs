// Paylocifier - client library for the Paylocity APIs

pub mod auth;
pub mod config;
pub mod connection;
pub mod encryption;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod models;
pub mod multipart;
pub mod response;
pub mod routing;

pub use crate::config::{config, configure, Config};
pub use crate::error::{PaylocityError, Result};
pub use crate::http_client::{PaylocityClient, PayrollConnection};
pub use crate::response::ApiResponse;
pub use crate::routing::{RouteTable, Target};
