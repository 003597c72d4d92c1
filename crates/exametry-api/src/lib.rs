//! Exametry API Library
//!
//! HTTP gateway for the download packager: request parsing, response mapping,
//! the local file route, middleware and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use handlers::package::{DownloadPackageRequest, DownloadPackageResponse};
pub use state::AppState;
