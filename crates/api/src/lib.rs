//! Authenticated REST clients for the Strato platform resources.
//!
//! Every call carries the bearer access token obtained through
//! `strato-auth` and a `utm_source=cli` marker. Resource modules mirror the
//! platform's `/_api/` surface: projects, endpoints, packages, variables.

pub mod client;
pub mod endpoints;
pub mod packages;
pub mod projects;
pub mod variables;

pub use client::{ApiClient, ApiError};
pub use endpoints::{Endpoint, UpdateEndpointRequest};
pub use packages::ProjectPackage;
pub use projects::Project;
pub use variables::ProjectVariable;
