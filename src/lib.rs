// Library exports for devthoughts
// The CLI binary and the integration tests both build on these modules

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod models;
pub mod screens;
pub mod session;
pub mod validation;
pub mod view;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};
pub use session::SessionStore;
