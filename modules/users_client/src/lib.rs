//! Client-side data layer for the user directory.
//!
//! The crate is built around [`store::UserStore`], an in-memory mirror of the
//! remote user collection with a fetch cache window, optimistic updates with
//! rollback, and a shared loading/error pair. [`api::HttpUsersApi`] is the
//! reqwest adapter behind it, and [`validation`] holds the pure CPF and form
//! helpers used by forms before they call store actions.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod validation;

pub use api::{HttpUsersApi, UsersApi};
pub use config::ClientConfig;
pub use error::ClientError;
pub use model::{AverageAgeResponse, NewUsersResponse, User, UserPatch, UserPayload};
pub use store::UserStore;
