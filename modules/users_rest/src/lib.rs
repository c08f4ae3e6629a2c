//! REST backend for the user directory: a thin CRUD layer over a single
//! SQLite `users` table, plus the two aggregate endpoints (7-day window and
//! mean age) the client store consumes.

pub mod api;
pub mod domain;
pub mod infra;

pub use api::rest::routes::router;
pub use domain::service::Service;
pub use infra::storage::repo::UsersRepository;
