//! shelf-axum: Axum routes for shelf.
//!
//! Exposes upload, listing, range streaming, download and delete over HTTP
//! on top of a [`shelf_blob::BlobAdapter`].

pub mod app;
mod error;
pub mod multipart;
pub mod rest;
pub mod state;

pub use error::ApiError;
pub use state::ShelfState;

pub use app::{shelf, ShelfApp};
