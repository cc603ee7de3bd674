//! Settlement lifecycle: model, status machine, validation, storage and the
//! engine that ties them together.

pub mod engine;
pub mod error;
pub mod guard;
pub mod model;
pub mod notify;
pub mod status;
pub mod store;
pub mod summary;
