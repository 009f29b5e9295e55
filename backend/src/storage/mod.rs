//! # Storage Module
//!
//! Handles all data persistence for the habit tracker.
//!
//! The domain layer only sees the [`TrackerStorage`] trait; the SQLite
//! implementation on top of `sqlx` lives in [`connection`] (pool and schema
//! bootstrap) and [`tracker_repository`] (queries).

pub mod connection;
pub mod tracker_repository;
pub mod traits;

pub use connection::DbConnection;
pub use tracker_repository::TrackerRepository;
pub use traits::TrackerStorage;
