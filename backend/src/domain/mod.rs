//! # Domain Module
//!
//! Business rules for habit tracking, independent of HTTP and storage.
//!
//! - **calendar**: calendar-day normalization, month arithmetic and the [`calendar::Clock`]
//! - **streak**: current/longest streak calculation over a set of marked days
//! - **period**: read-time progress through a defined period
//! - **mark_validator**: eligibility rules for marking today
//! - **models**: the tracker aggregate
//! - **commands**: command, query and result types used by services
//! - **tracker_service**: orchestration of the above against a [`crate::storage::TrackerStorage`]
//!
//! Every service operation takes the owner identifier explicitly; nothing here
//! reads identity from ambient state.

pub mod calendar;
pub mod commands;
pub mod mark_validator;
pub mod models;
pub mod period;
pub mod streak;
pub mod tracker_service;

pub use tracker_service::{TrackerError, TrackerService};
