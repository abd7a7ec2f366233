//! Validated creation and listing of user records against a users API.
//!
//! [`controllers::SubmissionController`] turns form input into a validated
//! multipart create request and folds the outcome back into field errors.
//! [`controllers::ListingController`] keeps the latest user listing and
//! refetches whenever a [`signal::RefreshSignal`] reports a change. The
//! [`app`] module serves an in-memory users API with the same contract.

pub mod app;
pub mod config;
pub mod controllers;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod routes;
pub mod schemas;
pub mod services;
pub mod signal;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_helpers;
pub mod utils;

pub use app::create_app;
