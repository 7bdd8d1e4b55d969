//! Request middleware applied to the `/api/*` routes.

pub mod request_metrics;

pub use request_metrics::track_request;
