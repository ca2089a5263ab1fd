//! Command line caller for the dust map lookup engine.
//!
//! The binary loads the map once at startup, then answers queries given as
//! flags or as JSON bodies and prints JSON results.

pub mod request;
pub mod response;

pub use request::{ParsedRequest, QueryBody, RequestError, RequestLimits, Values};
pub use response::{render_error, render_result};
