// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pyfarm-core: data model, ids, clock, settings and the shared error
//! taxonomy for the render-farm master scheduler.

pub mod macros;
pub mod id;

pub mod agent;
pub mod clock;
pub mod error;
pub mod job;
pub mod jobqueue;
pub mod jobtype;
pub mod settings;
pub mod software;
pub mod task;
pub mod tasklog;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::CoreError;
