//! This crate is shared by `linktapd` and the drivers it runs.
//!
//! It defines the contract between the host and a device driver: the
//! error type everyone maps their failures into, the typed values that
//! flow across the boundary, and the two capability traits a driver
//! depends on instead of a host base class. A driver pushes property
//! updates through a `driver::PropertySink` and pulls host commands
//! from a `driver::CommandSource`.

mod types;

// Pull types down to the `linktap-api` namespace.

pub use types::value::{TimeUnit, Value};
pub use types::Error;

/// A specialization of `std::result::Result<>` where the error value
/// is `types::Error`.

pub type Result<T> = std::result::Result<T, Error>;

pub mod driver;
