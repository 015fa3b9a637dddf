#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! Device and distributed-role metadata records for profiling traces.
//!
//! Discovery code hands this crate the device properties and the
//! distributed role it has already obtained; the crate assembles them into
//! an immutable [`MetadataRecord`], validates its shape, and exports it as
//! a stable JSON mapping for a trace emitter. It owns no discovery, no
//! refresh loop, and no transport.

extern crate alloc;

#[macro_use]
extern crate derive_new;

mod device;
mod distributed;
mod record;

/// JSON export and import of metadata records.
pub mod export;

pub use device::DeviceDescriptor;
pub use distributed::DistributedRole;
pub use export::MetadataError;
pub use record::{MetadataBuilder, MetadataRecord, ValidationError};
