#![warn(missing_docs)]

//! Safe snapshot bindings for the libcephfs client library.
//!
//! The distributed filesystem itself — replication, metadata coordination,
//! snapshot copy-on-write — lives in the native library; this crate only
//! marshals arguments across the C boundary, manages native buffer
//! lifetimes, and translates status codes into [`CephError`].
//!
//! A [`Mount`] adopts an externally established native mount handle
//! together with a resolved [`sys::LibCephFs`] function table and exposes
//! three operations: [`Mount::make_snap`], [`Mount::remove_snap`], and
//! [`Mount::snap_info`].

pub mod error;
mod meta;
pub mod mount;
pub mod snapshot;

/// Raw ABI surface, re-exported for embedders that resolve or supply the
/// native entry points themselves.
pub use rcephfs_sys as sys;

pub use error::{CephError, Result};
pub use mount::{load_library, load_library_from, Mount};
pub use snapshot::SnapshotInfo;
