//! Snapshot operations: create, remove, and query.
//!
//! Each operation validates the mount handle, marshals its arguments into
//! native buffers scoped to the call, issues one blocking native call, and
//! translates the return code. Nothing is retried and no state is kept
//! across calls.

use std::collections::HashMap;
use std::ffi::CStr;

use tracing::debug;

use rcephfs_sys as sys;

use crate::error::{check, Result};
use crate::meta::{cstring, SnapMetaArray};
use crate::mount::Mount;

/// Point-in-time result of a snapshot query: the numeric snapshot id and a
/// copy of its attached metadata, detached from all native memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Snapshot identifier assigned by the cluster.
    pub id: u64,
    /// Key/value metadata attached at creation time; unordered.
    pub metadata: HashMap<String, String>,
}

impl Mount {
    /// Create a snapshot of the directory at `path`, named `name`, with the
    /// given permission mode and optional key/value metadata.
    ///
    /// An empty `metadata` map passes a null array and zero count to the
    /// native call; a non-empty map is marshaled into a contiguous array of
    /// key/value pairs released when the call returns. Uniqueness of the
    /// (path, name) identity is enforced by the cluster.
    pub fn make_snap(
        &self,
        path: &str,
        name: &str,
        mode: u32,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        self.validate()?;
        let c_path = cstring(path)?;
        let c_name = cstring(name)?;

        if metadata.is_empty() {
            // SAFETY: the handle is validated, both strings are live
            // NUL-terminated buffers, and the null/0 pair is the native
            // calling convention for "no metadata".
            let ret = unsafe {
                (self.api.ceph_mksnap)(
                    self.mount,
                    c_path.as_ptr(),
                    c_name.as_ptr(),
                    mode as libc::mode_t,
                    std::ptr::null(),
                    0,
                )
            };
            return check(ret);
        }

        let meta = SnapMetaArray::new(metadata)?;
        debug!(path, name, mode, metadata = ?metadata, "mksnap");
        // SAFETY: `meta` owns every key/value buffer and outlives the call;
        // the pointer/count pair describes exactly meta.len() entries.
        let ret = unsafe {
            (self.api.ceph_mksnap)(
                self.mount,
                c_path.as_ptr(),
                c_name.as_ptr(),
                mode as libc::mode_t,
                meta.as_ptr(),
                meta.len() as libc::size_t,
            )
        };
        check(ret)
    }

    /// Remove the snapshot named `name` of the directory at `path`.
    ///
    /// Native failures (snapshot not found, permission denied, stale
    /// handle) surface verbatim as [`crate::CephError::Errno`].
    pub fn remove_snap(&self, path: &str, name: &str) -> Result<()> {
        self.validate()?;
        let c_path = cstring(path)?;
        let c_name = cstring(name)?;

        // SAFETY: handle validated; both strings live for the call.
        let ret = unsafe {
            (self.api.ceph_rmsnap)(self.mount, c_path.as_ptr(), c_name.as_ptr())
        };
        check(ret)
    }

    /// Fetch the id and metadata of the snapshot at `path`.
    pub fn snap_info(&self, path: &str) -> Result<SnapshotInfo> {
        self.validate()?;
        let c_path = cstring(path)?;

        let mut raw = sys::snap_info::zeroed();
        // SAFETY: handle validated; `raw` is a zeroed out-parameter the
        // native call fills in.
        let ret = unsafe {
            (self.api.ceph_get_snap_info)(self.mount, c_path.as_ptr(), &mut raw)
        };
        check(ret)?;

        let id = raw.id;
        let mut metadata = HashMap::new();
        if raw.nr_snap_metadata > 0 && !raw.snap_metadata.is_null() {
            let buffer = InfoBuffer {
                api: self.api.as_ref(),
                raw: &mut raw,
            };
            for entry in buffer.entries() {
                // SAFETY: each pointer references a NUL-terminated string
                // owned by the native buffer, live until the guard drops.
                let key = unsafe { CStr::from_ptr(entry.key) }
                    .to_string_lossy()
                    .into_owned();
                let value = unsafe { CStr::from_ptr(entry.value) }
                    .to_string_lossy()
                    .into_owned();
                // Last write wins if the native layer ever repeats a key.
                metadata.insert(key, value);
            }
        }

        Ok(SnapshotInfo { id, metadata })
    }
}

/// Bounds-respecting view over the native-owned metadata array of a query
/// result. Releases the buffer through the native free routine exactly once
/// when dropped; only constructed for results that reported entries.
struct InfoBuffer<'a> {
    api: &'a sys::LibCephFs,
    raw: &'a mut sys::snap_info,
}

impl InfoBuffer<'_> {
    fn entries(&self) -> &[sys::snap_metadata] {
        // SAFETY: the native call reported nr_snap_metadata entries at this
        // non-null pointer; the slice does not outlive self.
        unsafe { std::slice::from_raw_parts(self.raw.snap_metadata, self.raw.nr_snap_metadata) }
    }
}

impl Drop for InfoBuffer<'_> {
    fn drop(&mut self) {
        // SAFETY: `raw` is the structure the native call populated and the
        // guard is the only point of release.
        unsafe { (self.api.ceph_free_snap_info_buffer)(self.raw) }
    }
}
