//! Mount handle wrapper.
//!
//! A [`Mount`] pairs a resolved native function table with a raw mount
//! pointer established elsewhere. This layer never connects, authenticates,
//! or releases the native mount; it only validates the handle locally
//! before each operation. The [`load_library`] helpers resolve the function
//! table itself, surfacing load failures through the crate error type.

use std::path::Path;
use std::sync::Arc;

use rcephfs_sys as sys;

use crate::error::{CephError, Result};

/// Resolve the native library under its default soname and share the
/// resulting function table.
pub fn load_library() -> Result<Arc<sys::LibCephFs>> {
    sys::LibCephFs::load()
        .map(Arc::new)
        .map_err(CephError::Library)
}

/// Resolve the native library from an explicit path instead of the default
/// soname search.
pub fn load_library_from(path: &Path) -> Result<Arc<sys::LibCephFs>> {
    sys::LibCephFs::load_from(path)
        .map(Arc::new)
        .map_err(CephError::Library)
}

/// Handle to an established native mount.
///
/// Obtained by adopting an externally created `ceph_mount_info` pointer via
/// [`Mount::from_raw`]. Dropping a `Mount` does not touch the native handle.
pub struct Mount {
    pub(crate) api: Arc<sys::LibCephFs>,
    pub(crate) mount: *mut sys::ceph_mount_info,
}

// SAFETY: libcephfs documents its operations as safe for concurrent use on
// one mount, and this layer keeps no cross-call mutable state of its own.
unsafe impl Send for Mount {}
unsafe impl Sync for Mount {}

impl Mount {
    /// Adopt an externally established native mount handle.
    ///
    /// # Safety
    ///
    /// If `mount` is non-null it must point at a live, connected
    /// `ceph_mount_info` obtained from the same library `api` was resolved
    /// from, and must remain valid for the lifetime of the returned value.
    /// A null pointer is accepted and makes every operation fail with
    /// [`CephError::NotConnected`].
    pub unsafe fn from_raw(api: Arc<sys::LibCephFs>, mount: *mut sys::ceph_mount_info) -> Self {
        Mount { api, mount }
    }

    /// Whether the handle passes local validation.
    pub fn is_connected(&self) -> bool {
        !self.mount.is_null()
    }

    /// Precondition check run before every native call.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.mount.is_null() {
            return Err(CephError::NotConnected);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::{c_char, c_int};

    unsafe extern "C" fn stub_mksnap(
        _cmount: *mut sys::ceph_mount_info,
        _path: *const c_char,
        _name: *const c_char,
        _mode: libc::mode_t,
        _metadata: *const sys::snap_metadata,
        _nr: libc::size_t,
    ) -> c_int {
        0
    }

    unsafe extern "C" fn stub_rmsnap(
        _cmount: *mut sys::ceph_mount_info,
        _path: *const c_char,
        _name: *const c_char,
    ) -> c_int {
        0
    }

    unsafe extern "C" fn stub_get_snap_info(
        _cmount: *mut sys::ceph_mount_info,
        _path: *const c_char,
        _out: *mut sys::snap_info,
    ) -> c_int {
        0
    }

    unsafe extern "C" fn stub_free(_info: *mut sys::snap_info) {}

    fn stub_api() -> Arc<sys::LibCephFs> {
        Arc::new(sys::LibCephFs::from_parts(
            stub_mksnap,
            stub_rmsnap,
            stub_get_snap_info,
            stub_free,
        ))
    }

    #[test]
    fn test_null_handle_is_not_connected() {
        let mount = unsafe { Mount::from_raw(stub_api(), std::ptr::null_mut()) };
        assert!(!mount.is_connected());
        assert!(matches!(mount.validate(), Err(CephError::NotConnected)));
    }

    #[test]
    fn test_load_library_from_missing_path_is_library_error() {
        let err = load_library_from(Path::new("/no/such/libcephfs_missing.so")).unwrap_err();
        assert!(matches!(err, CephError::Library(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_non_null_handle_validates() {
        // The stub table never dereferences the mount pointer.
        let raw = 0x1 as *mut sys::ceph_mount_info;
        let mount = unsafe { Mount::from_raw(stub_api(), raw) };
        assert!(mount.is_connected());
        assert!(mount.validate().is_ok());
    }
}
