//! Raw ABI surface for the libcephfs snapshot entry points.
//!
//! Mirrors the C declarations (`struct snap_metadata`, `struct snap_info`,
//! the opaque mount handle) and resolves the four snapshot functions into a
//! [`LibCephFs`] table at runtime via `dlopen`, avoiding any link-time
//! dependency on the native library. Embedders that already hold the
//! function pointers (or want to substitute an in-process implementation)
//! can assemble a table directly with [`LibCephFs::from_parts`].
//!
//! Everything here is raw and `unsafe`; the safe API lives in the `rcephfs`
//! crate.

// Type names mirror the C declarations.
#![allow(non_camel_case_types)]

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::path::Path;

mod dl;

pub use dl::DynLib;

/// Opaque native mount handle. Only ever handled by pointer.
#[repr(C)]
pub struct ceph_mount_info {
    _opaque: [u8; 0],
}

/// One key/value metadata entry, as the native library lays it out.
///
/// Both pointers reference NUL-terminated strings owned by whichever side
/// allocated the containing array.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct snap_metadata {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Result structure filled in by `ceph_get_snap_info`.
///
/// When `nr_snap_metadata` is nonzero, `snap_metadata` points at a
/// native-owned array that must be handed back to
/// `ceph_free_snap_info_buffer` exactly once.
#[repr(C)]
#[derive(Debug)]
pub struct snap_info {
    pub id: u64,
    pub nr_snap_metadata: libc::size_t,
    pub snap_metadata: *mut snap_metadata,
}

impl snap_info {
    /// A zeroed result structure ready to pass to the query call.
    pub fn zeroed() -> Self {
        Self {
            id: 0,
            nr_snap_metadata: 0,
            snap_metadata: std::ptr::null_mut(),
        }
    }
}

/// `int ceph_mksnap(struct ceph_mount_info *, const char *path,
/// const char *name, mode_t mode, struct snap_metadata *, size_t nr)`
pub type CephMksnapFn = unsafe extern "C" fn(
    cmount: *mut ceph_mount_info,
    path: *const c_char,
    name: *const c_char,
    mode: libc::mode_t,
    metadata: *const snap_metadata,
    nr_metadata: libc::size_t,
) -> c_int;

/// `int ceph_rmsnap(struct ceph_mount_info *, const char *path,
/// const char *name)`
pub type CephRmsnapFn = unsafe extern "C" fn(
    cmount: *mut ceph_mount_info,
    path: *const c_char,
    name: *const c_char,
) -> c_int;

/// `int ceph_get_snap_info(struct ceph_mount_info *, const char *path,
/// struct snap_info *out)`
pub type CephGetSnapInfoFn = unsafe extern "C" fn(
    cmount: *mut ceph_mount_info,
    path: *const c_char,
    out: *mut snap_info,
) -> c_int;

/// `void ceph_free_snap_info_buffer(struct snap_info *)`
pub type CephFreeSnapInfoBufferFn = unsafe extern "C" fn(info: *mut snap_info);

/// Helper macro to resolve a symbol and transmute it to its fn signature.
macro_rules! load_sym {
    ($lib:expr, $name:literal, $ty:ty) => {{
        let cname = concat!($name, "\0");
        // SAFETY: string literal with a single trailing NUL.
        let cstr = unsafe { CStr::from_bytes_with_nul_unchecked(cname.as_bytes()) };
        let ptr = unsafe { $lib.sym(cstr) }
            .map_err(|e| format!("failed to resolve {}: {}", $name, e))?;
        if ptr.is_null() {
            return Err(format!("{} resolved to null", $name));
        }
        // SAFETY: libcephfs exports this symbol with exactly this signature.
        unsafe { std::mem::transmute::<*mut c_void, $ty>(ptr) }
    }};
}

/// Resolved snapshot entry points of the native client library.
///
/// Holds the loaded library (when one was opened) so the function pointers
/// stay valid for the table's lifetime.
#[derive(Debug)]
pub struct LibCephFs {
    _lib: Option<DynLib>,
    pub ceph_mksnap: CephMksnapFn,
    pub ceph_rmsnap: CephRmsnapFn,
    pub ceph_get_snap_info: CephGetSnapInfoFn,
    pub ceph_free_snap_info_buffer: CephFreeSnapInfoBufferFn,
}

impl LibCephFs {
    /// Load the native library under its default soname and resolve all
    /// four snapshot symbols eagerly.
    pub fn load() -> Result<Self, String> {
        let names: &[&str] = if cfg!(target_os = "macos") {
            &["libcephfs.dylib"]
        } else {
            &["libcephfs.so.2", "libcephfs.so"]
        };

        let mut last_err = String::from("no candidate sonames");
        for name in names {
            let cname = CString::new(*name).map_err(|e| e.to_string())?;
            match DynLib::open(&cname) {
                Ok(lib) => return Self::from_lib(lib),
                Err(e) => last_err = e,
            }
        }
        Err(format!("unable to load libcephfs: {last_err}"))
    }

    /// Load the library from an explicit path instead of the default
    /// soname search.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        use std::os::unix::ffi::OsStrExt;

        let cname = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| format!("library path contains NUL: {}", path.display()))?;
        let lib = DynLib::open(&cname)?;
        Self::from_lib(lib)
    }

    /// Assemble a table from caller-supplied function pointers.
    ///
    /// Intended for embedders that resolve the symbols themselves and for
    /// test suites substituting an in-process implementation.
    pub fn from_parts(
        mksnap: CephMksnapFn,
        rmsnap: CephRmsnapFn,
        get_snap_info: CephGetSnapInfoFn,
        free_snap_info_buffer: CephFreeSnapInfoBufferFn,
    ) -> Self {
        Self {
            _lib: None,
            ceph_mksnap: mksnap,
            ceph_rmsnap: rmsnap,
            ceph_get_snap_info: get_snap_info,
            ceph_free_snap_info_buffer: free_snap_info_buffer,
        }
    }

    fn from_lib(lib: DynLib) -> Result<Self, String> {
        let ceph_mksnap = load_sym!(lib, "ceph_mksnap", CephMksnapFn);
        let ceph_rmsnap = load_sym!(lib, "ceph_rmsnap", CephRmsnapFn);
        let ceph_get_snap_info = load_sym!(lib, "ceph_get_snap_info", CephGetSnapInfoFn);
        let ceph_free_snap_info_buffer =
            load_sym!(lib, "ceph_free_snap_info_buffer", CephFreeSnapInfoBufferFn);

        Ok(Self {
            _lib: Some(lib),
            ceph_mksnap,
            ceph_rmsnap,
            ceph_get_snap_info,
            ceph_free_snap_info_buffer,
        })
    }
}

// SAFETY: the table is immutable after construction and libcephfs documents
// its API as safe for concurrent use; the loaded library handle is
// process-global.
unsafe impl Send for LibCephFs {}
unsafe impl Sync for LibCephFs {}
