//! Minimal dynamic library loading over `libc`'s `dlopen` family.
//!
//! Provides [`DynLib`] for loading a shared object and resolving symbols at
//! runtime. Used by [`crate::LibCephFs`] to load `libcephfs` without a
//! link-time dependency on it being installed.

use std::ffi::CStr;
use std::os::raw::c_void;

/// Handle to a dynamically loaded shared library.
#[derive(Debug)]
pub struct DynLib {
    handle: *mut c_void,
}

// SAFETY: The library handle is a process-global resource; sharing across
// threads is safe as long as callers ensure the resolved symbols themselves
// are thread-safe (which libcephfs guarantees for mount operations).
unsafe impl Send for DynLib {}
unsafe impl Sync for DynLib {}

impl DynLib {
    /// Open a shared library by name or path.
    ///
    /// Wraps `dlopen` with `RTLD_NOW | RTLD_LOCAL`: all symbols resolve
    /// immediately and stay private to this handle.
    pub fn open(name: &CStr) -> Result<Self, String> {
        // SAFETY: name is a valid NUL-terminated C string.
        let handle = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
        if handle.is_null() {
            return Err(last_dl_error().unwrap_or_else(|| "unknown dlopen error".to_string()));
        }
        Ok(Self { handle })
    }

    /// Look up a symbol by name, returning a raw pointer.
    ///
    /// # Safety
    ///
    /// The caller must cast the returned pointer to the correct function
    /// signature before use.
    pub unsafe fn sym(&self, name: &CStr) -> Result<*mut c_void, String> {
        // Clear any stale error so a null return can be told apart from a
        // symbol that genuinely resolves to null.
        libc::dlerror();
        let ptr = libc::dlsym(self.handle, name.as_ptr());
        if let Some(msg) = last_dl_error() {
            return Err(msg);
        }
        Ok(ptr)
    }
}

impl Drop for DynLib {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // SAFETY: handle came from a successful dlopen and is closed once.
            unsafe {
                libc::dlclose(self.handle);
            }
        }
    }
}

fn last_dl_error() -> Option<String> {
    // SAFETY: dlerror returns either null or a pointer to a static,
    // NUL-terminated message owned by the loader.
    let err = unsafe { libc::dlerror() };
    if err.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(err) }.to_string_lossy().into_owned())
    }
}
