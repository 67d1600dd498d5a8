//! Metadata marshaling for the create-snapshot call.
//!
//! The native call takes a contiguous array of `snap_metadata` pairs whose
//! key and value pointers must stay valid until the call returns.
//! [`SnapMetaArray`] owns every buffer behind one guard value so release is
//! a property of ownership: dropping the guard frees each buffer exactly
//! once, on every exit path.

use std::collections::HashMap;
use std::ffi::CString;

use rcephfs_sys as sys;

use crate::error::{CephError, Result};

/// Convert a host string into a NUL-terminated native buffer, rejecting
/// interior NULs before anything crosses the boundary.
pub(crate) fn cstring(s: &str) -> Result<CString> {
    CString::new(s)
        .map_err(|_| CephError::InvalidArgument(format!("string contains interior NUL: {s:?}")))
}

/// Owner of one marshaled metadata array.
///
/// Holds the `CString` pair for every entry plus the `repr(C)` pointer
/// array the native call reads. Entry order is arbitrary, matching the
/// source map's iteration order. The pointer array references the owned
/// buffers, so the guard must outlive the native call that consumes it.
pub(crate) struct SnapMetaArray {
    // Keeps every key/value buffer alive; entries point into these.
    _bufs: Vec<(CString, CString)>,
    entries: Vec<sys::snap_metadata>,
}

impl SnapMetaArray {
    pub(crate) fn new(metadata: &HashMap<String, String>) -> Result<Self> {
        let mut bufs = Vec::with_capacity(metadata.len());
        let mut entries = Vec::with_capacity(metadata.len());

        for (key, value) in metadata {
            let c_key = cstring(key)?;
            let c_value = cstring(value)?;
            entries.push(sys::snap_metadata {
                key: c_key.as_ptr(),
                value: c_value.as_ptr(),
            });
            bufs.push((c_key, c_value));
        }

        Ok(SnapMetaArray {
            _bufs: bufs,
            entries,
        })
    }

    /// Pointer to pass to the native call; null for an empty mapping, which
    /// the native call treats differently from a zero-length array.
    pub(crate) fn as_ptr(&self) -> *const sys::snap_metadata {
        if self.entries.is_empty() {
            std::ptr::null()
        } else {
            self.entries.as_ptr()
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_cstring_plain() {
        let c = cstring("hello").unwrap();
        assert_eq!(c.as_bytes(), b"hello");
    }

    #[test]
    fn test_cstring_rejects_interior_nul() {
        let err = cstring("he\0llo").unwrap_err();
        assert!(matches!(err, CephError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_map_marshals_to_null_and_zero() {
        let arr = SnapMetaArray::new(&HashMap::new()).unwrap();
        assert_eq!(arr.len(), 0);
        assert!(arr.as_ptr().is_null());
    }

    #[test]
    fn test_n_entries_marshal_n_pairs() {
        let mut meta = HashMap::new();
        meta.insert("a".to_string(), "1".to_string());
        meta.insert("b".to_string(), "2".to_string());
        meta.insert("c".to_string(), "3".to_string());

        let arr = SnapMetaArray::new(&meta).unwrap();
        assert_eq!(arr.len(), 3);
        assert!(!arr.as_ptr().is_null());

        // Read the marshaled pairs back the way the native side would.
        let entries = unsafe { std::slice::from_raw_parts(arr.as_ptr(), arr.len()) };
        let mut seen = HashMap::new();
        for entry in entries {
            let key = unsafe { CStr::from_ptr(entry.key) }
                .to_string_lossy()
                .into_owned();
            let value = unsafe { CStr::from_ptr(entry.value) }
                .to_string_lossy()
                .into_owned();
            seen.insert(key, value);
        }
        let expected: HashMap<String, String> = meta;
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_pointers_stay_valid_after_move() {
        let mut meta = HashMap::new();
        meta.insert("key".to_string(), "value".to_string());

        let arr = SnapMetaArray::new(&meta).unwrap();
        let moved = arr; // pointer array references heap buffers, not the guard
        let entries = unsafe { std::slice::from_raw_parts(moved.as_ptr(), moved.len()) };
        let key = unsafe { CStr::from_ptr(entries[0].key) };
        assert_eq!(key.to_bytes(), b"key");
    }

    #[test]
    fn test_interior_nul_in_value_rejected() {
        let mut meta = HashMap::new();
        meta.insert("key".to_string(), "bad\0value".to_string());
        assert!(SnapMetaArray::new(&meta).is_err());
    }
}
