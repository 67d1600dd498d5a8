//! Error model: local precondition failures plus opaquely translated
//! native status codes.

use thiserror::Error;

/// Errors surfaced by the snapshot binding layer.
#[derive(Debug, Error)]
pub enum CephError {
    /// The mount handle is null or not connected; detected locally before
    /// any native call.
    #[error("mount is not connected")]
    NotConnected,

    /// A host string cannot cross the boundary (interior NUL byte).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The native library or one of its symbols could not be resolved.
    #[error("failed to load libcephfs: {0}")]
    Library(String),

    /// A native call returned a failure status. Carries the status's
    /// absolute value as a positive errno, with no local reinterpretation.
    #[error("cephfs call failed: {} (errno {})", errno_message(.0), .0)]
    Errno(i32),
}

/// Result alias used across the binding layer.
pub type Result<T> = std::result::Result<T, CephError>;

impl CephError {
    /// The raw errno carried by a native-layer error, if this is one.
    pub fn errno(&self) -> Option<i32> {
        match self {
            CephError::Errno(code) => Some(*code),
            _ => None,
        }
    }
}

/// Translate a native return code: zero succeeds, any non-zero status is a
/// native-layer error carrying the status's absolute value as the errno.
pub(crate) fn check(ret: libc::c_int) -> Result<()> {
    if ret == 0 {
        Ok(())
    } else {
        Err(CephError::Errno(ret.abs()))
    }
}

fn errno_message(code: &i32) -> String {
    std::io::Error::from_raw_os_error(*code).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_zero_is_ok() {
        assert!(check(0).is_ok());
    }

    #[test]
    fn test_check_positive_is_native_error() {
        let err = check(libc::EIO).unwrap_err();
        assert_eq!(err.errno(), Some(libc::EIO));
    }

    #[test]
    fn test_check_negative_carries_errno() {
        let err = check(-libc::ENOENT).unwrap_err();
        assert_eq!(err.errno(), Some(libc::ENOENT));
    }

    #[test]
    fn test_errno_accessor_none_for_local_errors() {
        assert_eq!(CephError::NotConnected.errno(), None);
        assert_eq!(
            CephError::InvalidArgument("bad".to_string()).errno(),
            None
        );
        assert_eq!(CephError::Library("missing".to_string()).errno(), None);
    }

    #[test]
    fn test_errno_display_includes_os_message() {
        let msg = CephError::Errno(libc::EPERM).to_string();
        assert!(msg.contains("errno 1"), "unexpected display: {msg}");
        assert!(!msg.is_empty());
    }

    #[test]
    fn test_display_messages_non_empty() {
        let errors = [
            CephError::NotConnected,
            CephError::InvalidArgument("x".to_string()),
            CephError::Library("y".to_string()),
            CephError::Errno(libc::EACCES),
        ];
        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
