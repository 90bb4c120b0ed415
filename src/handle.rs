//! Opaque native array handles.

use std::fmt;

/// An opaque reference to one native array.
///
/// The value means nothing on the host side; only the native layer can
/// interpret it. `Handle::NULL` marks a wrapper whose array has been released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Handle(usize);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_default() {
        assert!(Handle::default().is_null());
        assert!(!Handle::from_raw(3).is_null());
        assert_eq!(Handle::from_raw(255).to_string(), "0xff");
    }
}
