//! Provides a generic [`MArray`] which wraps [`ndarray::ArrayD`] and supports Matlab-style
//! one-based, inclusive, `end`-relative indexing over the engine's zero-based, exclusive-stop
//! slices, along with call-pattern shims for the familiar builtins: `zeros`, `ones`, `rand`,
//! `randn`, `size`, `find`, `isempty`, `sprintf`, `fprintf`, `regexp`, `regexprep`, `datenum`,
//! `datestr` and friends.
//!
//! Reading through [`MArray::get`] unwraps a one-element result to a bare number and re-wraps
//! anything else; writing through [`MArray::set`] mutates the owned array in place. [`mrange`]
//! builds the inclusive integer ranges used in loops. All storage, arithmetic and broadcasting
//! is delegated to `ndarray`; random sampling to `ndarray-rand`; regular expressions to `regex`;
//! calendar arithmetic to `chrono`.
//!
//! Example usage:
//! ```
//! use marray::{find, mrange, MArray, Value};
//!
//! let x = MArray::from(vec![
//!     vec![1., 2., 3.],
//!     vec![4., 5., 6.],
//!     vec![7., 8., 9.],
//! ]);
//!
//! assert_eq!(x.get((2, 3)), Value::Number(6.));
//!
//! let row = x.get((1, ..)).into_array();
//! assert_eq!(find(row.gt(1.)).to_vec(), vec![1, 2]);
//!
//! let total: isize = mrange(1, 10).into_iter().sum();
//! assert_eq!(total, 55);
//! ```

use std::fmt;
use std::io;
use std::process;

pub use array::*;
pub use builtins::*;
pub use date::*;
pub use index::*;
pub use range::*;
pub use text::*;

mod array;
mod builtins;
mod date;
mod index;
mod range;
mod text;

/// The error type for shim operations which may fail.
///
/// Recoverable conditions (an unparseable date, an invalid pattern, a file
/// that cannot be opened) and the [`error`] builtin's unconditional failures
/// share this type, distinguished by [`Error::is_fatal`].
pub struct Error {
    message: String,
    fatal: bool,
}

impl Error {
    pub(crate) fn msg<I: fmt::Display>(message: I) -> Self {
        Self {
            message: message.to_string(),
            fatal: false,
        }
    }

    pub(crate) fn fatal<I: fmt::Display>(message: I) -> Self {
        Self {
            message: message.to_string(),
            fatal: true,
        }
    }

    /// Whether this error came from the unconditional abort path.
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    /// Write the message to standard error and terminate the process — the
    /// source convention's literal behavior on [`error`].
    pub fn exit(self) -> ! {
        eprintln!("{}", self.message);
        process::exit(1)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(cause: io::Error) -> Self {
        Self::msg(cause)
    }
}

/// The result of a shim operation which may fail.
pub type Result<T> = std::result::Result<T, Error>;
