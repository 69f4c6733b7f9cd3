//! Call-site capture for log events.
//!
//! Locations are captured at the logging call boundary by macro expansion
//! rather than by walking the stack at runtime. Errors that should point
//! at the place they were raised carry their own location in a
//! [`Located`] wrapper; [`origin_of`] finds the deepest one in a source
//! chain.

use serde::Serialize;
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

/// Source location attributed to a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallSite {
    /// Path of the enclosing `impl` type, or the module for free functions.
    pub declaring_type: &'static str,
    pub method: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(
        declaring_type: &'static str,
        method: &'static str,
        file: &'static str,
        line: u32,
    ) -> Self {
        CallSite {
            declaring_type,
            method,
            file,
            line,
        }
    }

    /// Placeholder used when no location could be attributed.
    pub const fn unknown() -> Self {
        CallSite::new("-", "-", "-", 0)
    }

    #[doc(hidden)]
    pub fn from_marker(
        marker: &'static str,
        module: &'static str,
        file: &'static str,
        line: u32,
    ) -> Self {
        let mut path = marker.strip_suffix("::__call_site_marker").unwrap_or(marker);
        while let Some(outer) = path.strip_suffix("::{{closure}}") {
            path = outer;
        }

        match path.rsplit_once("::") {
            Some((declaring_type, method)) => CallSite::new(declaring_type, method, file, line),
            None => CallSite::new(module, path, file, line),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} ({}:{})",
            self.declaring_type, self.method, self.file, self.line
        )
    }
}

#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Capture the [`CallSite`] of the code this macro is expanded in.
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __call_site_marker() {}
        $crate::CallSite::from_marker(
            $crate::callsite::type_name_of(__call_site_marker),
            ::std::module_path!(),
            ::std::file!(),
            ::std::line!(),
        )
    }};
}

/// Wrap an error together with the location it was raised at.
///
/// ```
/// use daily_log_sink::{located, Located};
///
/// fn parse(input: &str) -> Result<u32, Located> {
///     input.parse::<u32>().map_err(|e| located!(e))
/// }
///
/// let err = parse("x").unwrap_err();
/// assert_eq!(err.site().method, "parse");
/// ```
#[macro_export]
macro_rules! located {
    ($err:expr) => {
        $crate::Located::new($err, $crate::call_site!())
    };
}

/// An error that remembers where it was raised.
#[derive(Debug)]
pub struct Located {
    site: CallSite,
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl Located {
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>, site: CallSite) -> Self {
        Located {
            site,
            inner: err.into(),
        }
    }

    pub fn site(&self) -> CallSite {
        self.site
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.inner
    }
}

impl fmt::Display for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for Located {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.inner.as_ref() as &(dyn StdError + 'static))
    }
}

/// Borrow any error value as a `'static` trait object.
///
/// Used by `log_error!` so that concrete errors, `Box<dyn Error + Send + Sync>`
/// and bare trait objects can all be passed as `err = value`.
pub trait AsErrorObject {
    fn as_error_object(&self) -> &(dyn StdError + 'static);
}

impl<E: StdError + 'static> AsErrorObject for E {
    fn as_error_object(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl AsErrorObject for dyn StdError + Send + Sync + 'static {
    fn as_error_object(&self) -> &(dyn StdError + 'static) {
        self
    }
}

impl AsErrorObject for dyn StdError + 'static {
    fn as_error_object(&self) -> &(dyn StdError + 'static) {
        self
    }
}

/// Deepest recorded origin in the error's source chain, if any.
pub fn origin_of(err: &(dyn StdError + 'static)) -> Option<CallSite> {
    let mut deepest = None;
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(located) = e.downcast_ref::<Located>() {
            deepest = Some(located.site);
        }
        current = e.source();
    }
    deepest
}

/// Render an error chain as `outer: inner: root (at origin)`.
pub fn render_error(err: &(dyn StdError + 'static)) -> String {
    let mut out = String::new();
    let mut origin = None;
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(located) = e.downcast_ref::<Located>() {
            origin = Some(located.site);
        } else {
            if !out.is_empty() {
                out.push_str(": ");
            }
            let _ = write!(out, "{e}");
        }
        current = e.source();
    }

    if let Some(site) = origin {
        let _ = write!(out, " (at {site})");
    }
    out
}
