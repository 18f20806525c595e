//! Conversion of caller-supplied targets into the stored request target.
//!
//! The original input string is retained verbatim on the request (it is
//! what `describe` reports); resolution to a parsed URL happens lazily
//! through [`crate::http::url::resolve`].

use url::Url;

/// A trait to convert some type into a request target.
///
/// This trait is "sealed", such that only types within the crate can
/// implement it.
pub trait IntoTarget: IntoTargetSealed {}

impl IntoTarget for Url {}
impl IntoTarget for String {}
impl IntoTarget for &str {}
impl IntoTarget for &String {}

pub trait IntoTargetSealed {
    /// The target string exactly as the caller supplied it.
    fn into_target(self) -> String;
}

impl IntoTargetSealed for Url {
    fn into_target(self) -> String {
        self.into()
    }
}

impl IntoTargetSealed for &str {
    fn into_target(self) -> String {
        self.to_string()
    }
}

impl IntoTargetSealed for &String {
    fn into_target(self) -> String {
        self.clone()
    }
}

impl IntoTargetSealed for String {
    fn into_target(self) -> String {
        self
    }
}
