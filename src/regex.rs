//! Regex engine selection.
//!
//! The crate compiles against the full `regex` engine by default. Enabling
//! the `lite` feature (with default features disabled) swaps in `regex-lite`
//! for smaller binaries and faster compile times; the subset of the API used
//! here is identical between the two.

#[cfg(feature = "regex")]
pub(crate) use ::regex::Regex;

#[cfg(all(feature = "lite", not(feature = "regex")))]
pub(crate) use ::regex_lite::Regex;

#[cfg(not(any(feature = "regex", feature = "lite")))]
compile_error!("one of the `regex` or `lite` features must be enabled");
