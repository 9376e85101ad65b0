//! Macro for implementing Display and FromStr for wire-level enums
//!
//! Weekday names and similar enums travel as fixed strings (`"MONDAY"`).
//! The macro keeps the Display output and the parser in one table.
//!
//! # Example
//!
//! ```rust
//! use scheduleprep_domain::impl_enum_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Granule {
//!     Quarter,
//!     Half,
//! }
//!
//! impl_enum_str_conversions!(Granule {
//!     Quarter => "QUARTER",
//!     Half => "HALF",
//! });
//! ```

/// Implements Display and FromStr traits for string-tagged enums
///
/// - Display writes the mapped string verbatim
/// - FromStr matches case-insensitively
#[macro_export]
macro_rules! impl_enum_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
