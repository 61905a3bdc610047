// SPDX-License-Identifier: Apache-2.0

//! Closed set of OpenCL scalar types the generators can specialize for.
//!
//! The element-type tag arrives as a string from the tuning layer; it is
//! parsed once into [`ClScalar`] and everything downstream dispatches through
//! capability methods instead of comparing type names.

use snr_core::{Error, Result};

/// Supported OpenCL element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClScalar {
    F32,
    F64,
}

impl ClScalar {
    /// Parse an element-type tag. Unknown tags are rejected outright rather
    /// than emitting kernel text that would not compile.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "float" => Ok(ClScalar::F32),
            "double" => Ok(ClScalar::F64),
            other => Err(Error::UnsupportedDataType(other.to_string())),
        }
    }

    /// OpenCL spelling of the type.
    pub fn type_name(self) -> &'static str {
        match self {
            ClScalar::F32 => "float",
            ClScalar::F64 => "double",
        }
    }

    /// Zero literal with the type-appropriate suffix.
    pub fn zero(self) -> &'static str {
        match self {
            ClScalar::F32 => "0.0f",
            ClScalar::F64 => "0.0",
        }
    }

    /// One literal with the type-appropriate suffix.
    pub fn one(self) -> &'static str {
        match self {
            ClScalar::F32 => "1.0f",
            ClScalar::F64 => "1.0",
        }
    }

    /// Render an integral count as a floating literal of this type.
    pub fn literal_u32(self, value: u32) -> String {
        match self {
            ClScalar::F32 => format!("{value}.0f"),
            ClScalar::F64 => format!("{value}.0"),
        }
    }

    /// Render a floating value as a literal of this type.
    pub fn literal_f(self, value: f64) -> String {
        match self {
            ClScalar::F32 => format!("{:?}f", value as f32),
            ClScalar::F64 => format!("{value:?}"),
        }
    }

    /// Square-root call for this type. Single precision uses the native
    /// intrinsic, double precision the precise one.
    pub fn sqrt_call(self, arg: &str) -> String {
        match self {
            ClScalar::F32 => format!("native_sqrt({arg})"),
            ClScalar::F64 => format!("sqrt({arg})"),
        }
    }
}
