//! Length units and conversion into the internal unit.
//!
//! All descriptors produced by this crate are expressed in millimetres,
//! matching the convention of particle-transport toolkits where `mm = 1`.
//! File readers never assume a unit: callers pass [`LengthUnit::in_internal`]
//! (or any other factor) explicitly as the scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A length unit accepted in position files and job configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LengthUnit {
    Angstrom,
    Nanometre,
    Micrometre,
    Millimetre,
    Centimetre,
    Metre,
}

#[derive(Debug, Error)]
#[error("Unknown length unit '{0}'. Valid units: angstrom, nm, um, mm, cm, m")]
pub struct UnknownUnit(pub String);

impl LengthUnit {
    /// Multiplicative factor converting a value in this unit to millimetres.
    pub fn in_internal(self) -> f64 {
        match self {
            LengthUnit::Angstrom => 1e-7,
            LengthUnit::Nanometre => 1e-6,
            LengthUnit::Micrometre => 1e-3,
            LengthUnit::Millimetre => 1.0,
            LengthUnit::Centimetre => 10.0,
            LengthUnit::Metre => 1e3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Angstrom => "angstrom",
            LengthUnit::Nanometre => "nm",
            LengthUnit::Micrometre => "um",
            LengthUnit::Millimetre => "mm",
            LengthUnit::Centimetre => "cm",
            LengthUnit::Metre => "m",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "angstrom" | "A" | "Å" => Ok(LengthUnit::Angstrom),
            "nm" | "nanometre" | "nanometer" => Ok(LengthUnit::Nanometre),
            "um" | "µm" | "micrometre" | "micrometer" => Ok(LengthUnit::Micrometre),
            "mm" | "millimetre" | "millimeter" => Ok(LengthUnit::Millimetre),
            "cm" | "centimetre" | "centimeter" => Ok(LengthUnit::Centimetre),
            "m" | "metre" | "meter" => Ok(LengthUnit::Metre),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

impl TryFrom<String> for LengthUnit {
    type Error = UnknownUnit;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LengthUnit> for String {
    fn from(unit: LengthUnit) -> Self {
        unit.symbol().to_string()
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nanometre_factor() {
        assert_eq!(LengthUnit::Nanometre.in_internal(), 1e-6);
        assert_eq!(LengthUnit::Millimetre.in_internal(), 1.0);
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!("um".parse::<LengthUnit>().unwrap(), LengthUnit::Micrometre);
        assert_eq!(" nm ".parse::<LengthUnit>().unwrap(), LengthUnit::Nanometre);
        let err = "furlong".parse::<LengthUnit>().unwrap_err();
        assert!(err.to_string().contains("furlong"));
    }

    #[test]
    fn test_symbol_parses_back() {
        for unit in [
            LengthUnit::Angstrom,
            LengthUnit::Nanometre,
            LengthUnit::Micrometre,
            LengthUnit::Millimetre,
            LengthUnit::Centimetre,
            LengthUnit::Metre,
        ] {
            assert_eq!(unit.symbol().parse::<LengthUnit>().unwrap(), unit);
        }
    }
}
