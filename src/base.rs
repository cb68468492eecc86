// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Core identifier types for fuel categories and pumps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A category of fuel with its own price and pool of pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GasType {
    Regular,
    Super,
    Diesel,
}

impl fmt::Display for GasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GasType::Regular => "regular",
            GasType::Super => "super",
            GasType::Diesel => "diesel",
        };
        write!(f, "{}", name)
    }
}

/// Error returned when parsing an unrecognized fuel category name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown gas type: {0}")]
pub struct ParseGasTypeError(String);

impl FromStr for GasType {
    type Err = ParseGasTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(GasType::Regular),
            "super" => Ok(GasType::Super),
            "diesel" => Ok(GasType::Diesel),
            other => Err(ParseGasTypeError(other.to_string())),
        }
    }
}

/// Unique identifier for a registered pump.
///
/// Assigned once by the station at registration time and immutable
/// thereafter. Wraps a `u32`, allowing up to ~4 billion pumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PumpId(pub u32);

impl fmt::Display for PumpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pump-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_type_round_trips_through_display() {
        for gas_type in [GasType::Regular, GasType::Super, GasType::Diesel] {
            let parsed: GasType = gas_type.to_string().parse().unwrap();
            assert_eq!(parsed, gas_type);
        }
    }

    #[test]
    fn gas_type_parse_is_case_insensitive() {
        assert_eq!("DIESEL".parse::<GasType>().unwrap(), GasType::Diesel);
        assert_eq!("Super".parse::<GasType>().unwrap(), GasType::Super);
    }

    #[test]
    fn gas_type_parse_rejects_unknown_names() {
        let err = "kerosene".parse::<GasType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown gas type: kerosene");
    }

    #[test]
    fn pump_id_display() {
        assert_eq!(PumpId(7).to_string(), "pump-7");
    }
}
