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

//! # Gas Station
//!
//! This library provides a concurrent gas station engine that serves
//! purchase requests against a finite pool of physical pumps, each
//! holding a depleting fuel reserve.
//!
//! ## Core Components
//!
//! - [`Station`]: Public facade composing ledgers, pumps, and statistics
//! - [`GasPump`]: A physical dispensing unit with a blocking transfer simulation
//! - [`PumpSlot`]: Reservation wrapper serializing access to one pump
//! - [`PurchaseError`]: Error types for rejected purchases
//!
//! ## Example
//!
//! ```
//! use gas_station_rs::{GasPump, GasType, Station};
//! use rust_decimal_macros::dec;
//!
//! let station = Station::new();
//! station.register_pump(GasPump::with_flow_rate(GasType::Diesel, dec!(50), 0));
//! station.set_price(GasType::Diesel, dec!(1.50));
//!
//! // Buy 10 liters with a price ceiling of 2.00 per liter
//! let paid = station.buy_gas(GasType::Diesel, dec!(10), dec!(2.00)).unwrap();
//! assert_eq!(paid, dec!(15.00));
//! assert_eq!(station.sales(), 1);
//! ```
//!
//! ## Thread Safety
//!
//! Purchases run concurrently from any number of threads. Capacity is
//! reserved per pump under that pump's own lock before fuel moves, so two
//! purchases can never double-spend the same liter, and a purchase too
//! large for one pump is served from several pumps in sequence.

mod base;
mod ledger;
mod pump;
mod station;
mod stats;
pub mod error;
pub mod slot;

pub use base::{GasType, ParseGasTypeError, PumpId};
pub use error::PurchaseError;
pub use pump::GasPump;
pub use slot::{PumpInfo, PumpSlot};
pub use station::Station;
