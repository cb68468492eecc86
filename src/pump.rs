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

//! Physical dispensing unit.
//!
//! A [`GasPump`] holds a finite, depleting fuel reserve and simulates the
//! time a physical transfer takes. It is not safe for concurrent use;
//! exactly one purchase may dispense from a pump at a time, which the
//! station enforces through [`PumpSlot`](crate::PumpSlot).

use crate::base::GasType;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::thread;
use std::time::Duration;

/// A single physical dispensing unit for one fuel type.
#[derive(Debug)]
pub struct GasPump {
    gas_type: GasType,
    remaining: Decimal,
    millis_per_liter: u64,
}

impl GasPump {
    /// Default simulated transfer time per liter, in milliseconds.
    pub const DEFAULT_MILLIS_PER_LITER: u64 = 100;

    /// Creates a pump with the default flow rate.
    pub fn new(gas_type: GasType, volume: Decimal) -> Self {
        Self::with_flow_rate(gas_type, volume, Self::DEFAULT_MILLIS_PER_LITER)
    }

    /// Creates a pump with a custom flow rate. A rate of `0` skips the
    /// transfer simulation entirely (useful in tests and benchmarks).
    pub fn with_flow_rate(gas_type: GasType, volume: Decimal, millis_per_liter: u64) -> Self {
        debug_assert!(volume >= Decimal::ZERO, "pump volume must not be negative");
        Self {
            gas_type,
            remaining: volume,
            millis_per_liter,
        }
    }

    pub fn gas_type(&self) -> GasType {
        self.gas_type
    }

    pub fn remaining(&self) -> Decimal {
        self.remaining
    }

    /// Dispenses `volume` liters, blocking for the simulated transfer time.
    ///
    /// Callers must have verified availability first: dispensing more than
    /// the remaining reserve is a caller error.
    pub(crate) fn dispense(&mut self, volume: Decimal) {
        debug_assert!(
            volume <= self.remaining,
            "dispense of {} exceeds remaining reserve of {}",
            volume,
            self.remaining
        );
        self.remaining -= volume;

        let millis = (volume * Decimal::from(self.millis_per_liter))
            .to_u64()
            .unwrap_or(0);
        if millis > 0 {
            thread::sleep(Duration::from_millis(millis));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Instant;

    #[test]
    fn dispense_decrements_remaining() {
        let mut pump = GasPump::with_flow_rate(GasType::Diesel, dec!(50), 0);
        pump.dispense(dec!(20));
        assert_eq!(pump.remaining(), dec!(30));
        pump.dispense(dec!(30));
        assert_eq!(pump.remaining(), Decimal::ZERO);
    }

    #[test]
    fn dispense_blocks_proportionally_to_volume() {
        let mut pump = GasPump::with_flow_rate(GasType::Regular, dec!(10), 10);
        let start = Instant::now();
        pump.dispense(dec!(5));
        // 5 liters at 10 ms/liter should take at least 50 ms.
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn zero_flow_rate_skips_sleep() {
        let mut pump = GasPump::with_flow_rate(GasType::Super, dec!(1000), 0);
        let start = Instant::now();
        pump.dispense(dec!(1000));
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
