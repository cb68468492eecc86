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

//! Sales and cancellation accounting.
//!
//! Four independent accumulators mutated concurrently by in-flight
//! purchases. Each mutation is atomic on its own; the group is not
//! transactional, so a reader may observe revenue updated before the
//! sale count or vice versa. Consumers only read final aggregates.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically non-decreasing purchase statistics. No reset.
#[derive(Debug, Default)]
pub(crate) struct StationStats {
    revenue: Mutex<Decimal>,
    sales: AtomicU64,
    no_gas: AtomicU64,
    too_expensive: AtomicU64,
}

impl StationStats {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sale(&self, paid: Decimal) {
        *self.revenue.lock() += paid;
        self.sales.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_no_gas(&self) {
        self.no_gas.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_too_expensive(&self) {
        self.too_expensive.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn revenue(&self) -> Decimal {
        *self.revenue.lock()
    }

    pub(crate) fn sales(&self) -> u64 {
        self.sales.load(Ordering::Relaxed)
    }

    pub(crate) fn no_gas(&self) -> u64 {
        self.no_gas.load(Ordering::Relaxed)
    }

    pub(crate) fn too_expensive(&self) -> u64 {
        self.too_expensive.load(Ordering::Relaxed)
    }
}
