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

//! Gas station facade and purchase orchestration.
//!
//! The [`Station`] composes the per-type ledgers and the statistics
//! accumulators, and runs the purchase flow: price validation, capacity
//! reservation across the type's pump pool, then serialized dispensing.
//!
//! # Fulfillment Policy
//!
//! A purchase may span several pumps. The requested volume is reserved
//! in full across the pool before any fuel moves; if current uncommitted
//! capacity cannot cover it, the purchase fails fast with
//! [`PurchaseError::NotEnoughGas`] and all partial reservations are
//! released. Once the plan is reserved, each chunk is dispensed in turn;
//! waiting for a busy pump happens by queueing on that pump's lock, so
//! there is no polling loop and no unbounded retry.
//!
//! # Thread Safety
//!
//! Ledgers live in a [`DashMap`], so purchases for different fuel types
//! never contend. Purchases for the same type contend only on individual
//! pump locks, one at a time, which rules out lock-ordering cycles.

use crate::base::{GasType, PumpId};
use crate::ledger::TypeLedger;
use crate::pump::GasPump;
use crate::slot::{PumpInfo, PumpSlot};
use crate::stats::StationStats;
use crate::PurchaseError;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Gas station serving concurrent purchases from a finite pool of pumps.
///
/// # Invariants
///
/// - A pump's remaining volume never goes negative; reservations are
///   accepted only against uncommitted capacity, under the pump's lock.
/// - Exactly one purchase dispenses from a given pump at a time.
/// - Every failed purchase increments exactly one cancellation counter;
///   every successful purchase increments only sales and revenue.
/// - Pumps and fuel types are never removed.
pub struct Station {
    /// Per-type ledgers, created lazily on first price set or pump
    /// registration for a type.
    ledgers: DashMap<GasType, Arc<TypeLedger>>,
    stats: StationStats,
    next_pump_id: AtomicU32,
}

impl Station {
    /// Creates a station with no pumps and no prices configured.
    pub fn new() -> Self {
        Station {
            ledgers: DashMap::new(),
            stats: StationStats::new(),
            next_pump_id: AtomicU32::new(0),
        }
    }

    fn ledger(&self, gas_type: GasType) -> Option<Arc<TypeLedger>> {
        self.ledgers
            .get(&gas_type)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn ledger_or_create(&self, gas_type: GasType) -> Arc<TypeLedger> {
        Arc::clone(
            self.ledgers
                .entry(gas_type)
                .or_insert_with(|| Arc::new(TypeLedger::new()))
                .value(),
        )
    }

    /// Registers a pump with the station and returns its assigned ID.
    ///
    /// The pump is appended to its type's pool; scan order during
    /// purchases follows registration order.
    pub fn register_pump(&self, pump: GasPump) -> PumpId {
        let id = PumpId(self.next_pump_id.fetch_add(1, Ordering::Relaxed) + 1);
        let gas_type = pump.gas_type();
        let slot = Arc::new(PumpSlot::new(id, pump));
        self.ledger_or_create(gas_type).push_slot(slot);
        id
    }

    /// Returns a flattened snapshot of all registered pumps, ordered by ID.
    ///
    /// Never waits for an in-flight transfer; a pump mid-dispense reports
    /// `busy` with the volume being dispensed already deducted.
    pub fn pumps(&self) -> Vec<PumpInfo> {
        let mut out = Vec::new();
        for entry in self.ledgers.iter() {
            for slot in entry.value().slots() {
                out.push(slot.snapshot());
            }
        }
        out.sort_by_key(|info| info.id);
        out
    }

    /// Sets the price per liter for a fuel type, overwriting any previous
    /// value. Creates the type's ledger if this is its first touch.
    pub fn set_price(&self, gas_type: GasType, price: Decimal) {
        self.ledger_or_create(gas_type).set_price(price);
    }

    /// Returns the current price per liter for a fuel type, or zero if
    /// no price has been set.
    pub fn price(&self, gas_type: GasType) -> Decimal {
        self.ledger(gas_type)
            .and_then(|ledger| ledger.price())
            .unwrap_or(Decimal::ZERO)
    }

    /// Purchases `volume` liters of `gas_type`, paying at most
    /// `max_price_per_liter` per liter. Returns the total price paid.
    ///
    /// Blocks while fuel is dispensed; a request that spans busy pumps
    /// waits its turn on each pump's lock.
    ///
    /// The price is validated once, before any reservation, and the same
    /// snapshot is used for billing, so the amount charged never exceeds
    /// the limit the buyer approved even if the price changes mid-purchase.
    ///
    /// # Errors
    ///
    /// - [`PurchaseError::InvalidVolume`] - Requested volume is not positive.
    /// - [`PurchaseError::GasTooExpensive`] - The type is unpriced or priced
    ///   above the buyer's limit. Increments the too-expensive counter.
    /// - [`PurchaseError::NotEnoughGas`] - Uncommitted capacity across the
    ///   type's pumps cannot cover the volume. Increments the no-gas
    ///   counter; no capacity stays reserved.
    pub fn buy_gas(
        &self,
        gas_type: GasType,
        volume: Decimal,
        max_price_per_liter: Decimal,
    ) -> Result<Decimal, PurchaseError> {
        if volume <= Decimal::ZERO {
            return Err(PurchaseError::InvalidVolume);
        }

        // An unknown type has no price configured, which buyers see as
        // unaffordable rather than as a capacity problem.
        let Some(ledger) = self.ledger(gas_type) else {
            self.stats.record_too_expensive();
            return Err(PurchaseError::GasTooExpensive);
        };

        let price_per_liter = match ledger.price() {
            Some(price) if price <= max_price_per_liter => price,
            _ => {
                self.stats.record_too_expensive();
                return Err(PurchaseError::GasTooExpensive);
            }
        };

        let Some(plan) = ledger.plan(volume) else {
            self.stats.record_no_gas();
            return Err(PurchaseError::NotEnoughGas);
        };

        // Dispensing cannot fail once the volume is reserved, so no
        // rollback path is needed past this point.
        for chunk in &plan {
            chunk.slot.dispense_reserved(chunk.volume);
        }

        let paid = volume * price_per_liter;
        self.stats.record_sale(paid);
        Ok(paid)
    }

    /// Total revenue across all successful purchases.
    pub fn revenue(&self) -> Decimal {
        self.stats.revenue()
    }

    /// Number of successful purchases.
    pub fn sales(&self) -> u64 {
        self.stats.sales()
    }

    /// Number of purchases cancelled for insufficient capacity.
    pub fn no_gas_cancellations(&self) -> u64 {
        self.stats.no_gas()
    }

    /// Number of purchases cancelled because the price exceeded the
    /// buyer's limit (or the type was unpriced).
    pub fn too_expensive_cancellations(&self) -> u64 {
        self.stats.too_expensive()
    }
}

impl Default for Station {
    fn default() -> Self {
        Self::new()
    }
}
