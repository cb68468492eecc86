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

//! Per-fuel-type ledger: the current price and the pool of pump slots.
//!
//! Created lazily on the first price update or pump registration for a
//! type. The slot list is append-only and keeps insertion order; pumps
//! are never removed or reordered.

use crate::slot::PumpSlot;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::sync::Arc;

/// A reserved chunk of one pump's capacity, not yet dispensed.
pub(crate) struct Reservation {
    pub(crate) slot: Arc<PumpSlot>,
    pub(crate) volume: Decimal,
}

/// Price and pump pool for one fuel type.
#[derive(Default)]
pub(crate) struct TypeLedger {
    /// Price per liter; `None` until first set. Overwritten on update.
    price: Mutex<Option<Decimal>>,
    /// Append-only, insertion-ordered pool of reservation wrappers.
    slots: RwLock<Vec<Arc<PumpSlot>>>,
}

impl TypeLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn price(&self) -> Option<Decimal> {
        *self.price.lock()
    }

    pub(crate) fn set_price(&self, price: Decimal) {
        *self.price.lock() = Some(price);
    }

    pub(crate) fn push_slot(&self, slot: Arc<PumpSlot>) {
        self.slots.write().push(slot);
    }

    /// Snapshot of the slot pool in insertion order.
    ///
    /// Clones the `Arc`s out under a short read lock so that scans and
    /// dispenses run without blocking registration of new pumps.
    pub(crate) fn slots(&self) -> Vec<Arc<PumpSlot>> {
        self.slots.read().clone()
    }

    /// Reserves `volume` liters across the pool, spanning pumps as needed.
    ///
    /// Scans slots in insertion order, claiming up to the outstanding
    /// volume from each. If the pool cannot cover the full volume, every
    /// reservation made during the scan is released and `None` is
    /// returned, so a failed purchase never strands capacity.
    pub(crate) fn plan(&self, volume: Decimal) -> Option<Vec<Reservation>> {
        let mut outstanding = volume;
        let mut chunks = Vec::new();

        for slot in self.slots() {
            if outstanding <= Decimal::ZERO {
                break;
            }
            let reserved = slot.try_reserve_up_to(outstanding);
            if reserved > Decimal::ZERO {
                outstanding -= reserved;
                chunks.push(Reservation {
                    slot,
                    volume: reserved,
                });
            }
        }

        if outstanding > Decimal::ZERO {
            for chunk in &chunks {
                chunk.slot.release(chunk.volume);
            }
            return None;
        }
        Some(chunks)
    }
}
