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

//! Pump reservation wrapper.
//!
//! A [`PumpSlot`] wraps one [`GasPump`] and adds a planned-volume counter,
//! so that a pump's true availability is `remaining - planned`. Checking
//! availability and taking a reservation are a single locked operation;
//! two separate read-then-act calls would race.
//!
//! # Example
//!
//! ```
//! use gas_station_rs::{GasPump, GasType, PumpId, PumpSlot};
//! use rust_decimal_macros::dec;
//!
//! let slot = PumpSlot::new(PumpId(1), GasPump::with_flow_rate(GasType::Diesel, dec!(50), 0));
//! assert_eq!(slot.try_reserve_up_to(dec!(80)), dec!(50));
//! slot.dispense_reserved(dec!(50));
//! assert_eq!(slot.remaining(), dec!(0));
//! ```

use crate::base::{GasType, PumpId};
use crate::pump::GasPump;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
struct SlotState {
    pump: GasPump,
    /// Volume promised to in-flight purchases but not yet dispensed.
    planned: Decimal,
}

impl SlotState {
    fn new(pump: GasPump) -> Self {
        Self {
            pump,
            planned: Decimal::ZERO,
        }
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.planned >= Decimal::ZERO,
            "Invariant violated: planned volume went negative: {}",
            self.planned
        );
        debug_assert!(
            self.pump.remaining() >= self.planned,
            "Invariant violated: planned volume {} exceeds remaining reserve {}",
            self.planned,
            self.pump.remaining()
        );
    }

    /// Uncommitted capacity available for new reservations.
    fn free(&self) -> Decimal {
        self.pump.remaining() - self.planned
    }

    /// Reserves up to `want` liters, bounded by free capacity.
    fn reserve_up_to(&mut self, want: Decimal) -> Decimal {
        let take = want.min(self.free());
        if take <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.planned += take;
        self.assert_invariants();
        take
    }

    /// Returns a reservation that will not be dispensed.
    fn release(&mut self, volume: Decimal) {
        self.planned -= volume;
        self.assert_invariants();
    }
}

/// Read-only snapshot of one registered pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PumpInfo {
    pub id: PumpId,
    pub gas_type: GasType,
    pub remaining: Decimal,
    pub busy: bool,
}

/// Reservation wrapper around a single [`GasPump`].
///
/// All reservation checks and the physical dispense go through one
/// per-slot mutex. The dispense holds that mutex for the whole simulated
/// transfer, which is what serializes physical use of the pump: a second
/// purchase wanting the same pump queues on the lock.
///
/// The published remaining volume and the busy flag live outside the
/// mutex so that station-wide listings never wait for an in-flight
/// transfer to finish.
#[derive(Debug)]
pub struct PumpSlot {
    id: PumpId,
    gas_type: GasType,
    inner: Mutex<SlotState>,
    /// Remaining volume as last published, readable without the slot lock.
    published: RwLock<Decimal>,
    pumping: AtomicBool,
}

impl PumpSlot {
    pub fn new(id: PumpId, pump: GasPump) -> Self {
        let gas_type = pump.gas_type();
        let remaining = pump.remaining();
        Self {
            id,
            gas_type,
            inner: Mutex::new(SlotState::new(pump)),
            published: RwLock::new(remaining),
            pumping: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> PumpId {
        self.id
    }

    pub fn gas_type(&self) -> GasType {
        self.gas_type
    }

    /// Remaining volume as last published. During an in-flight transfer
    /// this already reflects the volume being dispensed.
    pub fn remaining(&self) -> Decimal {
        *self.published.read()
    }

    pub fn is_pumping(&self) -> bool {
        self.pumping.load(Ordering::Acquire)
    }

    /// Atomically reserves up to `want` liters of uncommitted capacity.
    ///
    /// Returns the reserved volume, which may be less than `want` and is
    /// zero when the pump has no free capacity. The check and the
    /// reservation happen under one lock acquisition, so no two
    /// concurrent reservers can both claim the same marginal liter.
    pub fn try_reserve_up_to(&self, want: Decimal) -> Decimal {
        self.inner.lock().reserve_up_to(want)
    }

    /// Releases a reservation that will not be dispensed.
    ///
    /// Must be paired with a prior [`try_reserve_up_to`](Self::try_reserve_up_to)
    /// for the same volume; an unmatched release corrupts the planned
    /// counter (debug-asserted).
    pub fn release(&self, volume: Decimal) {
        self.inner.lock().release(volume);
    }

    /// Dispenses a previously reserved volume.
    ///
    /// Blocks for the simulated transfer time while holding the slot
    /// lock. The planned counter is decremented by exactly the dispensed
    /// volume, so the net effect of a reserve+dispense pair on free
    /// capacity is the physical decrement alone.
    pub fn dispense_reserved(&self, volume: Decimal) {
        let mut state = self.inner.lock();
        self.pumping.store(true, Ordering::Release);
        *self.published.write() = state.pump.remaining() - volume;
        state.pump.dispense(volume);
        state.planned -= volume;
        state.assert_invariants();
        self.pumping.store(false, Ordering::Release);
    }

    pub fn snapshot(&self) -> PumpInfo {
        PumpInfo {
            id: self.id,
            gas_type: self.gas_type,
            remaining: self.remaining(),
            busy: self.is_pumping(),
        }
    }
}
