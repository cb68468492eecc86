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

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use gas_station_rs::{GasPump, GasType, Station};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;

/// Pumps driven from a command file skip the transfer simulation so that
/// file-sized runs finish immediately.
const CLI_FLOW_RATE_MILLIS: u64 = 0;

/// Gas Station - Drive a station from a CSV command file
///
/// Reads station commands from a CSV file, replays them against a fresh
/// station, and prints the pump inventory and sales statistics to stdout.
#[derive(Parser, Debug)]
#[command(name = "gas-station-rs")]
#[command(about = "A gas station engine driven by CSV command files", long_about = None)]
struct Args {
    /// Path to CSV file with station commands
    ///
    /// Expected format: op,gas,volume,price
    /// Example: cargo run -- commands.csv > report.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Replay commands from CSV
    let station = match run_commands(BufReader::new(file)) {
        Ok(station) => station,
        Err(e) => {
            eprintln!("Error processing commands: {}", e);
            process::exit(1);
        }
    };

    // Write report to stdout
    if let Err(e) = write_report(&station, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `op, gas, volume, price`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    op: String,
    gas: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    volume: Option<Decimal>,
    #[serde(deserialize_with = "csv::invalid_option")]
    price: Option<Decimal>,
}

/// A single station command parsed from one CSV row.
#[derive(Debug)]
enum Command {
    RegisterPump { gas_type: GasType, volume: Decimal },
    SetPrice { gas_type: GasType, price: Decimal },
    Buy { gas_type: GasType, volume: Decimal, max_price: Decimal },
}

impl CsvRecord {
    /// Converts a CSV record to a Command.
    ///
    /// Returns `None` for unknown ops, unknown gas types, or missing
    /// required fields.
    fn into_command(self) -> Option<Command> {
        let gas_type: GasType = self.gas.parse().ok()?;

        match self.op.to_lowercase().as_str() {
            "pump" => Some(Command::RegisterPump {
                gas_type,
                volume: self.volume?,
            }),
            "price" => Some(Command::SetPrice {
                gas_type,
                price: self.price?,
            }),
            "buy" => Some(Command::Buy {
                gas_type,
                volume: self.volume?,
                max_price: self.price?,
            }),
            _ => None,
        }
    }
}

/// Replays station commands from a CSV reader.
///
/// Rows are applied in order against a fresh [`Station`]. Malformed rows
/// and rejected purchases are skipped; rejections still show up in the
/// station's cancellation counters.
///
/// # CSV Format
///
/// Expected columns: `op, gas, volume, price`
/// - `op`: Command (pump, price, buy)
/// - `gas`: Fuel type (regular, super, diesel)
/// - `volume`: Liters (required for pump and buy)
/// - `price`: Price per liter (required for price and buy, where it is
///   the buyer's ceiling)
///
/// # Example
///
/// ```csv
/// op,gas,volume,price
/// pump,diesel,100,
/// price,diesel,,1.50
/// buy,diesel,20,2.00
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn run_commands<R: Read>(reader: R) -> Result<Station, csv::Error> {
    let station = Station::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " buy "
        .flexible(true) // Allow missing trailing fields
        .has_headers(true) // Skip first row as header
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        match result {
            Ok(record) => {
                let Some(command) = record.into_command() else {
                    #[cfg(debug_assertions)]
                    eprintln!("Skipping invalid command record");
                    continue;
                };

                match command {
                    Command::RegisterPump { gas_type, volume } => {
                        station.register_pump(GasPump::with_flow_rate(
                            gas_type,
                            volume,
                            CLI_FLOW_RATE_MILLIS,
                        ));
                    }
                    Command::SetPrice { gas_type, price } => {
                        station.set_price(gas_type, price);
                    }
                    Command::Buy {
                        gas_type,
                        volume,
                        max_price,
                    } => {
                        // Rejected purchases are a normal outcome; the
                        // cancellation counters capture them.
                        if let Err(_e) = station.buy_gas(gas_type, volume, max_price) {
                            #[cfg(debug_assertions)]
                            eprintln!("Purchase of {} l {} rejected: {}", volume, gas_type, _e);
                        }
                    }
                }
            }
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        }
    }

    Ok(station)
}

/// Summary row appended after the pump inventory.
#[derive(Debug, Serialize)]
struct StatsRecord {
    revenue: Decimal,
    sales: u64,
    no_gas_cancellations: u64,
    too_expensive_cancellations: u64,
}

/// Writes the pump inventory and the statistics summary as CSV.
///
/// # Example
///
/// ```csv
/// id,gas_type,remaining,busy
/// 1,diesel,80,false
///
/// revenue,sales,no_gas_cancellations,too_expensive_cancellations
/// 30.00,1,0,0
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_report<W: Write>(station: &Station, mut writer: W) -> Result<(), csv::Error> {
    let mut pumps = Writer::from_writer(&mut writer);
    for info in station.pumps() {
        pumps.serialize(info)?;
    }
    pumps.flush()?;
    drop(pumps);

    writeln!(&mut writer)?;

    let mut stats = Writer::from_writer(&mut writer);
    stats.serialize(StatsRecord {
        revenue: station.revenue(),
        sales: station.sales(),
        no_gas_cancellations: station.no_gas_cancellations(),
        too_expensive_cancellations: station.too_expensive_cancellations(),
    })?;
    stats.flush()?;
    Ok(())
}
