// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  components.rs - Component listing demo for ODB++ jobs.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::collections::BTreeMap;

use clap::Parser;
use rust_decimal::Decimal;

use odbpp::components::*;
use odbpp::job::*;
use odbpp::netlist::NetId;
use odbpp::units::{Unit, to_mm};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The extracted ODB++ job directory.
    directory: String,

    /// The step to read.
    #[arg(short, long, default_value = DEFAULT_STEP)]
    step: String,

    /// Unit the component files are written in (MM, INCH, MIL, UM).
    #[arg(short, long, default_value = "MM")]
    unit: String,
}

fn mm(value: Decimal, unit: Unit) -> String {
    match to_mm(value, unit) {
        Some(value) => format!("{:.3}", value),
        None => "?".to_string(),
    }
}

fn print_side(side: &str, components: &BTreeMap<ComponentId, Component>, unit: Unit) {
    println!("{} ({} components):", side, components.len());
    for component in components.values() {
        println!(
            "  {:<12} {:<24} ({}, {}) mm, {} deg, {} pin(s)",
            component.name.to_string(),
            component.part_name.to_string(),
            mm(component.location.x, unit),
            mm(component.location.y, unit),
            component.rotation,
            component.toeprints.len()
        );
        for (key, value) in &component.properties {
            println!("      {} = {}", key, value);
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let unit: Unit = match args.unit.parse() {
        Ok(unit) => unit,
        Err(error) => {
            eprintln!("Invalid unit {:?}: {}", &args.unit, error);
            return;
        }
    };

    let job = match OdbJob::open(&args.directory) {
        Ok(job) => job.with_step(&args.step),
        Err(error) => {
            eprintln!("Error opening job {:?}: {:?}", &args.directory, error);
            return;
        }
    };

    let components = match job.read_components() {
        Ok(components) => components,
        Err(error) => {
            eprintln!("Error reading components: {:?}", error);
            return;
        }
    };

    print_side("Top", &components.top, unit);
    print_side("Bottom", &components.bottom, unit);

    // Show which nets touch each reference designator, if a netlist exists.
    let netlist = match job.read_netlist() {
        Ok(netlist) => netlist,
        Err(error) => {
            eprintln!("No netlist: {}", error);
            return;
        }
    };

    let by_name = map_components_by_name(components.iter());
    println!("\nNets ({}):", netlist.names.len());
    for (net, points) in netlist.by_net() {
        if let NetId::Name(name) = net {
            let touching = by_name
                .values()
                .filter(|component| {
                    component
                        .toeprints
                        .iter()
                        .any(|pin| points.iter().any(|point| point.location == pin.location))
                })
                .count();
            println!("  {:<20} {} point(s), {} component(s)", name, points.len(), touching);
        }
    }
}
