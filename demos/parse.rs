// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  parse.rs - Parser demo for ODB++ jobs.
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

use clap::Parser;

use odbpp::job::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The extracted ODB++ job directory.
    directory: String,

    /// The step to read.
    #[arg(short, long, default_value = DEFAULT_STEP)]
    step: String,

    /// Also dump the features of this layer.
    #[arg(short, long)]
    layer: Option<String>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let job = match OdbJob::open(&args.directory) {
        Ok(job) => job.with_step(&args.step),
        Err(error) => {
            eprintln!("Error opening job {:?}: {:?}", &args.directory, error);
            return;
        }
    };

    let layers = match job.read_layers() {
        Ok(layers) => layers,
        Err(error) => {
            eprintln!("Error reading layer matrix: {:?}", error);
            return;
        }
    };
    println!("Layers:");
    print!("{}", layers);

    match job.read_profile() {
        Ok(profile) => println!(
            "\nProfile ({:?}): {} surface(s), {:?} to {:?}",
            profile.unit,
            profile.surfaces.len(),
            profile.min(),
            profile.max()
        ),
        Err(error) => eprintln!("Error reading profile: {:?}", error),
    }

    match job.read_netlist() {
        Ok(netlist) => println!(
            "Netlist: {} point(s) on {} net(s), optimized: {:?}",
            netlist.points.len(),
            netlist.by_net().len(),
            netlist.optimized
        ),
        Err(error) => eprintln!("Error reading netlist: {:?}", error),
    }

    match job.read_drill_tools(DRILL_LAYER) {
        Ok(tools) => {
            println!("Drill tools:");
            for tool in tools.tools.values() {
                println!(
                    "  T{:<3} {:>10} {:?} {:?}",
                    tool.num, tool.size, tool.plating, tool.tool_type
                );
            }
        }
        Err(error) => eprintln!("Error reading drill tools: {:?}", error),
    }

    if let Some(layer) = &args.layer {
        match job.read_layer_features(layer) {
            Ok(features) => println!("{:#?}", features),
            Err(error) => eprintln!("Error reading features of layer {:?}: {:?}", layer, error),
        }
    }
}
