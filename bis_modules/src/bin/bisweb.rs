/*
 * Copyright © 2018, Image Processing and Analysis Group (BioImage Suite Team), Dept. of Radiology &
 * Biomedical Imaging, Yale School of Medicine. All rights reserved.
 *
 * The “BioImage Suite Web” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use anyhow::Result;
use clap::{Parser, Subcommand};
use bis_common::ron::config_to_ron_string;
use bis_modules::{ModuleRegistry, load_parse, commandline::print_usage};

#[derive(Parser, Debug)]
#[command(version, about = "run a bis command module", long_about = None)]
struct Args {
    /// RON file with module descriptions to use instead of the built-in ones
    #[arg(long)]
    descriptions: Option<String>,

    /// list the available modules
    #[arg(long)]
    list: bool,

    /// print the module descriptions in RON format (e.g. to create a custom descriptions file)
    #[arg(long)]
    dump_descriptions: bool,

    #[command(subcommand)]
    module: Option<ModuleCommand>,
}

#[derive(Subcommand, Debug)]
enum ModuleCommand {
    /// module name followed by module options (run with "<module> --help" for details)
    #[command(external_subcommand)]
    Run(Vec<String>),
}

fn main() -> Result<()> {
    let args = Args::parse();

    let registry = match &args.descriptions {
        Some(path) => ModuleRegistry::load_file( path)?,
        None => ModuleRegistry::load_default()?
    };

    if args.list {
        for name in registry.names() { println!("{name}") }
        return Ok(())
    }

    if args.dump_descriptions {
        println!("{}", config_to_ron_string( &registry.descriptions())?);
        return Ok(())
    }

    match &args.module {
        Some(ModuleCommand::Run(module_args)) if !module_args.is_empty() => {
            std::process::exit( load_parse( &registry, &module_args[0], &module_args[1..]));
        }
        _ => {
            print_usage( &registry, "---- no module specified");
            std::process::exit(1);
        }
    }
}
