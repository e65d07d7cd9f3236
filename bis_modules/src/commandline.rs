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

//! command line loader that runs a single module: it turns the module description into command
//! line options, loads the inputs, type checks the parameters, invokes the module and saves the
//! outputs. Optionally the (first) output is compared against a gold standard image

use std::{path::Path, sync::Arc};
use clap::{Arg, ArgAction, ArgMatches, Command, error::ErrorKind};
use serde::Deserialize;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;
use bis_common::{fs::filepath_contents_as_string, values::ParamValue};
use bis_image::{BisImage, CompareMetric, compare_images};
use crate::{
    module::Module, description::{ModuleDescription, ParamType}, values::ParamValues, registry::ModuleRegistry,
    errors::{Result, ModuleError}
};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

pub const DEFAULT_TEST_THRESHOLD: f64 = 0.01;

const PARAMFILE: &str = "paramfile";
const SILENT: &str = "silent";
const DEBUG_LOG: &str = "debug_log";
const TEST_TARGET: &str = "test_target";
const TEST_THRESHOLD: &str = "test_threshold";
const TEST_COMPARISON: &str = "test_comparison";

/// the JSON parameter file format: `{ "module": "cropImage", "params": { "i0": 0, .. } }`
#[derive(Debug,Deserialize)]
pub struct ParamFile {
    pub module: String,
    pub params: ParamValues,
}

impl ParamFile {
    pub fn load (path: impl AsRef<Path>)->Result<Self> {
        let contents = filepath_contents_as_string( &path.as_ref())?;
        Ok( serde_json::from_str( &contents)? )
    }
}

/// what a successful run did
#[derive(Debug,Clone,PartialEq)]
pub enum RunOutcome {
    Saved,
    TestPassed(f64),
    TestFailed(f64),
}

/// parse `args` (not including the binary name) for module `toolname`, run it and return the
/// process exit code
pub fn load_parse (registry: &ModuleRegistry, toolname: &str, args: &[String])->i32 {
    let Some(description) = registry.description( toolname) else {
        print_usage( registry, &format!("---- the module {toolname} does not exist"));
        return EXIT_FAILURE
    };

    let matches = match build_command( description).try_get_matches_from( args) {
        Ok(matches) => matches,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_FAILURE
            }
        }
    };

    init_logging( matches.get_flag( SILENT), matches.get_flag( DEBUG_LOG));

    let command = std::iter::once( toolname).chain( args.iter().map( |s| s.as_str())).collect::<Vec<_>>().join(" ");

    match run( registry, toolname, &command, &matches) {
        Ok(RunOutcome::TestFailed(_)) => EXIT_FAILURE,
        Ok(_) => EXIT_OK,
        Err(e) => {
            error!("---- {e}");
            EXIT_FAILURE
        }
    }
}

pub fn print_usage (registry: &ModuleRegistry, msg: &str) {
    eprintln!("{msg}\nUsage: bisweb modulename [ options ].\n");
    eprintln!(" Type 'bisweb modulename --help' for more information");
    eprintln!("\tThe list of available modules is : {}", registry.names().join(" "));
}

/// install a fmt subscriber unless there already is one. RUST_LOG is used if neither `silent` nor
/// `debug` is set
pub fn init_logging (silent: bool, debug: bool) {
    let filter = if silent {
        EnvFilter::new("error")
    } else if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else( |_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter( filter)
        .with_target( false)
        .try_init();
}

/// the clap command for a module description
pub fn build_command (description: &ModuleDescription)->Command {
    let mut cmd = Command::new( description.name.clone())
        .about( description.description.clone())
        .version( description.version.clone())
        .no_binary_name( true)
        .after_help( "This program is part of the commandline suite of the bis image tools.");

    for p in &description.params {
        let mut help = p.description.clone();
        if !p.required { help = format!("(optional) {help}") }
        if let Some(v) = &p.default { help = format!("{help} [default: {v}]") }

        let mut arg = Arg::new( p.varname.clone())
            .long( p.varname.to_lowercase())
            .help( help)
            .allow_negative_numbers( true);

        arg = match p.param_type {
            ParamType::Int | ParamType::Float => arg.value_name("n"),
            ParamType::Boolean => arg.value_name("b").num_args(0..=1).default_missing_value("true"),
            ParamType::String => arg.value_name("s"),
        };
        cmd = cmd.arg( arg);
    }

    for slot in description.inputs.iter().chain( description.outputs.iter()) {
        let mut arg = Arg::new( slot.varname.clone())
            .long( slot.varname.to_lowercase())
            .value_name("FILE")
            .help( slot.description.clone());
        if let Some(c) = slot.shortname.as_ref().and_then( |s| single_char(s)) {
            arg = arg.short( c);
        }
        cmd = cmd.arg( arg);
    }

    cmd.arg( Arg::new( PARAMFILE).long( PARAMFILE).value_name("FILE")
            .help("read parameters from a JSON file as opposed to the command line"))
        .arg( Arg::new( SILENT).long( SILENT).action( ArgAction::SetTrue)
            .help("run in silent mode (only errors on the console)"))
        .arg( Arg::new( DEBUG_LOG).long("debug-log").action( ArgAction::SetTrue)
            .help("enable debug level logging"))
        .arg( Arg::new( TEST_TARGET).long( TEST_TARGET).value_name("FILE")
            .help("compare the output against this (gold standard) image"))
        .arg( Arg::new( TEST_THRESHOLD).long( TEST_THRESHOLD).value_name("n")
            .value_parser( clap::value_parser!(f64))
            .help("deviation threshold below which the test passes [default: 0.01]"))
        .arg( Arg::new( TEST_COMPARISON).long( TEST_COMPARISON).value_name("s")
            .help("comparison metric: maxabs or cc [default: maxabs]"))
}

fn single_char (s: &str)->Option<char> {
    let mut it = s.chars();
    match (it.next(), it.next()) {
        (Some(c), None) => Some(c),
        _ => None
    }
}

/// parameter values from defaults, paramfile and command line (in increasing priority)
pub fn collect_values (description: &ModuleDescription, toolname: &str, matches: &ArgMatches)->Result<ParamValues> {
    let mut given = ParamValues::new();

    if let Some(path) = matches.get_one::<String>( PARAMFILE) {
        let pf = ParamFile::load( path)?;
        if !pf.module.eq_ignore_ascii_case( toolname) {
            return Err( ModuleError::ParamFileMismatch( format!("{} (expected {})", pf.module, toolname)))
        }
        given.merge( &pf.params);
    }

    for p in &description.params {
        if let Some(v) = matches.get_one::<String>( &p.varname) {
            given.insert( p.varname.clone(), ParamValue::Text( v.clone()));
        }
    }

    Ok( ParamValues::with_defaults( description, &given) )
}

/// run module `toolname` with already parsed command line arguments. `command` is the command line
/// that gets recorded in the output image comments
pub fn run (registry: &ModuleRegistry, toolname: &str, command: &str, matches: &ArgMatches)->Result<RunOutcome> {
    let mut module = registry.create( toolname)?;
    let description = module.description().clone();

    load_inputs( &mut *module, &description, matches)?;
    info!("oooo loaded.");

    let values = collect_values( &description, toolname, matches)?;
    info!("oooo parsed: {values}");

    description.type_check( &values)?;
    info!("oooo type checked.");

    for slot in &description.outputs {
        if slot.required && matches.get_one::<String>( &slot.varname).is_none() {
            return Err( ModuleError::CliError( format!("no filename for output '{}'", slot.varname)))
        }
    }

    if !module.invoke( &values) {
        return Err( ModuleError::CliError( format!("module {} failed", module.name())))
    }
    module.store_comments_in_outputs( command, &values)?;

    save_outputs( &*module, &description, matches)?;
    info!("oooo saved.");

    if let Some(target) = matches.get_one::<String>( TEST_TARGET) {
        let threshold = matches.get_one::<f64>( TEST_THRESHOLD).copied().unwrap_or( DEFAULT_TEST_THRESHOLD);
        let metric: CompareMetric = match matches.get_one::<String>( TEST_COMPARISON) {
            Some(s) => s.parse().map_err( |e: bis_image::BisImageError| ModuleError::CliError( e.to_string()))?,
            None => CompareMetric::MaxAbs
        };
        return test_result( &*module, &description, target, metric, threshold)
    }

    Ok( RunOutcome::Saved )
}

fn load_inputs (module: &mut dyn Module, description: &ModuleDescription, matches: &ArgMatches)->Result<()> {
    for slot in &description.inputs {
        match matches.get_one::<String>( &slot.varname) {
            Some(path) => {
                let img = BisImage::open( path).map_err( |e| ModuleError::LoadError( format!("bad input filename {path}: {e}")))?;
                info!("loaded {}: {}", slot.varname, img.description());
                module.set_input( &slot.varname, Arc::new(img));
            }
            None => {
                if slot.required { return Err( ModuleError::MissingInput( slot.varname.clone())) }
            }
        }
    }
    Ok(())
}

fn save_outputs (module: &dyn Module, description: &ModuleDescription, matches: &ArgMatches)->Result<()> {
    for slot in &description.outputs {
        match (matches.get_one::<String>( &slot.varname), module.output( &slot.varname)) {
            (Some(path), Some(img)) => {
                img.save( path).map_err( |e| ModuleError::SaveError( format!("{path}: {e}")))?;
                info!("saved {} in {}", slot.varname, path);
            }
            (Some(path), None) => warn!("module did not produce output '{}', {} not written", slot.varname, path),
            (None, _) => {}
        }
    }
    Ok(())
}

fn test_result (module: &dyn Module, description: &ModuleDescription, target: &str, metric: CompareMetric, threshold: f64)->Result<RunOutcome> {
    let slot = description.outputs.first().ok_or_else( || ModuleError::CliError("module has no outputs to test".into()))?;
    let result = module.output( &slot.varname).ok_or_else( || ModuleError::MissingInput( slot.varname.clone()))?;
    let gold = BisImage::open( target).map_err( |e| ModuleError::LoadError( format!("test target {target}: {e}")))?;

    info!("==== comparing {} using {} and threshold={}", slot.varname, metric, threshold);
    let cmp = compare_images( result, &gold, metric)?;

    if cmp.passes( threshold) {
        info!("++++ module {} test pass.", module.name());
        info!("++++    deviation ({}) from expected: {} < {}", cmp.metric, cmp.value, threshold);
        Ok( RunOutcome::TestPassed( cmp.value) )
    } else {
        error!("---- module {} test failed. Module produced output significantly different from expected.", module.name());
        error!("----    deviation ({}) from expected: {} >= {}", cmp.metric, cmp.value, threshold);
        Ok( RunOutcome::TestFailed( cmp.value) )
    }
}
