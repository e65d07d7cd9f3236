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
#![allow(unused)]

use std::sync::Arc;
use ndarray::{Array5, ShapeBuilder};
use bis_image::BisImage;
use bis_modules::{
    Module, ModuleError, ModuleRegistry, ParamValues, ParamValue, ParamType, ChangeImageSpacingModule,
    registry::DEFAULT_DESCRIPTIONS
};

// run with "cargo test test_registry -- --nocapture"

#[test]
fn test_default_registry() {
    let registry = ModuleRegistry::load_default().unwrap();
    println!("modules: {:?}", registry.names());

    assert!( registry.contains("cropImage"));
    assert!( registry.contains("CROPIMAGE"));
    assert!( registry.contains("changeImageSpacing"));
    assert!( !registry.contains("smoothImage"));

    let module = registry.create("cropimage").unwrap();
    assert_eq!( module.name(), "cropImage");
    assert!( module.inputs().is_empty());
    assert!( module.outputs().is_empty());

    match registry.create("smoothImage") {
        Err(ModuleError::UnknownModule(name)) => assert_eq!( name, "smoothImage"),
        Err(e) => panic!("wrong error {e}"),
        Ok(_) => panic!("created unknown module")
    }
}

#[test]
fn test_crop_description() {
    let registry = ModuleRegistry::load_default().unwrap();
    let desc = registry.description("cropImage").unwrap();

    assert_eq!( desc.params.len(), 13);
    assert_eq!( desc.inputs.len(), 1);
    assert_eq!( desc.inputs[0].varname, "input");
    assert_eq!( desc.outputs[0].varname, "output");

    for key in bis_image::CROP_PARAM_KEYS {
        let p = desc.param( key).unwrap_or_else( || panic!("no param {key}"));
        assert_eq!( p.param_type, ParamType::Int);
    }
    assert_eq!( desc.param("debug").unwrap().param_type, ParamType::Boolean);
    assert!( desc.param("i1").unwrap().required);

    let defaults = desc.default_values();
    assert_eq!( defaults.get("i0"), Some( &ParamValue::Int(0)));
    assert_eq!( defaults.get("di"), Some( &ParamValue::Int(1)));
    assert_eq!( defaults.get("debug"), Some( &ParamValue::Flag(false)));
    assert!( !defaults.contains("i1"));
}

#[test]
fn test_type_check() {
    let registry = ModuleRegistry::load_default().unwrap();
    let desc = registry.description("cropImage").unwrap();

    let given = ParamValues::new().with("i1", "7").with("j1", 7).with("k1", 0);
    let values = ParamValues::with_defaults( desc, &given);
    assert_eq!( values.len(), 13);
    assert!( desc.type_check( &values).is_ok());

    let values = ParamValues::with_defaults( desc, &ParamValues::new().with("j1", 7).with("k1", 0));
    assert!( matches!( desc.type_check( &values), Err(ModuleError::MissingParameter(p)) if p == "i1"));

    let values = ParamValues::with_defaults( desc, &given.clone().with("i1", "seven"));
    assert!( matches!( desc.type_check( &values), Err(ModuleError::InvalidParameter(_))));

    let values = ParamValues::with_defaults( desc, &given.clone().with("di", 0));
    assert!( matches!( desc.type_check( &values), Err(ModuleError::InvalidParameter(_))));

    let values = ParamValues::with_defaults( desc, &given.clone().with("debug", "maybe"));
    assert!( matches!( desc.type_check( &values), Err(ModuleError::InvalidParameter(_))));

    let values = ParamValues::with_defaults( desc, &given.clone().with("debug", "on"));
    assert!( desc.type_check( &values).is_ok());
}

#[test]
fn test_registry_from_ron() {
    let descriptions = DEFAULT_DESCRIPTIONS.trim_end().trim_end_matches(']').to_string() + r#"
    ModuleDescription(
        name: "smoothImage", title: "Smooth Image", description: "not implemented", author: "nobody",
        version: "1.0", shortname: "sm", inputs: [], outputs: [], params: [],
    ),
]"#;
    let registry = ModuleRegistry::from_ron_str( &descriptions).unwrap();
    assert_eq!( registry.names(), vec!["cropImage", "changeImageSpacing"]);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("descriptions.ron");
    std::fs::write( &path, DEFAULT_DESCRIPTIONS).unwrap();
    let registry = ModuleRegistry::load_file( &path).unwrap();
    assert!( registry.contains("cropImage"));

    let dumped = bis_common::ron::config_to_ron_string( &registry.descriptions()).unwrap();
    let reloaded = ModuleRegistry::from_ron_str( &dumped).unwrap();
    assert_eq!( reloaded.description("cropImage"), registry.description("cropImage"));

    assert!( matches!( ModuleRegistry::from_ron_str("[ ModuleDescription( name: 42 ) ]"), Err(ModuleError::ConfigError(_))));
    assert!( ModuleRegistry::load_file( dir.path().join("nonexistent.ron")).is_err());
}

#[test]
fn test_change_spacing() {
    let registry = ModuleRegistry::load_default().unwrap();
    let desc = registry.description("changeImageSpacing").unwrap().clone();

    let arr = Array5::from_shape_fn( (3,3,3,1,1).f(), |(i,j,k,_,_)| (i+j+k) as f32);
    let img = Arc::new( BisImage::from_array( arr, [1.0,1.0,1.0,1.0,1.0]).unwrap());

    let mut module = ChangeImageSpacingModule::new( desc.clone());
    module.set_input( "input", img.clone());

    let values = ParamValues::with_defaults( &desc, &ParamValues::new().with("xsp", 2.5).with("zsp", "0.5"));
    assert!( module.invoke( &values));

    let out = module.output("output").unwrap();
    assert_eq!( out.spacing(), [2.5,1.0,0.5,1.0,1.0]);
    assert_eq!( out.dimensions(), img.dimensions());
    assert_eq!( out.get_voxel( [1,2,0,0,0]), Some(3.0));

    let values = values.with("ysp", "wide");
    assert!( !module.invoke( &values));
}
