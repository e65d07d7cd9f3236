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

use std::path::Path;
use serde::Deserialize;
use bis_common::{fs::{full_extension, set_filepath_contents, filepath_contents, filepath_contents_as_string}, ron::{load_ron_config, config_from_ron_str}};

// run with "cargo test test_xx -- --nocapture"

#[test]
fn test_full_extension() {
    assert_eq!( full_extension( &Path::new("data/brain.nii.gz")), Some("nii.gz".to_string()));
    assert_eq!( full_extension( &Path::new("data/BRAIN.NII")), Some("nii".to_string()));
    assert_eq!( full_extension( &Path::new("slice.png")), Some("png".to_string()));
    assert_eq!( full_extension( &Path::new("archive.gz")), Some("gz".to_string()));
    assert_eq!( full_extension( &Path::new("no_extension")), None);
}

#[test]
fn test_set_contents_creates_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/c.txt");

    set_filepath_contents( &path, b"some text").unwrap();
    assert_eq!( filepath_contents( &path).unwrap(), b"some text");
    assert_eq!( filepath_contents_as_string( &path).unwrap(), "some text");
}

#[test]
fn test_missing_file() {
    let res = filepath_contents( &Path::new("/this/file/does/not/exist.nii"));
    assert!( res.is_err());
}

#[derive(Deserialize,Debug,PartialEq)]
struct TestConfig {
    name: String,
    sizes: Vec<u32>
}

#[test]
fn test_ron_config() {
    let cfg: TestConfig = config_from_ron_str( r#"TestConfig( name: "crop", sizes: [1,2,3] )"#).unwrap();
    assert_eq!( cfg, TestConfig{ name: "crop".into(), sizes: vec![1,2,3] });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.ron");
    set_filepath_contents( &path, br#"( name: "spacing", sizes: [] )"#).unwrap();
    let cfg: TestConfig = load_ron_config( &path).unwrap();
    assert_eq!( cfg.name, "spacing");
    assert!( cfg.sizes.is_empty());

    let res: Result<TestConfig,_> = config_from_ron_str( "TestConfig( name: 42 )");
    assert!( res.is_err());
}

#[test]
fn test_param_value_coercion() {
    use bis_common::values::ParamValue;

    assert_eq!( ParamValue::from("12").as_int(), Some(12));
    assert_eq!( ParamValue::from(" -3 ").as_int(), Some(-3));
    assert_eq!( ParamValue::from("4.0").as_int(), Some(4));
    assert_eq!( ParamValue::from("4.5").as_int(), None);
    assert_eq!( ParamValue::from(7.0).as_int(), Some(7));
    assert_eq!( ParamValue::from(true).as_int(), None);
    assert_eq!( ParamValue::from("0.25").as_float(), Some(0.25));

    assert!( ParamValue::from("true").to_flag());
    assert!( ParamValue::from("1").to_flag());
    assert!( ParamValue::from("ON").to_flag());
    assert!( ParamValue::from(1).to_flag());
    assert!( !ParamValue::from("false").to_flag());
    assert!( !ParamValue::from("0").to_flag());
    assert!( !ParamValue::from("whatever").to_flag());
    assert!( !ParamValue::from(0).to_flag());

    let v: Vec<ParamValue> = serde_json::from_str( r#"[true, 3, 2.5, "text"]"#).unwrap();
    assert_eq!( v, vec![ ParamValue::Flag(true), ParamValue::Int(3), ParamValue::Float(2.5), ParamValue::Text("text".into()) ]);
}
