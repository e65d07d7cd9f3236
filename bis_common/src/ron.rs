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

/// module with utility functions to load RON configs

use std::path::Path;
use lazy_static::lazy_static;
use ron::{ser::PrettyConfig, error::SpannedError};
use serde::{Serialize,Deserialize};
use thiserror::Error;

use crate::fs::filepath_contents_as_string;

#[derive(Error,Debug)]
pub enum RonConfigError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config RON error {0}")]
    RonError( #[from] ron::Error),

    #[error("config deserialize RON error {0}")]
    RonSerdeError( #[from] SpannedError),
}

lazy_static! {
    static ref PRETTY_RON: PrettyConfig = PrettyConfig::new()
        .struct_names(true)
        .compact_arrays(true);
}

/// deserialize a config value from a RON string
pub fn config_from_ron_str<T> (s: &str)->Result<T,RonConfigError> where T: for<'a> Deserialize<'a> {
    Ok( ron::de::from_str(s)? )
}

/// load a config value from a RON file
pub fn load_ron_config<T,P> (path: P)->Result<T,RonConfigError> where T: for<'a> Deserialize<'a>, P: AsRef<Path> {
    let contents = filepath_contents_as_string( &path.as_ref())?;
    config_from_ron_str( &contents)
}

/// pretty print a config value the way we store it in resource files
pub fn config_to_ron_string<T> (v: &T)->Result<String,RonConfigError> where T: Serialize {
    Ok( ron::ser::to_string_pretty( v, PRETTY_RON.clone())? )
}
