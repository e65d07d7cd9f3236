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

use thiserror::Error;
use bis_common::{define_error, ron::RonConfigError};
use bis_image::BisImageError;

pub type Result<T> = std::result::Result<T, ModuleError>;

define_error!{ pub ModuleError =
    NativeCall(#[from] BisImageError) : "native call failed: {0}",
    MissingInput(String) : "missing input: {0}",
    MissingParameter(String) : "missing parameter: {0}",
    InvalidParameter(String) : "invalid parameter: {0}",
    UnknownModule(String) : "unknown module: {0}",
    ParamFileMismatch(String) : "parameter file does not match module: {0}",
    LoadError(String) : "failed to load: {0}",
    SaveError(String) : "failed to save: {0}",
    CliError(String) : "command line error: {0}",
    ConfigError(#[from] RonConfigError) : "config error: {0}",
    JsonError(#[from] serde_json::Error) : "JSON error: {0}",
    IOError(#[from] std::io::Error) : "IO error: {0}"
}

pub fn missing_parameter (name: impl ToString)->ModuleError {
    ModuleError::MissingParameter(name.to_string())
}

pub fn invalid_parameter (msg: impl ToString)->ModuleError {
    ModuleError::InvalidParameter(msg.to_string())
}
