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

use std::fmt;
use serde::{Serialize,Deserialize};
use bis_common::values::ParamValue;
use crate::{values::ParamValues, errors::{Result, missing_parameter, invalid_parameter}};

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum ParamType { Int, Float, Boolean, String }

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::Boolean => write!(f, "boolean"),
            ParamType::String => write!(f, "string"),
        }
    }
}

/// a module parameter as it appears on the command line
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ParamDescription {
    pub name: String,
    pub description: String,
    pub varname: String,
    pub param_type: ParamType,

    #[serde(default, skip_serializing_if="bis_common::is_none")]
    pub default: Option<ParamValue>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub advanced: bool,

    #[serde(default, skip_serializing_if="bis_common::is_none")]
    pub low: Option<f64>,

    #[serde(default, skip_serializing_if="bis_common::is_none")]
    pub high: Option<f64>,
}

/// an input or output data slot of a module
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct SlotDescription {
    pub name: String,
    pub description: String,
    pub varname: String,

    #[serde(default, skip_serializing_if="bis_common::is_none")]
    pub shortname: Option<String>,

    #[serde(default)]
    pub required: bool,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct ModuleDescription {
    pub name: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub shortname: String,
    pub inputs: Vec<SlotDescription>,
    pub outputs: Vec<SlotDescription>,
    pub params: Vec<ParamDescription>,
}

impl ModuleDescription {
    pub fn param (&self, varname: &str)->Option<&ParamDescription> {
        self.params.iter().find( |p| p.varname == varname)
    }

    /// the values of all params that have a default
    pub fn default_values (&self)->ParamValues {
        let mut values = ParamValues::new();
        for p in &self.params {
            if let Some(v) = &p.default { values.insert( p.varname.clone(), v.clone()) }
        }
        values
    }

    /// check that all required params are present and all present params can be coerced into
    /// their declared type and range
    pub fn type_check (&self, values: &ParamValues)->Result<()> {
        for p in &self.params {
            let Some(v) = values.get( &p.varname) else {
                if p.required { return Err( missing_parameter( &p.varname)) }
                continue;
            };

            let n = match p.param_type {
                ParamType::Int => Some( v.as_int().ok_or_else( || invalid_parameter( format!("{}={} is not an integer", p.varname, v)))? as f64),
                ParamType::Float => Some( v.as_float().ok_or_else( || invalid_parameter( format!("{}={} is not a number", p.varname, v)))?),
                ParamType::Boolean => {
                    if !v.is_flag_like() { return Err( invalid_parameter( format!("{}={} is not a boolean", p.varname, v))) }
                    None
                }
                ParamType::String => None
            };

            if let Some(n) = n {
                if p.low.is_some_and( |low| n < low) {
                    return Err( invalid_parameter( format!("{}={} is below the minimum of {:?}", p.varname, v, p.low)))
                }
                if p.high.is_some_and( |high| n > high) {
                    return Err( invalid_parameter( format!("{}={} is above the maximum of {:?}", p.varname, v, p.high)))
                }
            }
        }
        Ok(())
    }
}
