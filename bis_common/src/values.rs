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

/// loosely typed parameter values as they come from command lines, JSON parameter files or
/// module descriptions. Consumers coerce them into strict types when they need to

use std::fmt;
use serde::{Serialize,Deserialize};

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Int(i64),
    Float(f64),
    Text(String)
}

impl ParamValue {
    /// integer coercion - integral numbers and integer (or integral float) text are accepted
    pub fn as_int (&self)->Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            ParamValue::Float(f) => integral_f64(*f),
            ParamValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else( || s.parse::<f64>().ok().and_then(integral_f64))
            }
            ParamValue::Flag(_) => None
        }
    }

    pub fn as_float (&self)->Option<f64> {
        match self {
            ParamValue::Int(n) => Some(*n as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Text(s) => s.trim().parse::<f64>().ok(),
            ParamValue::Flag(_) => None
        }
    }

    /// lenient boolean interpretation: flags map to themselves, numbers are true if non-zero and
    /// text is true for "true", "1", "on" or "yes" (case insensitive). Everything else is false
    pub fn to_flag (&self)->bool {
        match self {
            ParamValue::Flag(b) => *b,
            ParamValue::Int(n) => *n != 0,
            ParamValue::Float(f) => *f != 0.0,
            ParamValue::Text(s) => {
                let s = s.trim().to_lowercase();
                matches!( s.as_str(), "true" | "1" | "on" | "yes")
            }
        }
    }

    /// is this a value that has an unambiguous boolean meaning
    pub fn is_flag_like (&self)->bool {
        match self {
            ParamValue::Flag(_) => true,
            ParamValue::Int(n) => *n == 0 || *n == 1,
            ParamValue::Float(_) => false,
            ParamValue::Text(s) => {
                let s = s.trim().to_lowercase();
                matches!( s.as_str(), "true" | "1" | "on" | "yes" | "false" | "0" | "off" | "no")
            }
        }
    }
}

fn integral_f64 (f: f64)->Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 { Some(f as i64) } else { None }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Flag(b) => write!(f, "{b}"),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for ParamValue { fn from(s: &str)->Self { ParamValue::Text(s.to_string()) } }
impl From<String> for ParamValue { fn from(s: String)->Self { ParamValue::Text(s) } }
impl From<i64> for ParamValue { fn from(n: i64)->Self { ParamValue::Int(n) } }
impl From<i32> for ParamValue { fn from(n: i32)->Self { ParamValue::Int(n as i64) } }
impl From<f64> for ParamValue { fn from(x: f64)->Self { ParamValue::Float(x) } }
impl From<bool> for ParamValue { fn from(b: bool)->Self { ParamValue::Flag(b) } }
