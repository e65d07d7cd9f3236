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

use std::{collections::BTreeMap, fmt};
use serde::{Serialize,Deserialize};
use bis_common::values::ParamValue;
use crate::{description::ModuleDescription, errors::{Result, missing_parameter}};

/// strict boolean interpretation of a loosely typed value ("true", "1", "on", non-zero numbers..)
pub fn parse_boolean (value: &ParamValue)->bool {
    value.to_flag()
}

/// the named parameter values a module is invoked with
#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
#[serde(transparent)]
pub struct ParamValues(BTreeMap<String,ParamValue>);

impl ParamValues {
    pub fn new ()->Self { ParamValues( BTreeMap::new()) }

    /// description defaults, overridden by the given values
    pub fn with_defaults (description: &ModuleDescription, given: &ParamValues)->Self {
        let mut values = description.default_values();
        values.merge( given);
        values
    }

    pub fn insert (&mut self, key: impl ToString, value: impl Into<ParamValue>) {
        self.0.insert( key.to_string(), value.into());
    }

    /// builder style insert
    pub fn with (mut self, key: impl ToString, value: impl Into<ParamValue>)->Self {
        self.insert( key, value);
        self
    }

    pub fn get (&self, key: &str)->Option<&ParamValue> { self.0.get(key) }

    /// get value or fail with a `MissingParameter` error
    pub fn require (&self, key: &str)->Result<&ParamValue> {
        self.0.get(key).ok_or_else( || missing_parameter(key))
    }

    pub fn contains (&self, key: &str)->bool { self.0.contains_key(key) }
    pub fn len (&self)->usize { self.0.len() }
    pub fn is_empty (&self)->bool { self.0.is_empty() }

    pub fn iter (&self)->impl Iterator<Item=(&String,&ParamValue)> { self.0.iter() }

    /// add all values of `other`, replacing existing entries
    pub fn merge (&mut self, other: &ParamValues) {
        for (k,v) in other.iter() {
            self.0.insert( k.clone(), v.clone());
        }
    }
}

impl<K: ToString, V: Into<ParamValue>> FromIterator<(K,V)> for ParamValues {
    fn from_iter<I: IntoIterator<Item=(K,V)>> (iter: I)->Self {
        let mut values = ParamValues::new();
        for (k,v) in iter { values.insert( k, v) }
        values
    }
}

impl fmt::Display for ParamValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{{")?;
        for (i,(k,v)) in self.0.iter().enumerate() {
            if i > 0 { write!( f, ",")? }
            write!( f, "{k}:{v}")?;
        }
        write!( f, "}}")
    }
}
