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

/// common macros and utility functions that are shared between the bis crates.
/// This crate should not depend on any image or module specific types

pub mod macros;
pub mod fs;
pub mod ron;
pub mod values;

// a global fn that can be used with serde(skip_serializing_if="bis_common::is_none")
#[inline] pub fn is_none<T> (opt: &Option<T>)->bool { opt.is_none() }
