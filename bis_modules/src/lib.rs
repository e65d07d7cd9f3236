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

//! command modules of the bis tool suite and the framework to run them from the command line.
//! A module is described by a [`ModuleDescription`] (parameters, inputs and outputs), gets its
//! images through named input slots and stores its results in output slots

pub mod errors;
pub use errors::{Result, ModuleError};

pub mod description;
pub use description::{ModuleDescription, ParamDescription, SlotDescription, ParamType};

pub mod values;
pub use values::{ParamValues, parse_boolean};

pub mod module;
pub use module::{Module, ModuleCore, DataSlots};

pub mod crop_image;
pub use crop_image::{CropImageModule, CropBackend, NativeCrop};

pub mod change_spacing;
pub use change_spacing::ChangeImageSpacingModule;

pub mod registry;
pub use registry::{ModuleRegistry, ModuleFactory};

pub mod commandline;
pub use commandline::{load_parse, RunOutcome};

// re-export so that module users don't need a direct dependency
pub use bis_common::values::ParamValue;
pub use bis_image::{BisImage, ImageHandle, CropParamObject};
