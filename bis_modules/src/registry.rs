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

use std::path::Path;
use tracing::warn;
use bis_common::ron::{config_from_ron_str, load_ron_config};
use crate::{
    module::Module, description::ModuleDescription, errors::{Result, ModuleError},
    crop_image::{CropImageModule, NativeCrop}, change_spacing::ChangeImageSpacingModule
};

/// the module descriptions we ship with
pub const DEFAULT_DESCRIPTIONS: &str = include_str!("../resources/descriptions.ron");

pub type ModuleFactory = fn(ModuleDescription)->Box<dyn Module>;

fn create_crop_image (description: ModuleDescription)->Box<dyn Module> {
    Box::new( CropImageModule::new( description))
}

fn create_change_image_spacing (description: ModuleDescription)->Box<dyn Module> {
    Box::new( ChangeImageSpacingModule::new( description))
}

/// the module implementations we know about
const BUILTIN_MODULES: &[(&str, ModuleFactory)] = &[
    (CropImageModule::<NativeCrop>::NAME, create_crop_image),
    (ChangeImageSpacingModule::NAME, create_change_image_spacing),
];

struct RegistryEntry {
    description: ModuleDescription,
    factory: ModuleFactory,
}

/// maps module names to descriptions and implementations. This is created once at startup and then
/// passed to whoever has to look up modules
pub struct ModuleRegistry {
    entries: Vec<RegistryEntry>
}

impl ModuleRegistry {
    /// create registry from descriptions. Descriptions without implementation are skipped
    pub fn with_descriptions (descriptions: Vec<ModuleDescription>)->Self {
        let mut entries: Vec<RegistryEntry> = Vec::with_capacity( descriptions.len());

        for description in descriptions {
            match BUILTIN_MODULES.iter().find( |(name,_)| *name == description.name) {
                Some((_,factory)) => {
                    entries.retain( |e| e.description.name != description.name);
                    entries.push( RegistryEntry { description, factory: *factory });
                }
                None => warn!("no implementation for module {}, ignoring description", description.name)
            }
        }

        ModuleRegistry { entries }
    }

    /// registry with the built-in descriptions
    pub fn load_default ()->Result<Self> {
        Self::from_ron_str( DEFAULT_DESCRIPTIONS)
    }

    pub fn from_ron_str (s: &str)->Result<Self> {
        let descriptions: Vec<ModuleDescription> = config_from_ron_str( s)?;
        Ok( Self::with_descriptions( descriptions) )
    }

    /// registry from a RON file with module descriptions (same format as the built-in ones)
    pub fn load_file (path: impl AsRef<Path>)->Result<Self> {
        let descriptions: Vec<ModuleDescription> = load_ron_config( path)?;
        Ok( Self::with_descriptions( descriptions) )
    }

    fn entry (&self, name: &str)->Option<&RegistryEntry> {
        self.entries.iter().find( |e| e.description.name.eq_ignore_ascii_case( name))
    }

    pub fn descriptions (&self)->Vec<&ModuleDescription> {
        self.entries.iter().map( |e| &e.description).collect()
    }

    pub fn names (&self)->Vec<&str> {
        self.entries.iter().map( |e| e.description.name.as_str()).collect()
    }

    pub fn contains (&self, name: &str)->bool {
        self.entry( name).is_some()
    }

    /// case insensitive description lookup
    pub fn description (&self, name: &str)->Option<&ModuleDescription> {
        self.entry( name).map( |e| &e.description)
    }

    /// instantiate a new module
    pub fn create (&self, name: &str)->Result<Box<dyn Module>> {
        let e = self.entry( name).ok_or_else( || ModuleError::UnknownModule( name.to_string()))?;
        Ok( (e.factory)( e.description.clone()) )
    }
}
