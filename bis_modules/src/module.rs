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

use std::{collections::HashMap, sync::Arc};
use serde_json::json;
use tracing::{info, error};
use bis_common::values::ParamValue;
use bis_image::ImageHandle;
use crate::{description::ModuleDescription, values::{ParamValues, parse_boolean}, errors::{Result, ModuleError}};

/// named image slots of a module (e.g. "input", "output")
pub type DataSlots = HashMap<String,ImageHandle>;

/// the state every module has: its name, description and input/output slots. Slots are owned by
/// the module instance, i.e. by a single invocation
#[derive(Debug,Clone)]
pub struct ModuleCore {
    pub name: String,
    pub description: ModuleDescription,
    pub inputs: DataSlots,
    pub outputs: DataSlots,
}

impl ModuleCore {
    pub fn new (name: impl ToString, description: ModuleDescription)->Self {
        ModuleCore { name: name.to_string(), description, inputs: HashMap::new(), outputs: HashMap::new() }
    }
}

/// the interface between command modules and the hosting framework (command line loader).
/// Modules read their images from `inputs`, store results in `outputs` and report success
/// through the Result of `direct_invoke_algorithm`
pub trait Module {
    fn core (&self)->&ModuleCore;
    fn core_mut (&mut self)->&mut ModuleCore;

    /// run the module algorithm for the given parameter values
    fn direct_invoke_algorithm (&mut self, values: &ParamValues)->Result<()>;

    fn name (&self)->&str { &self.core().name }
    fn description (&self)->&ModuleDescription { &self.core().description }
    fn inputs (&self)->&DataSlots { &self.core().inputs }
    fn inputs_mut (&mut self)->&mut DataSlots { &mut self.core_mut().inputs }
    fn outputs (&self)->&DataSlots { &self.core().outputs }
    fn outputs_mut (&mut self)->&mut DataSlots { &mut self.core_mut().outputs }

    fn set_input (&mut self, slot: &str, image: ImageHandle) {
        self.inputs_mut().insert( slot.to_string(), image);
    }

    fn input (&self, slot: &str)->Result<&ImageHandle> {
        self.core().inputs.get( slot).ok_or_else( || ModuleError::MissingInput( slot.to_string()))
    }

    fn output (&self, slot: &str)->Option<&ImageHandle> {
        self.core().outputs.get( slot)
    }

    fn parse_boolean (&self, value: &ParamValue)->bool {
        parse_boolean( value)
    }

    /// append a record of how the outputs were computed to their comments. Outputs keep the
    /// history they inherited from the inputs
    fn store_comments_in_outputs (&mut self, command: &str, values: &ParamValues)->Result<()> {
        let params = serde_json::to_value( values)?;
        let comment = json!({
            "module": self.name(),
            "version": self.description().version,
            "command": command,
            "params": params,
        });

        for image in self.outputs_mut().values_mut() {
            Arc::make_mut( image).add_comment( comment.clone());
        }
        Ok(())
    }

    /// invoke the algorithm and turn the result into a success flag. Failures are logged and leave
    /// the output slots as they were
    fn invoke (&mut self, values: &ParamValues)->bool {
        info!("invoking: {} with vals {}", self.name(), values);
        match self.direct_invoke_algorithm( values) {
            Ok(()) => true,
            Err(e) => {
                error!("---- failed to invoke algorithm {}: {}", self.name(), e);
                false
            }
        }
    }
}
