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

use std::sync::Arc;
use tracing::debug;
use crate::{module::{Module, ModuleCore}, description::ModuleDescription, values::ParamValues, errors::{Result, invalid_parameter}};

/// `changeImageSpacing` - replaces the spatial voxel spacing of an image without resampling
pub struct ChangeImageSpacingModule {
    core: ModuleCore,
}

impl ChangeImageSpacingModule {
    pub const NAME: &'static str = "changeImageSpacing";

    pub fn new (description: ModuleDescription)->Self {
        ChangeImageSpacingModule { core: ModuleCore::new( Self::NAME, description) }
    }
}

impl Module for ChangeImageSpacingModule {
    fn core (&self)->&ModuleCore { &self.core }
    fn core_mut (&mut self)->&mut ModuleCore { &mut self.core }

    fn direct_invoke_algorithm (&mut self, values: &ParamValues)->Result<()> {
        let input = self.input("input")?.clone();

        let mut spacing = [0f64;3];
        for (i,key) in ["xsp","ysp","zsp"].iter().enumerate() {
            let v = values.require(key)?;
            spacing[i] = v.as_float().ok_or_else( || invalid_parameter( format!("{key}={v} is not a number")))?;
        }

        let output = input.clone_with_spacing( spacing);
        debug!("changed spacing {:?} -> {:?}", input.spacing(), output.spacing());

        self.core.outputs.insert( "output".to_string(), Arc::new(output));
        Ok(())
    }
}
