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
use bis_image::{self, BisImage, CropParamObject};
use crate::{module::{Module, ModuleCore}, description::ModuleDescription, values::ParamValues, errors::Result};

/// the routine that performs the actual crop. The parameter object is handed over as given, it is
/// up to the implementation to coerce and validate it
pub trait CropBackend {
    fn crop_image (&self, image: &BisImage, params: &CropParamObject, debug: bool)->bis_image::Result<BisImage>;
}

/// the bis_image crop routine
#[derive(Debug,Clone,Copy,Default)]
pub struct NativeCrop;

impl CropBackend for NativeCrop {
    fn crop_image (&self, image: &BisImage, params: &CropParamObject, debug: bool)->bis_image::Result<BisImage> {
        bis_image::crop_image( image, params, debug)
    }
}

impl<F> CropBackend for F where F: Fn(&BisImage,&CropParamObject,bool)->bis_image::Result<BisImage> {
    fn crop_image (&self, image: &BisImage, params: &CropParamObject, debug: bool)->bis_image::Result<BisImage> {
        self( image, params, debug)
    }
}

/// `cropImage` - crop bounds plus debug flag in, cropped image out
pub struct CropImageModule<B: CropBackend = NativeCrop> {
    core: ModuleCore,
    backend: B,
}

impl CropImageModule<NativeCrop> {
    pub const NAME: &'static str = "cropImage";

    pub fn new (description: ModuleDescription)->Self {
        Self::with_backend( description, NativeCrop)
    }
}

impl<B: CropBackend> CropImageModule<B> {
    pub fn with_backend (description: ModuleDescription, backend: B)->Self {
        CropImageModule { core: ModuleCore::new( CropImageModule::<NativeCrop>::NAME, description), backend }
    }
}

impl<B: CropBackend> Module for CropImageModule<B> {
    fn core (&self)->&ModuleCore { &self.core }
    fn core_mut (&mut self)->&mut ModuleCore { &mut self.core }

    fn direct_invoke_algorithm (&mut self, values: &ParamValues)->Result<()> {
        let input = self.input("input")?.clone();

        let params = CropParamObject::try_from_lookup( |key| values.require(key).cloned())?;
        let debug = self.parse_boolean( values.require("debug")?);

        let output = self.backend.crop_image( &input, &params, debug)?;
        self.core.outputs.insert( "output".to_string(), Arc::new(output));
        Ok(())
    }
}
