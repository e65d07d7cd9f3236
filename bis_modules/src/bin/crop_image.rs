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

use anyhow::Result;
use bis_modules::{ModuleRegistry, CropImageModule, NativeCrop, load_parse};

/// runs the cropImage module, e.g.
/// `crop_image -i in.nii.gz -o out.nii.gz --i1 63 --j1 63 --k1 31 --di 2`
fn main() -> Result<()> {
    let registry = ModuleRegistry::load_default()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    std::process::exit( load_parse( &registry, CropImageModule::<NativeCrop>::NAME, &args));
}
