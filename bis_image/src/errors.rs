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

use thiserror::Error;
use bis_common::define_error;

pub type Result<T> = std::result::Result<T, BisImageError>;

define_error!{ pub BisImageError =
    ImageError(#[from] image::ImageError) : "Image error {0}",
    IOError(#[from] std::io::Error) : "IO error: {0}",
    JsonError(#[from] serde_json::Error) : "JSON error: {0}",
    InvalidImageFormat(String) : "invalid image format: {0}",
    UnsupportedVoxelType(String) : "unsupported voxel type: {0}",
    InvalidDimensions(String) : "invalid dimension error: {0}",
    InvalidRegion(String) : "invalid region error: {0}",
    InvalidParameter(String) : "invalid parameter: {0}",
    IllegalArgument(String) : "illegal argument: {0}",
    OpFailed(String) : "operation failed: {0}"
}

pub fn invalid_format (msg: impl ToString)->BisImageError {
    BisImageError::InvalidImageFormat(msg.to_string())
}

pub fn invalid_dimensions (msg: impl ToString)->BisImageError {
    BisImageError::InvalidDimensions(msg.to_string())
}
