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

//! 2D raster image support. Raster images become single slice volumes with the color channels
//! mapped to the component axis

use std::path::Path;
use image::{DynamicImage, GenericImageView, ImageBuffer, Luma, LumaA, Rgb, Rgba};
use ndarray::{Array5, ShapeBuilder};
use bis_common::fs::ensure_parent_dir;
use crate::{BisImage, ImageData, Voxel, VoxelType, errors::{Result, BisImageError, invalid_dimensions}};

pub fn read_raster_file (path: impl AsRef<Path>)->Result<BisImage> {
    let img = image::open( path)?;
    from_dynamic_image( &img)
}

pub fn from_dynamic_image (img: &DynamicImage)->Result<BisImage> {
    let (w,h) = img.dimensions();
    let (w,h) = (w as usize, h as usize);

    let arr_data = match img {
        DynamicImage::ImageLuma8(buf) => from_interleaved( w, h, 1, buf.as_raw()),
        DynamicImage::ImageLumaA8(buf) => from_interleaved( w, h, 2, buf.as_raw()),
        DynamicImage::ImageRgb8(buf) => from_interleaved( w, h, 3, buf.as_raw()),
        DynamicImage::ImageRgba8(buf) => from_interleaved( w, h, 4, buf.as_raw()),
        DynamicImage::ImageLuma16(buf) => from_interleaved( w, h, 1, buf.as_raw()),
        DynamicImage::ImageLumaA16(buf) => from_interleaved( w, h, 2, buf.as_raw()),
        DynamicImage::ImageRgb16(buf) => from_interleaved( w, h, 3, buf.as_raw()),
        DynamicImage::ImageRgba16(buf) => from_interleaved( w, h, 4, buf.as_raw()),
        DynamicImage::ImageRgb32F(buf) => from_interleaved( w, h, 3, buf.as_raw()),
        DynamicImage::ImageRgba32F(buf) => from_interleaved( w, h, 4, buf.as_raw()),
        other => from_interleaved( w, h, 3, other.to_rgb8().as_raw()),
    };

    BisImage::new( arr_data, [1.0;5])
}

fn from_interleaved<T: Voxel> (w: usize, h: usize, nc: usize, raw: &[T])->ImageData {
    let arr = Array5::from_shape_fn( (w, h, 1, 1, nc).f(), |(i,j,_,_,c)| raw[(j*w + i)*nc + c]);
    T::wrap(arr)
}

/// pixel values in row major, channel interleaved order
fn interleaved<T: Voxel> (arr: &Array5<T>)->Vec<T> {
    let s = arr.shape();
    let (w,h,nc) = (s[0], s[1], s[4]);
    let mut v = Vec::with_capacity( w*h*nc);
    for j in 0..h {
        for i in 0..w {
            for c in 0..nc { v.push( arr[[i,j,0,0,c]]) }
        }
    }
    v
}

/// convert a single slice, single frame image into a DynamicImage. Only 8 and 16 bit unsigned
/// voxels with 1-4 components can be represented
pub fn to_dynamic_image (img: &BisImage)->Result<DynamicImage> {
    let dims = img.dimensions();
    if dims[2] != 1 || dims[3] != 1 {
        return Err( invalid_dimensions( format!("raster images need a single slice and frame, got {dims:?}")))
    }
    let (w,h,nc) = (dims[0] as u32, dims[1] as u32, dims[4]);
    let no_buf = || BisImageError::OpFailed("failed to create raster image buffer".into());

    let dyn_img = match (img.data(), nc) {
        (ImageData::U8(arr), 1) => DynamicImage::ImageLuma8( ImageBuffer::<Luma<u8>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (ImageData::U8(arr), 2) => DynamicImage::ImageLumaA8( ImageBuffer::<LumaA<u8>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (ImageData::U8(arr), 3) => DynamicImage::ImageRgb8( ImageBuffer::<Rgb<u8>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (ImageData::U8(arr), 4) => DynamicImage::ImageRgba8( ImageBuffer::<Rgba<u8>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (ImageData::U16(arr), 1) => DynamicImage::ImageLuma16( ImageBuffer::<Luma<u16>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (ImageData::U16(arr), 2) => DynamicImage::ImageLumaA16( ImageBuffer::<LumaA<u16>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (ImageData::U16(arr), 3) => DynamicImage::ImageRgb16( ImageBuffer::<Rgb<u16>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (ImageData::U16(arr), 4) => DynamicImage::ImageRgba16( ImageBuffer::<Rgba<u16>,_>::from_raw( w, h, interleaved(arr)).ok_or_else(no_buf)?),
        (data, nc) => {
            return Err( BisImageError::IllegalArgument(
                format!("{} images with {} components can't be stored as raster image (use .nii)", data.voxel_type(), nc)))
        }
    };

    Ok(dyn_img)
}

pub fn write_raster_file (img: &BisImage, path: impl AsRef<Path>)->Result<()> {
    let dyn_img = to_dynamic_image( img)?;
    ensure_parent_dir( path.as_ref())?;
    Ok( dyn_img.save( path)? )
}
