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

//! volumetric image model and image operations of the bis tool suite.
//! Images are 5-dimensional voxel arrays indexed as `[i,j,k,t,c]` (three spatial axes, frames and
//! components) with a per-axis spacing. Voxels are stored as typed ndarray arrays

use std::{fmt, path::Path, sync::Arc};
use ndarray::{Array5, ShapeBuilder};
use num::{NumCast, ToPrimitive, Zero};
use serde::{Serialize,Deserialize};
use serde_json::Value;
use bis_common::fs::full_extension;

/// execute `$body` with `$arr` bound to the typed voxel array of `$data`
macro_rules! dispatch {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ImageData::U8($arr) => $body,
            ImageData::I8($arr) => $body,
            ImageData::U16($arr) => $body,
            ImageData::I16($arr) => $body,
            ImageData::U32($arr) => $body,
            ImageData::I32($arr) => $body,
            ImageData::F32($arr) => $body,
            ImageData::F64($arr) => $body,
        }
    }
}

/// like `dispatch` but wrap the (array valued) `$body` result into the same ImageData variant
macro_rules! map_data {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            ImageData::U8($arr) => ImageData::U8($body),
            ImageData::I8($arr) => ImageData::I8($body),
            ImageData::U16($arr) => ImageData::U16($body),
            ImageData::I16($arr) => ImageData::I16($body),
            ImageData::U32($arr) => ImageData::U32($body),
            ImageData::I32($arr) => ImageData::I32($body),
            ImageData::F32($arr) => ImageData::F32($body),
            ImageData::F64($arr) => ImageData::F64($body),
        }
    }
}

mod errors;
pub use errors::{Result,BisImageError};

pub mod nifti;
pub use nifti::NiftiHeader;

pub mod raster;

pub mod crop;
pub use crop::{crop_image, CropParamObject, CropBounds, AxisRange, CROP_PARAM_KEYS};

pub mod compare;
pub use compare::{compare_images, CompareMetric, ImageComparison};

/// shared, immutable reference to an image. Modules pass these through without copying voxel data
pub type ImageHandle = Arc<BisImage>;

/// number of axes of our image arrays (i,j,k,t,c)
pub const N_AXES: usize = 5;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum VoxelType { U8, I8, U16, I16, U32, I32, F32, F64 }

impl VoxelType {
    pub fn size (&self)->usize {
        match self {
            VoxelType::U8 | VoxelType::I8 => 1,
            VoxelType::U16 | VoxelType::I16 => 2,
            VoxelType::U32 | VoxelType::I32 | VoxelType::F32 => 4,
            VoxelType::F64 => 8
        }
    }

    pub fn bits (&self)->usize { self.size() * 8 }

    pub fn name (&self)->&'static str {
        match self {
            VoxelType::U8 => "uchar",
            VoxelType::I8 => "char",
            VoxelType::U16 => "ushort",
            VoxelType::I16 => "short",
            VoxelType::U32 => "uint",
            VoxelType::I32 => "int",
            VoxelType::F32 => "float",
            VoxelType::F64 => "double"
        }
    }
}

impl fmt::Display for VoxelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}", self.name())
    }
}

/// the primitive types we support as voxel values
pub trait Voxel: Copy + Zero + NumCast + ToPrimitive + PartialOrd + fmt::Debug + Send + Sync + 'static {
    const VOXEL_TYPE: VoxelType;

    /// decode from the first `VOXEL_TYPE.size()` bytes of the slice
    fn read_from (bytes: &[u8], big_endian: bool)->Self;
    fn append_le (self, buf: &mut Vec<u8>);

    fn wrap (arr: Array5<Self>)->ImageData;
    fn unwrap_ref (data: &ImageData)->Option<&Array5<Self>>;
}

macro_rules! impl_voxel {
    ($t:ty, $variant:ident) => {
        impl Voxel for $t {
            const VOXEL_TYPE: VoxelType = VoxelType::$variant;

            #[inline]
            fn read_from (bytes: &[u8], big_endian: bool)->Self {
                let mut a = [0u8; std::mem::size_of::<$t>()];
                a.copy_from_slice( &bytes[..std::mem::size_of::<$t>()]);
                if big_endian { <$t>::from_be_bytes(a) } else { <$t>::from_le_bytes(a) }
            }

            #[inline]
            fn append_le (self, buf: &mut Vec<u8>) {
                buf.extend_from_slice( &self.to_le_bytes())
            }

            fn wrap (arr: Array5<Self>)->ImageData { ImageData::$variant(arr) }

            fn unwrap_ref (data: &ImageData)->Option<&Array5<Self>> {
                if let ImageData::$variant(arr) = data { Some(arr) } else { None }
            }
        }
    }
}

impl_voxel!(u8, U8);
impl_voxel!(i8, I8);
impl_voxel!(u16, U16);
impl_voxel!(i16, I16);
impl_voxel!(u32, U32);
impl_voxel!(i32, I32);
impl_voxel!(f32, F32);
impl_voxel!(f64, F64);

/// typed voxel storage
#[derive(Debug,Clone,PartialEq)]
pub enum ImageData {
    U8(Array5<u8>),
    I8(Array5<i8>),
    U16(Array5<u16>),
    I16(Array5<i16>),
    U32(Array5<u32>),
    I32(Array5<i32>),
    F32(Array5<f32>),
    F64(Array5<f64>),
}

impl ImageData {
    /// create zero initialized (column major) storage
    pub fn zeros (voxel_type: VoxelType, dims: [usize;N_AXES])->ImageData {
        let shape = (dims[0], dims[1], dims[2], dims[3], dims[4]).f();
        match voxel_type {
            VoxelType::U8 => ImageData::U8( Array5::zeros(shape)),
            VoxelType::I8 => ImageData::I8( Array5::zeros(shape)),
            VoxelType::U16 => ImageData::U16( Array5::zeros(shape)),
            VoxelType::I16 => ImageData::I16( Array5::zeros(shape)),
            VoxelType::U32 => ImageData::U32( Array5::zeros(shape)),
            VoxelType::I32 => ImageData::I32( Array5::zeros(shape)),
            VoxelType::F32 => ImageData::F32( Array5::zeros(shape)),
            VoxelType::F64 => ImageData::F64( Array5::zeros(shape)),
        }
    }

    pub fn voxel_type (&self)->VoxelType {
        match self {
            ImageData::U8(_) => VoxelType::U8,
            ImageData::I8(_) => VoxelType::I8,
            ImageData::U16(_) => VoxelType::U16,
            ImageData::I16(_) => VoxelType::I16,
            ImageData::U32(_) => VoxelType::U32,
            ImageData::I32(_) => VoxelType::I32,
            ImageData::F32(_) => VoxelType::F32,
            ImageData::F64(_) => VoxelType::F64,
        }
    }

    pub fn dimensions (&self)->[usize;N_AXES] {
        dispatch!( self, arr => {
            let s = arr.shape();
            [s[0], s[1], s[2], s[3], s[4]]
        })
    }

    pub fn len (&self)->usize {
        dispatch!( self, arr => arr.len())
    }

    pub fn get_f64 (&self, idx: [usize;N_AXES])->Option<f64> {
        dispatch!( self, arr => arr.get(idx).and_then( |v| v.to_f64()))
    }

    /// iterate over all voxel values (as f64) in logical [i,j,k,t,c] order
    pub fn iter_f64 (&self)->Box<dyn Iterator<Item=f64> + '_> {
        dispatch!( self, arr => Box::new( arr.iter().map( |v| v.to_f64().unwrap_or(0.0))))
    }
}

/// the image object our modules operate on
#[derive(Debug,Clone)]
pub struct BisImage {
    data: ImageData,
    spacing: [f64;N_AXES],
    header: Option<NiftiHeader>,
    filename: Option<String>,
    comments: Vec<Value>,
}

impl BisImage {
    pub fn new (data: ImageData, spacing: [f64;N_AXES])->Result<Self> {
        let dims = data.dimensions();
        if dims.iter().any( |&d| d == 0) {
            return Err( errors::invalid_dimensions( format!("image dimensions {dims:?} contain empty axis")))
        }
        if spacing.iter().any( |s| !s.is_finite() || *s <= 0.0) {
            return Err( errors::invalid_dimensions( format!("invalid image spacing {spacing:?}")))
        }
        Ok( BisImage { data, spacing, header: None, filename: None, comments: Vec::new() } )
    }

    pub fn from_array<T: Voxel> (arr: Array5<T>, spacing: [f64;N_AXES])->Result<Self> {
        Self::new( T::wrap(arr), spacing)
    }

    pub fn zeros (voxel_type: VoxelType, dims: [usize;N_AXES], spacing: [f64;N_AXES])->Result<Self> {
        Self::new( ImageData::zeros( voxel_type, dims), spacing)
    }

    /// open image file. NIfTI (.nii, .nii.gz) files are read as volumes, everything else is
    /// delegated to the raster image readers and becomes a single slice volume
    pub fn open (path: impl AsRef<Path>)->Result<Self> {
        let path = path.as_ref();
        let mut img = match full_extension( &path).as_deref() {
            Some("nii") | Some("nii.gz") => nifti::read_nifti_file( path)?,
            _ => raster::read_raster_file( path)?
        };
        img.filename = path.to_str().map( |s| s.to_string());
        Ok(img)
    }

    pub fn save (&self, path: impl AsRef<Path>)->Result<()> {
        let path = path.as_ref();
        match full_extension( &path).as_deref() {
            Some("nii") | Some("nii.gz") => nifti::write_nifti_file( self, path),
            _ => raster::write_raster_file( self, path)
        }
    }

    pub fn data (&self)->&ImageData { &self.data }
    pub fn voxel_type (&self)->VoxelType { self.data.voxel_type() }
    pub fn dimensions (&self)->[usize;N_AXES] { self.data.dimensions() }
    pub fn spacing (&self)->[f64;N_AXES] { self.spacing }
    pub fn num_voxels (&self)->usize { self.data.len() }
    pub fn header (&self)->Option<&NiftiHeader> { self.header.as_ref() }
    pub fn filename (&self)->Option<&str> { self.filename.as_deref() }

    /// the processing history of this image. Stored as JSON in NIfTI header extensions
    pub fn comments (&self)->&[Value] { &self.comments }

    pub fn add_comment (&mut self, comment: impl Into<Value>) {
        self.comments.push( comment.into());
    }

    pub fn with_comments (mut self, comments: Vec<Value>)->Self {
        self.comments = comments;
        self
    }

    pub fn with_header (mut self, header: NiftiHeader)->Self {
        self.header = Some(header);
        self
    }

    pub fn array<T: Voxel> (&self)->Option<&Array5<T>> {
        T::unwrap_ref( &self.data)
    }

    pub fn get_voxel (&self, idx: [usize;N_AXES])->Option<f64> {
        self.data.get_f64(idx)
    }

    /// (min,max) over all voxels
    pub fn intensity_range (&self)->(f64,f64) {
        self.data.iter_f64().fold( (f64::MAX, f64::MIN), |(lo,hi),v| (lo.min(v), hi.max(v)))
    }

    /// copy of this image with some of the spatial spacings replaced. Non-positive entries keep the
    /// original value
    pub fn clone_with_spacing (&self, spacing: [f64;3])->BisImage {
        let mut img = self.clone();
        for (i,s) in spacing.iter().enumerate() {
            if s.is_finite() && *s > 0.0 {
                let scale = *s / self.spacing[i];
                img.spacing[i] = *s;
                if let Some(hdr) = img.header.as_mut() {
                    for row in 0..3 { hdr.srow[row][i] *= scale as f32 }
                }
            }
        }
        img
    }

    /// single line summary
    pub fn description (&self)->String {
        let sp: Vec<f64> = self.spacing.iter().map( |s| (s * 1000.0).round() / 1000.0).collect();
        format!("{} dim={:?}, sp={:?}, type={}", self.filename.as_deref().unwrap_or(""), self.dimensions(), sp, self.voxel_type())
    }

    pub(crate) fn set_header (&mut self, header: Option<NiftiHeader>) {
        self.header = header;
    }
}

impl fmt::Display for BisImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}", self.description())
    }
}
