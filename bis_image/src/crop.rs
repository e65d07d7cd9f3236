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

//! sub-region extraction of volumetric images. This is the routine behind the `cropImage` module:
//! it receives the crop parameters in their loosely typed form and is the only place where they
//! are interpreted

use std::fmt;
use ndarray::{s, Array5, ShapeBuilder};
use tracing::{debug, info};
use bis_common::values::ParamValue;
use crate::{BisImage, ImageData, Voxel, N_AXES, errors::{Result, BisImageError}};

/// crop parameter names in canonical order: start, end and stride for the i, j, k and t axes
pub const CROP_PARAM_KEYS: [&str;12] = ["i0","i1","di", "j0","j1","dj", "k0","k1","dk", "t0","t1","dt"];

/// we don't try to allocate crop results that need more bytes than this
pub const MAX_CROP_BYTES: usize = 1 << 32;

/// the parameter object of a crop call. It holds exactly the twelve crop parameters, in canonical
/// order and with values as they were given (no coercion)
#[derive(Debug,Clone,PartialEq)]
pub struct CropParamObject {
    values: Vec<ParamValue>
}

impl CropParamObject {
    pub fn new (values: [ParamValue;12])->Self {
        CropParamObject { values: values.into() }
    }

    /// build from a key lookup that is called once per crop parameter, in canonical order
    pub fn try_from_lookup<F,E> (mut lookup: F)->std::result::Result<Self,E> where F: FnMut(&'static str)->std::result::Result<ParamValue,E> {
        let mut values = Vec::with_capacity( CROP_PARAM_KEYS.len());
        for key in CROP_PARAM_KEYS {
            values.push( lookup(key)?);
        }
        Ok( CropParamObject { values } )
    }

    pub fn get (&self, key: &str)->Option<&ParamValue> {
        CROP_PARAM_KEYS.iter().position( |k| *k == key).map( |idx| &self.values[idx])
    }

    pub fn keys (&self)->impl Iterator<Item=&'static str> {
        CROP_PARAM_KEYS.into_iter()
    }

    pub fn iter (&self)->impl Iterator<Item=(&'static str,&ParamValue)> {
        CROP_PARAM_KEYS.into_iter().zip( self.values.iter())
    }

    pub fn len (&self)->usize { self.values.len() }
}

impl fmt::Display for CropParamObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{{")?;
        for (i,(k,v)) in self.iter().enumerate() {
            if i > 0 { write!( f, ",")? }
            write!( f, "{k}:{v}")?;
        }
        write!( f, "}}")
    }
}

/// start, end (inclusive) and stride of a single axis
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct AxisRange {
    pub start: i64,
    pub end: i64,
    pub stride: i64,
}

impl AxisRange {
    pub fn new (start: i64, end: i64, stride: i64)->Self {
        AxisRange { start, end, stride }
    }

    /// swap reversed bounds and clamp stride to at least 1
    pub fn normalized (&self)->AxisRange {
        let (start,end) = if self.end < self.start { (self.end, self.start) } else { (self.start, self.end) };
        AxisRange { start, end, stride: self.stride.max(1) }
    }

    /// number of samples along this axis (of the normalized range)
    pub fn extent (&self)->usize {
        let r = self.normalized();
        (r.end.saturating_sub( r.start) / r.stride) as usize + 1
    }

    /// source index of the n-th sample, `None` if it falls outside an axis of length `dim`
    #[inline]
    pub fn source_index (&self, n: usize, dim: usize)->Option<usize> {
        let idx = self.start + n as i64 * self.stride;
        if idx >= 0 && (idx as usize) < dim { Some(idx as usize) } else { None }
    }

    /// does the (normalized) range lie completely within an axis of length `dim`
    pub fn is_within (&self, dim: usize)->bool {
        self.start >= 0 && (self.end as u64) < dim as u64
    }
}

/// the coerced crop parameters for the i, j, k and t axes
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct CropBounds {
    pub axes: [AxisRange;4]
}

impl CropBounds {
    /// coerce the parameter object into integer bounds
    pub fn from_params (params: &CropParamObject)->Result<Self> {
        let mut v = [0i64;12];
        for (i,(key,value)) in params.iter().enumerate() {
            v[i] = value.as_int().ok_or_else( || BisImageError::InvalidParameter( format!("crop parameter {key}={value} is not an integer")))?;
        }

        Ok( CropBounds {
            axes: [
                AxisRange::new( v[0], v[1], v[2]),
                AxisRange::new( v[3], v[4], v[5]),
                AxisRange::new( v[6], v[7], v[8]),
                AxisRange::new( v[9], v[10], v[11]),
            ]
        })
    }

    pub fn normalized (&self)->CropBounds {
        CropBounds { axes: self.axes.map( |a| a.normalized()) }
    }

    /// output dimensions for an input image with `nc` components
    pub fn output_dimensions (&self, nc: usize)->[usize;N_AXES] {
        let a = &self.axes;
        [a[0].extent(), a[1].extent(), a[2].extent(), a[3].extent(), nc]
    }
}

/// crop `image` according to the (loosely typed) parameter object.
///
/// Each axis samples `start, start+stride, ..` up to and including `end`. Reversed bounds are
/// swapped, strides below 1 count as 1 and samples outside of the input are zero, i.e. a crop
/// region can extend (pad) the image. The output spacing is the input spacing times the stride.
/// The `debug` flag reports the crop geometry
pub fn crop_image (image: &BisImage, params: &CropParamObject, debug: bool)->Result<BisImage> {
    let bounds = CropBounds::from_params( params)?;
    crop_with_bounds( image, &bounds, debug)
}

pub fn crop_with_bounds (image: &BisImage, bounds: &CropBounds, debug: bool)->Result<BisImage> {
    let bounds = bounds.normalized();
    let in_dims = image.dimensions();
    let out_dims = bounds.output_dimensions( in_dims[4]);

    let n_bytes = out_dims.iter().try_fold( image.voxel_type().size(), |acc,&d| acc.checked_mul(d));
    match n_bytes {
        Some(n) if n <= MAX_CROP_BYTES => {}
        _ => return Err( BisImageError::InvalidRegion( format!("crop region {out_dims:?} of {} voxels too large", image.voxel_type())))
    }

    if debug {
        info!("crop: input {:?} sp={:?}, bounds {:?} -> output {:?}", in_dims, image.spacing(), bounds.axes, out_dims);
    }

    let data = map_data!( image.data(), arr => crop_array( arr, &bounds));

    let mut spacing = image.spacing();
    for (i,axis) in bounds.axes.iter().enumerate() {
        spacing[i] *= axis.stride as f64;
    }

    let mut out = BisImage::new( data, spacing)?.with_comments( image.comments().to_vec());
    if let Some(hdr) = image.header() {
        let a = &bounds.axes;
        out.set_header( Some( hdr.shifted( [a[0].start, a[1].start, a[2].start], [a[0].stride, a[1].stride, a[2].stride])));
    }

    debug!("cropped image: {}", out.description());
    Ok(out)
}

fn crop_array<T: Voxel> (input: &Array5<T>, bounds: &CropBounds)->Array5<T> {
    let dims = input.shape();
    let [ri,rj,rk,rt] = bounds.axes;

    if bounds.axes.iter().zip( dims.iter()).all( |(r,&d)| r.is_within(d)) {
        let slice = s![
            ri.start as usize ..= ri.end as usize; ri.stride as isize,
            rj.start as usize ..= rj.end as usize; rj.stride as isize,
            rk.start as usize ..= rk.end as usize; rk.stride as isize,
            rt.start as usize ..= rt.end as usize; rt.stride as isize,
            ..
        ];
        input.slice( slice).to_owned()

    } else { // at least partially outside - pad with zeros
        let shape = (ri.extent(), rj.extent(), rk.extent(), rt.extent(), dims[4]).f();
        Array5::from_shape_fn( shape, |(i,j,k,t,c)| {
            match (ri.source_index(i,dims[0]), rj.source_index(j,dims[1]), rk.source_index(k,dims[2]), rt.source_index(t,dims[3])) {
                (Some(si),Some(sj),Some(sk),Some(st)) => input[[si,sj,sk,st,c]],
                _ => T::zero()
            }
        })
    }
}
