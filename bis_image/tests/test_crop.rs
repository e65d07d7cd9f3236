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
#![allow(unused)]

use ndarray::{Array5, ShapeBuilder};
use bis_common::values::ParamValue;
use bis_image::{BisImage, BisImageError, VoxelType, CropParamObject, CropBounds, AxisRange, NiftiHeader, crop_image, CROP_PARAM_KEYS};

// run with "cargo test test_crop -- --nocapture"

/// voxel value encodes its source position: 1 + i + 10j + 100k + 1000t
fn ramp_image (dims: [usize;5], spacing: [f64;5])->BisImage {
    let arr = Array5::from_shape_fn( (dims[0],dims[1],dims[2],dims[3],dims[4]).f(), |(i,j,k,t,c)| {
        (1 + i + 10*j + 100*k + 1000*t + 5000*c) as i16
    });
    BisImage::from_array( arr, spacing).unwrap()
}

fn params (v: [i64;12])->CropParamObject {
    CropParamObject::new( v.map( ParamValue::from))
}

#[test]
fn test_param_object_keys() {
    let p = params( [0,1,2, 3,4,5, 6,7,8, 9,10,11]);
    let keys: Vec<&str> = p.keys().collect();
    assert_eq!( keys, vec!["i0","i1","di","j0","j1","dj","k0","k1","dk","t0","t1","dt"]);
    assert_eq!( p.len(), 12);
    assert_eq!( p.get("dk"), Some(&ParamValue::Int(8)));
    assert_eq!( p.get("x0"), None);
    println!("params: {p}");
}

#[test]
fn test_crop_inside() {
    let img = ramp_image( [4,5,6,2,1], [0.5,1.0,2.0,1.0,1.0]);
    let out = crop_image( &img, &params( [1,3,1, 0,4,2, 2,2,1, 1,1,1]), false).unwrap();

    assert_eq!( out.dimensions(), [3,3,1,1,1]);
    assert_eq!( out.spacing(), [0.5,2.0,2.0,1.0,1.0]);
    assert_eq!( out.voxel_type(), img.voxel_type());

    let arr = out.array::<i16>().unwrap();
    assert_eq!( arr[[0,0,0,0,0]], 1 + 1 + 0 + 200 + 1000);
    assert_eq!( arr[[0,1,0,0,0]], 1 + 1 + 20 + 200 + 1000);
    assert_eq!( arr[[2,2,0,0,0]], 1 + 3 + 40 + 200 + 1000);
}

#[test]
fn test_crop_keeps_components() {
    let img = ramp_image( [3,3,3,1,2], [1.0;5]);
    let out = crop_image( &img, &params( [0,0,1, 1,1,1, 2,2,1, 0,0,1]), false).unwrap();

    assert_eq!( out.dimensions(), [1,1,1,1,2]);
    assert_eq!( out.get_voxel( [0,0,0,0,0]), Some( (1 + 10 + 200) as f64));
    assert_eq!( out.get_voxel( [0,0,0,0,1]), Some( (1 + 10 + 200 + 5000) as f64));
}

#[test]
fn test_crop_pads_outside() {
    let img = ramp_image( [4,2,2,1,1], [1.0;5]);
    let out = crop_image( &img, &params( [-1,4,1, 0,0,1, 0,0,1, 0,0,1]), false).unwrap();

    assert_eq!( out.dimensions(), [6,1,1,1,1]);
    let values: Vec<f64> = (0..6).map( |i| out.get_voxel( [i,0,0,0,0]).unwrap()).collect();
    assert_eq!( values, vec![0.0, 1.0, 2.0, 3.0, 4.0, 0.0]);
}

#[test]
fn test_crop_swapped_bounds_and_stride() {
    let img = ramp_image( [4,2,2,1,1], [1.0;5]);
    let out = crop_image( &img, &params( [3,0,0, 0,1,-2, 1,0,1, 0,0,1]), true).unwrap();

    // i: 0..=3 stride 1, j: 0..=1 stride 1, k: 0..=1
    assert_eq!( out.dimensions(), [4,2,2,1,1]);
    assert_eq!( out.spacing(), [1.0;5]);
    assert_eq!( out.data(), img.data());
}

#[test]
fn test_crop_stride_end_not_hit() {
    let img = ramp_image( [10,1,1,1,1], [1.0;5]);
    let out = crop_image( &img, &params( [1,8,3, 0,0,1, 0,0,1, 0,0,1]), false).unwrap();

    assert_eq!( out.dimensions(), [3,1,1,1,1]); // 1, 4, 7
    assert_eq!( out.spacing()[0], 3.0);
    assert_eq!( out.get_voxel( [2,0,0,0,0]), Some(8.0));
}

#[test]
fn test_loosely_typed_params() {
    let img = ramp_image( [4,4,1,1,1], [1.0;5]);

    let mut values: [ParamValue;12] = [0,1,1, 0,1,1, 0,0,1, 0,0,1].map( |v: i64| ParamValue::Text(v.to_string()));
    values[1] = ParamValue::Float(2.0);
    let out = crop_image( &img, &CropParamObject::new( values.clone()), false).unwrap();
    assert_eq!( out.dimensions(), [3,2,1,1,1]);

    values[4] = ParamValue::Text("abc".into());
    match crop_image( &img, &CropParamObject::new( values), false) {
        Err(BisImageError::InvalidParameter(msg)) => assert!( msg.contains("j1")),
        other => panic!("expected invalid parameter error, got {other:?}")
    }
}

#[test]
fn test_region_too_large() {
    let img = ramp_image( [2,2,2,1,1], [1.0;5]);
    let res = crop_image( &img, &params( [0,i64::MAX,1, 0,i64::MAX,1, 0,0,1, 0,0,1]), false);
    assert!( matches!( res, Err(BisImageError::InvalidRegion(_))));
}

#[test]
fn test_region_byte_limit() {
    // 2^30 voxels are fine as u8 but exceed the byte limit as f64
    let img = BisImage::zeros( VoxelType::F64, [2,2,2,1,1], [1.0;5]).unwrap();
    let res = crop_image( &img, &params( [0,(1<<16)-1,1, 0,(1<<14)-1,1, 0,0,1, 0,0,1]), false);
    match res {
        Err(BisImageError::InvalidRegion(msg)) => assert!( msg.contains("double")),
        other => panic!("expected invalid region error, got {:?}", other.map( |img| img.dimensions()))
    }
}

#[test]
fn test_crop_shifts_header_origin() {
    let img = ramp_image( [8,8,8,1,1], [2.0,2.0,2.0,1.0,1.0]);
    let img = img.with_header( NiftiHeader::for_spacing( &[2.0,2.0,2.0,1.0,1.0]));

    let out = crop_image( &img, &params( [1,7,2, 2,7,1, 3,7,1, 0,0,1]), false).unwrap();
    let hdr = out.header().unwrap();

    assert_eq!( hdr.srow[0], [4.0, 0.0, 0.0, 2.0]);
    assert_eq!( hdr.srow[1], [0.0, 2.0, 0.0, 4.0]);
    assert_eq!( hdr.srow[2], [0.0, 0.0, 2.0, 6.0]);
    assert_eq!( hdr.qoffset, [2.0, 4.0, 6.0]);
    assert_eq!( out.spacing()[0], 4.0);
}

#[test]
fn test_axis_range() {
    let r = AxisRange::new( 5, 1, 0).normalized();
    assert_eq!( r, AxisRange::new( 1, 5, 1));
    assert_eq!( r.extent(), 5);
    assert_eq!( r.source_index( 4, 6), Some(5));
    assert_eq!( r.source_index( 4, 5), None);
    assert!( r.is_within(6));
    assert!( !r.is_within(5));
    assert!( !AxisRange::new( -1, 3, 1).is_within(10));
}
