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
use serde_json::json;
use bis_common::values::ParamValue;
use bis_image::{
    BisImage, BisImageError, ImageData, VoxelType, NiftiHeader, CropParamObject, crop_image,
    nifti::{self, NIFTI1_VOX_OFFSET, COMMENT_ECODE}, raster
};

// run with "cargo test test_nifti -- --nocapture"

fn test_image ()->BisImage {
    let arr = Array5::from_shape_fn( (5,4,3,2,1).f(), |(i,j,k,t,_)| (i as f32) * 0.5 + (j*10 + k*100 + t*1000) as f32);
    BisImage::from_array( arr, [1.5, 2.0, 2.5, 0.5, 1.0]).unwrap()
}

#[test]
fn test_serialize_layout() {
    let img = test_image();
    let bytes = nifti::serialize_nifti( &img).unwrap();

    assert_eq!( bytes.len(), NIFTI1_VOX_OFFSET + 5*4*3*2*4);
    assert_eq!( i32::from_le_bytes( [bytes[0],bytes[1],bytes[2],bytes[3]]), 348);
    assert_eq!( &bytes[344..348], b"n+1\0");

    // i varies fastest in the file: second voxel is (1,0,0,0)
    let v1 = f32::from_le_bytes( [bytes[356],bytes[357],bytes[358],bytes[359]]);
    assert_eq!( v1, 0.5);
}

#[test]
fn test_nifti_roundtrip() {
    let img = test_image();
    let img1 = nifti::parse_nifti( &nifti::serialize_nifti( &img).unwrap()).unwrap();

    assert_eq!( img1.dimensions(), [5,4,3,2,1]);
    assert_eq!( img1.spacing(), img.spacing());
    assert_eq!( img1.voxel_type(), VoxelType::F32);
    assert_eq!( img1.data(), img.data());
    assert!( img1.header().is_some());
}

#[test]
fn test_nifti_files() {
    let dir = tempfile::tempdir().unwrap();
    let img = test_image();

    for fname in ["plain.nii", "compressed.nii.gz"] {
        let path = dir.path().join( fname);
        img.save( &path).unwrap();

        let img1 = BisImage::open( &path).unwrap();
        println!("{img1}");
        assert_eq!( img1.data(), img.data());
        assert_eq!( img1.spacing(), img.spacing());
        assert!( img1.filename().unwrap().ends_with( fname));
    }

    let plain = std::fs::metadata( dir.path().join("plain.nii")).unwrap().len();
    let compressed = std::fs::metadata( dir.path().join("compressed.nii.gz")).unwrap().len();
    assert!( compressed < plain);
}

#[test]
fn test_header_preserved() {
    let mut hdr = NiftiHeader::for_spacing( &[1.0;5]);
    hdr.descrip = "test volume".into();
    hdr.qoffset = [-10.0, 20.0, 5.0];
    hdr.srow[0][3] = -10.0;

    let img = BisImage::zeros( VoxelType::I16, [3,3,3,1,1], [1.0;5]).unwrap().with_header( hdr.clone());
    let img1 = nifti::parse_nifti( &nifti::serialize_nifti( &img).unwrap()).unwrap();
    let hdr1 = img1.header().unwrap();

    assert_eq!( hdr1.descrip, "test volume");
    assert_eq!( hdr1.qoffset, hdr.qoffset);
    assert_eq!( hdr1.srow, hdr.srow);
    assert_eq!( hdr1.datatype, 4);
    assert_eq!( hdr1.dim[0], 3);
}

#[test]
fn test_big_endian_header() {
    let img = BisImage::zeros( VoxelType::U8, [2,2,1,1,1], [1.0;5]).unwrap();
    let mut bytes = nifti::serialize_nifti( &img).unwrap();

    // flip the fields we read into big endian order
    for (off,len) in [(0usize,4usize)].into_iter()
        .chain( (0..8).map( |i| (40 + 2*i, 2)))
        .chain( [(70,2), (108,4)])
        .chain( (0..8).map( |i| (76 + 4*i, 4))) {
        bytes[off..off+len].reverse();
    }

    let img1 = nifti::parse_nifti( &bytes).unwrap();
    assert_eq!( img1.dimensions(), [2,2,1,1,1]);
    assert_eq!( img1.voxel_type(), VoxelType::U8);
}

#[test]
fn test_invalid_nifti() {
    let res = nifti::parse_nifti( &[0u8; 100]);
    assert!( matches!( res, Err(BisImageError::InvalidImageFormat(_))));

    let img = test_image();
    let bytes = nifti::serialize_nifti( &img).unwrap();
    let res = nifti::parse_nifti( &bytes[..bytes.len()-10]);
    assert!( matches!( res, Err(BisImageError::InvalidImageFormat(_))));
}

#[test]
fn test_raster_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slice.png");

    let arr = Array5::from_shape_fn( (6,4,1,1,1).f(), |(i,j,_,_,_)| (i*40 + j) as u8);
    let img = BisImage::from_array( arr, [1.0;5]).unwrap();
    img.save( &path).unwrap();

    let img1 = BisImage::open( &path).unwrap();
    assert_eq!( img1.dimensions(), [6,4,1,1,1]);
    assert_eq!( img1.get_voxel( [5,3,0,0,0]), Some(203.0));
    assert_eq!( img1.data(), img.data());
}

#[test]
fn test_raster_rejects_volumes() {
    let dir = tempfile::tempdir().unwrap();
    let img = BisImage::zeros( VoxelType::U8, [4,4,2,1,1], [1.0;5]).unwrap();
    assert!( img.save( dir.path().join("volume.png")).is_err());

    let img = BisImage::zeros( VoxelType::F64, [4,4,1,1,1], [1.0;5]).unwrap();
    assert!( matches!( raster::to_dynamic_image( &img), Err(BisImageError::IllegalArgument(_))));
}

#[test]
fn test_spacing_and_range() {
    let img = test_image();
    let img1 = img.clone_with_spacing( [3.0, -1.0, 0.0]);
    assert_eq!( img1.spacing(), [3.0, 2.0, 2.5, 0.5, 1.0]);
    assert_eq!( img1.data(), img.data());

    let (min,max) = img.intensity_range();
    assert_eq!( min, 0.0);
    assert_eq!( max, 2.0 + 30.0 + 200.0 + 1000.0);

    assert!( BisImage::zeros( VoxelType::U8, [0,1,1,1,1], [1.0;5]).is_err());
    assert!( BisImage::zeros( VoxelType::U8, [1,1,1,1,1], [0.0,1.0,1.0,1.0,1.0]).is_err());
}

#[test]
fn test_dimensions_beyond_nifti_limit() {
    // padding crops can produce axes that don't fit into the 16 bit NIfTI dimensions
    let img = BisImage::zeros( VoxelType::U8, [2,1,1,1,1], [1.0;5]).unwrap();
    let p = CropParamObject::new( [0,39999,1, 0,0,1, 0,0,1, 0,0,1].map( |v: i64| ParamValue::Int(v)));
    let out = crop_image( &img, &p, false).unwrap();
    assert_eq!( out.dimensions(), [40000,1,1,1,1]);

    assert!( matches!( nifti::serialize_nifti( &out), Err(BisImageError::InvalidDimensions(_))));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.nii.gz");
    assert!( out.save( &path).is_err());
    assert!( !path.exists());
}

#[test]
fn test_negative_dimension_rejected() {
    let img = BisImage::zeros( VoxelType::U8, [4,2,1,1,1], [1.0;5]).unwrap();
    let mut bytes = nifti::serialize_nifti( &img).unwrap();

    // what a 40000 voxel axis looks like when it is truncated to i16
    bytes[42..44].copy_from_slice( &(-25536i16).to_le_bytes());
    match nifti::parse_nifti( &bytes) {
        Err(BisImageError::InvalidImageFormat(msg)) => assert!( msg.contains("-25536")),
        other => panic!("expected invalid format, got {:?}", other.map( |img| img.dimensions()))
    }

    bytes[42..44].copy_from_slice( &0i16.to_le_bytes());
    assert!( nifti::parse_nifti( &bytes).is_err());
}

#[test]
fn test_comment_extensions() {
    let img = test_image()
        .with_comments( vec![ json!("loaded from brain.nii.gz"), json!({"module": "cropImage", "params": {"i1": 3}}) ]);

    let bytes = nifti::serialize_nifti( &img).unwrap();
    assert_eq!( bytes[348], 1);
    let vox_offset = f32::from_le_bytes( [bytes[108],bytes[109],bytes[110],bytes[111]]) as usize;
    assert!( vox_offset > NIFTI1_VOX_OFFSET);
    assert_eq!( vox_offset % 16, 0);
    assert_eq!( i32::from_le_bytes( [bytes[356],bytes[357],bytes[358],bytes[359]]), COMMENT_ECODE);
    assert_eq!( bytes.len(), vox_offset + 5*4*3*2*4);

    let img1 = nifti::parse_nifti( &bytes).unwrap();
    assert_eq!( img1.comments(), img.comments());
    assert_eq!( img1.data(), img.data());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commented.nii.gz");
    img.save( &path).unwrap();
    let mut img2 = BisImage::open( &path).unwrap();
    assert_eq!( img2.comments().len(), 2);
    assert_eq!( img2.comments()[1]["module"], "cropImage");

    // history is appended to, not replaced
    img2.add_comment( "third");
    let img3 = nifti::parse_nifti( &nifti::serialize_nifti( &img2).unwrap()).unwrap();
    assert_eq!( img3.comments().len(), 3);
    assert_eq!( img3.comments()[2], json!("third"));

    // no comments, no extension
    let plain = nifti::serialize_nifti( &test_image()).unwrap();
    assert_eq!( plain[348], 0);
    assert!( nifti::parse_nifti( &plain).unwrap().comments().is_empty());
}

#[test]
fn test_foreign_extension_skipped() {
    let img = BisImage::zeros( VoxelType::U8, [2,2,1,1,1], [1.0;5]).unwrap();
    let plain = nifti::serialize_nifti( &img).unwrap();

    // splice in a 16 byte extension with an unknown code
    let mut bytes = plain[..NIFTI1_VOX_OFFSET].to_vec();
    bytes[348] = 1;
    bytes[108..112].copy_from_slice( &((NIFTI1_VOX_OFFSET + 16) as f32).to_le_bytes());
    bytes.extend_from_slice( &16i32.to_le_bytes());
    bytes.extend_from_slice( &6i32.to_le_bytes());
    bytes.extend_from_slice( b"opaque\0\0");
    bytes.extend_from_slice( &plain[NIFTI1_VOX_OFFSET..]);

    let img1 = nifti::parse_nifti( &bytes).unwrap();
    assert!( img1.comments().is_empty());
    assert_eq!( img1.data(), img.data());
}
