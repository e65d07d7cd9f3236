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

//! NIfTI-1 single file (.nii, .nii.gz) reader and writer. We only model the header fields we need
//! to round trip geometry - unmodeled fields are written with their defaults

use std::{fs::File, io::{Read, Write}, path::Path};
use flate2::{read::MultiGzDecoder, write::GzEncoder, Compression};
use ndarray::{Array5, ShapeBuilder};
use serde_json::Value;
use tracing::{debug, warn};
use bis_common::fs::{filepath_contents, full_extension, ensure_parent_dir};
use crate::{BisImage, ImageData, Voxel, VoxelType, N_AXES, errors::{Result, BisImageError, invalid_format, invalid_dimensions}};

pub const NIFTI1_HEADER_SIZE: usize = 348;
pub const NIFTI1_VOX_OFFSET: usize = 352;

const GZIP_MAGIC: [u8;2] = [0x1f, 0x8b];

/// header extension code of our JSON comment list
pub const COMMENT_ECODE: i32 = 4;

// NIfTI-1 datatype codes
const DT_UINT8: i16 = 2;
const DT_INT16: i16 = 4;
const DT_INT32: i16 = 8;
const DT_FLOAT32: i16 = 16;
const DT_FLOAT64: i16 = 64;
const DT_INT8: i16 = 256;
const DT_UINT16: i16 = 512;
const DT_UINT32: i16 = 768;

// units: mm for space, sec for time
const DEFAULT_XYZT_UNITS: u8 = 2 | 8;

pub fn nifti_code (vt: VoxelType)->i16 {
    match vt {
        VoxelType::U8 => DT_UINT8,
        VoxelType::I8 => DT_INT8,
        VoxelType::U16 => DT_UINT16,
        VoxelType::I16 => DT_INT16,
        VoxelType::U32 => DT_UINT32,
        VoxelType::I32 => DT_INT32,
        VoxelType::F32 => DT_FLOAT32,
        VoxelType::F64 => DT_FLOAT64,
    }
}

pub fn voxel_type_of_nifti_code (code: i16)->Option<VoxelType> {
    match code {
        DT_UINT8 => Some(VoxelType::U8),
        DT_INT8 => Some(VoxelType::I8),
        DT_UINT16 => Some(VoxelType::U16),
        DT_INT16 => Some(VoxelType::I16),
        DT_UINT32 => Some(VoxelType::U32),
        DT_INT32 => Some(VoxelType::I32),
        DT_FLOAT32 => Some(VoxelType::F32),
        DT_FLOAT64 => Some(VoxelType::F64),
        _ => None
    }
}

/// the NIfTI-1 header fields we keep with an image
#[derive(Debug,Clone,PartialEq)]
pub struct NiftiHeader {
    pub dim: [i16;8],
    pub pixdim: [f32;8],
    pub datatype: i16,
    pub vox_offset: f32,
    pub scl_slope: f32,
    pub scl_inter: f32,
    pub intent_code: i16,
    pub xyzt_units: u8,
    pub cal_max: f32,
    pub cal_min: f32,
    pub toffset: f32,
    pub descrip: String,
    pub qform_code: i16,
    pub sform_code: i16,
    pub quatern: [f32;3],
    pub qoffset: [f32;3],
    pub srow: [[f32;4];3],
}

impl Default for NiftiHeader {
    fn default()->Self {
        NiftiHeader {
            dim: [3,1,1,1,1,1,1,1],
            pixdim: [1.0;8],
            datatype: DT_UINT8,
            vox_offset: NIFTI1_VOX_OFFSET as f32,
            scl_slope: 0.0,
            scl_inter: 0.0,
            intent_code: 0,
            xyzt_units: DEFAULT_XYZT_UNITS,
            cal_max: 0.0,
            cal_min: 0.0,
            toffset: 0.0,
            descrip: String::new(),
            qform_code: 1,
            sform_code: 1,
            quatern: [0.0;3],
            qoffset: [0.0;3],
            srow: [[1.0,0.0,0.0,0.0], [0.0,1.0,0.0,0.0], [0.0,0.0,1.0,0.0]],
        }
    }
}

struct HeaderReader<'a> {
    bytes: &'a [u8],
    big_endian: bool
}

impl<'a> HeaderReader<'a> {
    fn bytes_at<const N: usize> (&self, off: usize)->[u8;N] {
        let mut a = [0u8;N];
        a.copy_from_slice( &self.bytes[off..off+N]);
        if self.big_endian { a.reverse() }
        a
    }
    fn i16_at (&self, off: usize)->i16 { i16::from_le_bytes( self.bytes_at(off)) }
    fn i32_at (&self, off: usize)->i32 { i32::from_le_bytes( self.bytes_at(off)) }
    fn f32_at (&self, off: usize)->f32 { f32::from_le_bytes( self.bytes_at(off)) }
    fn u8_at (&self, off: usize)->u8 { self.bytes[off] }

    fn string_at (&self, off: usize, len: usize)->String {
        let raw = &self.bytes[off..off+len];
        let end = raw.iter().position( |&b| b == 0).unwrap_or(len);
        String::from_utf8_lossy( &raw[..end]).to_string()
    }
}

fn put_i16 (buf: &mut [u8], off: usize, v: i16) { buf[off..off+2].copy_from_slice( &v.to_le_bytes()) }
fn put_i32 (buf: &mut [u8], off: usize, v: i32) { buf[off..off+4].copy_from_slice( &v.to_le_bytes()) }
fn put_f32 (buf: &mut [u8], off: usize, v: f32) { buf[off..off+4].copy_from_slice( &v.to_le_bytes()) }

impl NiftiHeader {
    /// parse header from the first 348 bytes. Returns the header and whether the file is big endian
    pub fn parse (bytes: &[u8])->Result<(NiftiHeader,bool)> {
        if bytes.len() < NIFTI1_HEADER_SIZE {
            return Err( invalid_format( format!("NIfTI header too short: {} bytes", bytes.len())))
        }

        let le_size = i32::from_le_bytes( [bytes[0], bytes[1], bytes[2], bytes[3]]);
        let big_endian = if le_size == NIFTI1_HEADER_SIZE as i32 {
            false
        } else if i32::from_be_bytes( [bytes[0], bytes[1], bytes[2], bytes[3]]) == NIFTI1_HEADER_SIZE as i32 {
            true
        } else {
            return Err( invalid_format( format!("not a NIfTI-1 header (sizeof_hdr = {le_size})")))
        };

        let magic = &bytes[344..348];
        if magic != b"n+1\0" {
            return Err( invalid_format("only single file NIfTI-1 (n+1) images are supported"))
        }

        let r = HeaderReader { bytes, big_endian };

        let mut dim = [0i16;8];
        for i in 0..8 { dim[i] = r.i16_at( 40 + 2*i) }
        let mut pixdim = [0f32;8];
        for i in 0..8 { pixdim[i] = r.f32_at( 76 + 4*i) }
        let mut srow = [[0f32;4];3];
        for row in 0..3 {
            for col in 0..4 { srow[row][col] = r.f32_at( 280 + 16*row + 4*col) }
        }

        let hdr = NiftiHeader {
            dim,
            pixdim,
            datatype: r.i16_at(70),
            vox_offset: r.f32_at(108),
            scl_slope: r.f32_at(112),
            scl_inter: r.f32_at(116),
            intent_code: r.i16_at(68),
            xyzt_units: r.u8_at(123),
            cal_max: r.f32_at(124),
            cal_min: r.f32_at(128),
            toffset: r.f32_at(136),
            descrip: r.string_at( 148, 80),
            qform_code: r.i16_at(252),
            sform_code: r.i16_at(254),
            quatern: [r.f32_at(256), r.f32_at(260), r.f32_at(264)],
            qoffset: [r.f32_at(268), r.f32_at(272), r.f32_at(276)],
            srow
        };

        if hdr.dim[0] < 1 || hdr.dim[0] > 7 {
            return Err( invalid_format( format!("invalid NIfTI dim[0] = {}", hdr.dim[0])))
        }
        let nd = hdr.dim[0] as usize;
        if let Some(d) = hdr.dim[1..=nd].iter().find( |&&d| d < 1) {
            return Err( invalid_format( format!("invalid NIfTI dimension {} in {:?}", d, &hdr.dim[1..=nd])))
        }

        Ok( (hdr, big_endian) )
    }

    /// serialize into a little endian 348 byte header followed by the 4 byte extension flag block
    /// (not set)
    pub fn to_bytes (&self)->Vec<u8> {
        let mut buf = vec![0u8; NIFTI1_VOX_OFFSET];

        put_i32( &mut buf, 0, NIFTI1_HEADER_SIZE as i32);
        buf[38] = b'r'; // regular
        for i in 0..8 { put_i16( &mut buf, 40 + 2*i, self.dim[i]) }
        put_i16( &mut buf, 68, self.intent_code);
        put_i16( &mut buf, 70, self.datatype);
        put_i16( &mut buf, 72, self.bitpix());
        for i in 0..8 { put_f32( &mut buf, 76 + 4*i, self.pixdim[i]) }
        put_f32( &mut buf, 108, self.vox_offset);
        put_f32( &mut buf, 112, self.scl_slope);
        put_f32( &mut buf, 116, self.scl_inter);
        buf[123] = self.xyzt_units;
        put_f32( &mut buf, 124, self.cal_max);
        put_f32( &mut buf, 128, self.cal_min);
        put_f32( &mut buf, 136, self.toffset);

        let descrip = self.descrip.as_bytes();
        let n = descrip.len().min(79);
        buf[148..148+n].copy_from_slice( &descrip[..n]);

        put_i16( &mut buf, 252, self.qform_code);
        put_i16( &mut buf, 254, self.sform_code);
        for i in 0..3 { put_f32( &mut buf, 256 + 4*i, self.quatern[i]) }
        for i in 0..3 { put_f32( &mut buf, 268 + 4*i, self.qoffset[i]) }
        for row in 0..3 {
            for col in 0..4 { put_f32( &mut buf, 280 + 16*row + 4*col, self.srow[row][col]) }
        }
        buf[344..348].copy_from_slice( b"n+1\0");

        buf
    }

    pub fn bitpix (&self)->i16 {
        voxel_type_of_nifti_code( self.datatype).map( |vt| vt.bits() as i16).unwrap_or(0)
    }

    /// the 5 image dimensions (i,j,k,t,c) - unused NIfTI axes count as 1
    pub fn dimensions (&self)->[usize;N_AXES] {
        let nd = self.dim[0] as usize;
        let mut dims = [1usize;N_AXES];
        for i in 0..N_AXES {
            if i < nd && self.dim[i+1] > 0 { dims[i] = self.dim[i+1] as usize }
        }
        dims
    }

    /// spacing of the 5 image axes. Missing or non-positive pixdims count as 1
    pub fn spacing (&self)->[f64;N_AXES] {
        let mut sp = [1f64;N_AXES];
        for i in 0..N_AXES {
            let p = self.pixdim[i+1].abs() as f64;
            if p.is_finite() && p > 0.0 { sp[i] = p }
        }
        sp
    }

    /// 3x3 rotation of the quaternion representation
    pub fn quatern_rotation (&self)->[[f64;3];3] {
        let [b,c,d] = self.quatern.map( |q| q as f64);
        let a = (1.0 - (b*b + c*c + d*d)).max(0.0).sqrt();

        [
            [a*a + b*b - c*c - d*d, 2.0*(b*c - a*d),       2.0*(b*d + a*c)],
            [2.0*(b*c + a*d),       a*a + c*c - b*b - d*d, 2.0*(c*d - a*b)],
            [2.0*(b*d - a*c),       2.0*(c*d + a*b),       a*a + d*d - c*c - b*b],
        ]
    }

    /// voxel index to world transform (3x4) of the qform
    pub fn qform_matrix (&self)->[[f64;4];3] {
        let r = self.quatern_rotation();
        let qfac = if self.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let sp = self.spacing();
        let scale = [sp[0], sp[1], sp[2] * qfac];

        let mut m = [[0f64;4];3];
        for row in 0..3 {
            for col in 0..3 { m[row][col] = r[row][col] * scale[col] }
            m[row][3] = self.qoffset[row] as f64;
        }
        m
    }

    /// header of a sub-region that starts at voxel `origin` and samples every `stride` voxels.
    /// The qform and sform offsets move to the world position of `origin` and the sform axes are
    /// scaled by the strides. Dimensions and pixdims are set from the image on write
    pub fn shifted (&self, origin: [i64;3], stride: [i64;3])->NiftiHeader {
        let mut hdr = self.clone();
        let o = origin.map( |v| v as f64);

        let q = self.qform_matrix();
        for row in 0..3 {
            let d: f64 = (0..3).map( |col| q[row][col] * o[col]).sum();
            hdr.qoffset[row] = (q[row][3] + d) as f32;
        }

        for row in 0..3 {
            let s = self.srow[row];
            let d: f64 = (0..3).map( |col| s[col] as f64 * o[col]).sum();
            for col in 0..3 { hdr.srow[row][col] = s[col] * stride[col] as f32 }
            hdr.srow[row][3] = (s[3] as f64 + d) as f32;
        }

        hdr
    }

    /// default header for an image that was not read from a NIfTI file
    pub fn for_spacing (spacing: &[f64;N_AXES])->NiftiHeader {
        let mut hdr = NiftiHeader::default();
        for i in 0..N_AXES { hdr.pixdim[i+1] = spacing[i] as f32 }
        for row in 0..3 { hdr.srow[row][row] = spacing[row] as f32 }
        hdr
    }

    /// update dimension, pixdim and datatype fields from the image geometry. NIfTI-1 dimensions
    /// are 16 bit, larger images can't be stored
    fn set_geometry (&mut self, dims: &[usize;N_AXES], spacing: &[f64;N_AXES], vt: VoxelType)->Result<()> {
        if dims.iter().any( |&d| d > i16::MAX as usize) {
            return Err( invalid_dimensions( format!("image dimensions {dims:?} exceed the NIfTI-1 limit of {}", i16::MAX)))
        }

        let nd = if dims[4] > 1 { 5 } else if dims[3] > 1 { 4 } else { 3 };
        self.dim = [nd, 1, 1, 1, 1, 1, 1, 1];
        for i in 0..N_AXES {
            self.dim[i+1] = dims[i] as i16;
            self.pixdim[i+1] = spacing[i] as f32;
        }
        if self.pixdim[0] == 0.0 { self.pixdim[0] = 1.0 }
        self.datatype = nifti_code(vt);
        self.vox_offset = NIFTI1_VOX_OFFSET as f32;
        Ok(())
    }
}

/// read a .nii or .nii.gz file. Gzip compression is detected from the content
pub fn read_nifti_file (path: impl AsRef<Path>)->Result<BisImage> {
    let path = path.as_ref();
    let raw = filepath_contents( &path)?;

    let bytes = if raw.starts_with( &GZIP_MAGIC) {
        let mut buf = Vec::with_capacity( raw.len() * 4);
        MultiGzDecoder::new( raw.as_slice()).read_to_end( &mut buf)?;
        buf
    } else {
        raw
    };

    let img = parse_nifti( &bytes)?;
    debug!("read NIfTI {:?}: {}", path, img.description());
    Ok(img)
}

/// parse in-memory (uncompressed) NIfTI-1 file contents
pub fn parse_nifti (bytes: &[u8])->Result<BisImage> {
    let (hdr, big_endian) = NiftiHeader::parse( bytes)?;

    let vt = voxel_type_of_nifti_code( hdr.datatype)
        .ok_or_else( || BisImageError::UnsupportedVoxelType( format!("NIfTI datatype {}", hdr.datatype)))?;

    let dims = hdr.dimensions();
    let n_bytes = dims.iter().try_fold( vt.size(), |acc,&d| acc.checked_mul(d))
        .ok_or_else( || invalid_format( format!("NIfTI dimensions too large: {dims:?}")))?;
    let offset = hdr.vox_offset.max( NIFTI1_VOX_OFFSET as f32) as usize;

    if bytes.len() < offset + n_bytes {
        return Err( invalid_format( format!("NIfTI data truncated: expected {} bytes, got {}", offset + n_bytes, bytes.len())))
    }
    let voxel_bytes = &bytes[offset..offset+n_bytes];
    let comments = parse_comment_extensions( bytes, offset, big_endian);

    let data = match vt {
        VoxelType::U8 => decode_voxels::<u8>( voxel_bytes, dims, big_endian)?,
        VoxelType::I8 => decode_voxels::<i8>( voxel_bytes, dims, big_endian)?,
        VoxelType::U16 => decode_voxels::<u16>( voxel_bytes, dims, big_endian)?,
        VoxelType::I16 => decode_voxels::<i16>( voxel_bytes, dims, big_endian)?,
        VoxelType::U32 => decode_voxels::<u32>( voxel_bytes, dims, big_endian)?,
        VoxelType::I32 => decode_voxels::<i32>( voxel_bytes, dims, big_endian)?,
        VoxelType::F32 => decode_voxels::<f32>( voxel_bytes, dims, big_endian)?,
        VoxelType::F64 => decode_voxels::<f64>( voxel_bytes, dims, big_endian)?,
    };

    let img = BisImage::new( data, hdr.spacing())?;
    Ok( img.with_header( hdr).with_comments( comments) )
}

/// the JSON comments stored in the header extensions between the header and `vox_offset`.
/// Extensions with other codes or content that is not JSON are skipped
fn parse_comment_extensions (bytes: &[u8], vox_offset: usize, big_endian: bool)->Vec<Value> {
    let mut comments = Vec::new();
    if vox_offset <= NIFTI1_VOX_OFFSET || bytes[NIFTI1_HEADER_SIZE] == 0 {
        return comments
    }

    let r = HeaderReader { bytes, big_endian };
    let mut pos = NIFTI1_VOX_OFFSET;
    while pos + 8 <= vox_offset {
        let esize = r.i32_at( pos);
        let ecode = r.i32_at( pos+4);
        if esize < 8 || pos + esize as usize > vox_offset {
            warn!("corrupt NIfTI header extension at {pos} (esize={esize}), ignoring remaining extensions");
            break
        }

        if ecode == COMMENT_ECODE {
            let data = &bytes[pos+8..pos+esize as usize];
            let end = data.iter().rposition( |&b| b != 0).map_or( 0, |i| i+1);
            match serde_json::from_slice::<Value>( &data[..end]) {
                Ok(Value::Array(list)) => comments.extend( list),
                Ok(v) => comments.push( v),
                Err(e) => debug!("skipping non-JSON header extension: {e}")
            }
        }
        pos += esize as usize;
    }
    comments
}

/// a single header extension with the JSON encoded comment list, padded to 16 bytes. Empty if
/// there are no comments
fn comment_extension (comments: &[Value])->Result<Vec<u8>> {
    if comments.is_empty() {
        return Ok( Vec::new() )
    }

    let data = serde_json::to_vec( comments)?;
    let esize = (8 + data.len()).div_ceil(16) * 16;
    let mut buf = Vec::with_capacity( esize);
    buf.extend_from_slice( &(esize as i32).to_le_bytes());
    buf.extend_from_slice( &COMMENT_ECODE.to_le_bytes());
    buf.extend_from_slice( &data);
    buf.resize( esize, 0);
    Ok(buf)
}

fn decode_voxels<T: Voxel> (bytes: &[u8], dims: [usize;N_AXES], big_endian: bool)->Result<ImageData> {
    let size = T::VOXEL_TYPE.size();
    let values: Vec<T> = bytes.chunks_exact(size).map( |c| T::read_from( c, big_endian)).collect();
    let shape = (dims[0], dims[1], dims[2], dims[3], dims[4]).f(); // NIfTI stores i fastest
    let arr = Array5::from_shape_vec( shape, values)
        .map_err( |e| BisImageError::InvalidDimensions( e.to_string()))?;
    Ok( T::wrap(arr) )
}

/// serialize image into uncompressed NIfTI-1 bytes. Image comments are stored as header extension
pub fn serialize_nifti (img: &BisImage)->Result<Vec<u8>> {
    let mut hdr = img.header().cloned().unwrap_or_else( || NiftiHeader::for_spacing( &img.spacing()));
    hdr.set_geometry( &img.dimensions(), &img.spacing(), img.voxel_type())?;

    let ext = comment_extension( img.comments())?;
    hdr.vox_offset = (NIFTI1_VOX_OFFSET + ext.len()) as f32;

    let mut buf = hdr.to_bytes();
    if !ext.is_empty() {
        buf[NIFTI1_HEADER_SIZE] = 1;
        buf.extend_from_slice( &ext);
    }

    buf.reserve( img.num_voxels() * img.voxel_type().size());
    dispatch!( img.data(), arr => {
        for v in arr.t().iter() { v.append_le( &mut buf) } // column major order
    });
    Ok(buf)
}

/// write image as .nii or (if the path ends in .gz) .nii.gz file
pub fn write_nifti_file (img: &BisImage, path: impl AsRef<Path>)->Result<()> {
    let path = path.as_ref();
    let bytes = serialize_nifti( img)?;
    ensure_parent_dir( path)?;

    let file = File::create( path)?;
    if full_extension( &path).as_deref() == Some("nii.gz") {
        let mut enc = GzEncoder::new( file, Compression::default());
        enc.write_all( &bytes)?;
        enc.finish()?;
    } else {
        let mut file = file;
        file.write_all( &bytes)?;
    }

    debug!("wrote NIfTI {:?}: {}", path, img.description());
    Ok(())
}
