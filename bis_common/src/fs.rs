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

use std::fs::{self,File};
use std::io::{self,Read,Write,ErrorKind};
use std::path::{Path,PathBuf};

use crate::macros::io_error;

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn filename<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_name().and_then(|ostr| ostr.to_str())
}

pub fn extension<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().extension().and_then(|ostr| ostr.to_str())
}

/// like [`extension`] but treats compressed suffixes as part of the extension, i.e.
/// "brain.nii.gz" yields "nii.gz". Returned in lower case
pub fn full_extension<T: AsRef<Path>> (path: &T)->Option<String> {
    let fname = filename(path)?.to_lowercase();
    let ext = extension(path)?.to_lowercase();

    if ext == "gz" {
        let stem = &fname[..fname.len() - 3];
        match stem.rfind('.') {
            Some(idx) => Some( stem[idx+1..].to_string() + ".gz"),
            None => Some(ext)
        }
    } else {
        Some(ext)
    }
}

/// make sure the parent directory of the given file path exists
pub fn ensure_parent_dir (path: impl AsRef<Path>)->Result<()> {
    if let Some(dir) = path.as_ref().parent() {
        if !dir.as_os_str().is_empty() && !dir.is_dir() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

pub fn file_contents_as_string (file: &mut fs::File) -> Result<String> {
    let len = file.metadata()?.len();
    let mut contents = String::with_capacity(len as usize);
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

pub fn filepath_contents_as_string <P: AsRef<Path>> (path: &P) -> Result<String> {
    let mut file = File::open(path)?;
    file_contents_as_string( &mut file)
}

pub fn filepath_contents <P: AsRef<Path>> (path: &P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err( io_error!( ErrorKind::NotFound, "not a regular file {:?}", path))
    }

    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    let mut contents: Vec<u8> = Vec::with_capacity(len as usize);
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// write data to file, creating parent dirs if required
pub fn set_filepath_contents (path: impl AsRef<Path>, data: &[u8])->Result<()> {
    let path = path.as_ref();
    ensure_parent_dir( path)?;
    let mut file = File::create(path)?;
    file.write_all(data)
}
