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

use std::{fmt, str::FromStr};
use serde::{Serialize,Deserialize};
use crate::{BisImage, errors::{Result, BisImageError, invalid_dimensions}};

/// how to measure the deviation between two images
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum CompareMetric {
    /// maximum absolute voxel difference
    MaxAbs,
    /// 1 - correlation coefficient
    Cc,
}

impl FromStr for CompareMetric {
    type Err = BisImageError;

    fn from_str (s: &str)->Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "maxabs" => Ok(CompareMetric::MaxAbs),
            "cc" => Ok(CompareMetric::Cc),
            other => Err( BisImageError::IllegalArgument( format!("unknown comparison metric {other}")))
        }
    }
}

impl fmt::Display for CompareMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMetric::MaxAbs => write!(f, "maxabs"),
            CompareMetric::Cc => write!(f, "cc"),
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct ImageComparison {
    pub metric: CompareMetric,
    pub value: f64
}

impl ImageComparison {
    /// deviations strictly below the threshold pass
    pub fn passes (&self, threshold: f64)->bool {
        self.value < threshold
    }
}

/// compare two images of identical dimensions
pub fn compare_images (img: &BisImage, other: &BisImage, metric: CompareMetric)->Result<ImageComparison> {
    if img.dimensions() != other.dimensions() {
        return Err( invalid_dimensions( format!("can't compare images of dimensions {:?} and {:?}", img.dimensions(), other.dimensions())))
    }

    let pairs = img.data().iter_f64().zip( other.data().iter_f64());

    let value = match metric {
        CompareMetric::MaxAbs => pairs.fold( 0.0f64, |m,(a,b)| m.max( (a-b).abs())),
        CompareMetric::Cc => 1.0 - correlation( pairs),
    };

    Ok( ImageComparison { metric, value } )
}

/// Pearson correlation. Constant inputs correlate with 1 if they are identical and 0 otherwise
fn correlation (pairs: impl Iterator<Item=(f64,f64)>)->f64 {
    let (mut n, mut sa, mut sb, mut saa, mut sbb, mut sab) = (0f64, 0f64, 0f64, 0f64, 0f64, 0f64);
    let mut identical = true;

    for (a,b) in pairs {
        n += 1.0;
        sa += a; sb += b;
        saa += a*a; sbb += b*b; sab += a*b;
        if a != b { identical = false }
    }
    if n == 0.0 { return 1.0 }

    let cov = sab - sa*sb/n;
    let va = saa - sa*sa/n;
    let vb = sbb - sb*sb/n;

    if va <= 0.0 || vb <= 0.0 {
        if identical { 1.0 } else { 0.0 }
    } else {
        cov / (va*vb).sqrt()
    }
}
