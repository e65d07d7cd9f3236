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
use clap::Parser;
use bis_image::{BisImage, CompareMetric, compare_images};

#[derive(Parser, Debug)]
#[command(version, about = "compare two images and report their deviation")]
struct Args {
    /// comparison metric (maxabs or cc)
    #[arg(short, long, default_value = "maxabs")]
    metric: String,

    /// deviation threshold for pass/fail
    #[arg(short, long, default_value_t = 0.01)]
    threshold: f64,

    /// filename of first image
    file1: String,

    /// filename of second image
    file2: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let metric: CompareMetric = args.metric.parse()?;

    let img1 = BisImage::open( &args.file1)?;
    let img2 = BisImage::open( &args.file2)?;
    let res = compare_images( &img1, &img2, metric)?;

    if res.passes( args.threshold) {
        println!("++++ images match: deviation ({}) {} < {}", res.metric, res.value, args.threshold);
        Ok(())
    } else {
        println!("---- images differ: deviation ({}) {} >= {}", res.metric, res.value, args.threshold);
        std::process::exit(1);
    }
}
