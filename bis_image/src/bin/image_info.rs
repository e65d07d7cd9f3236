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
use bis_image::BisImage;

#[derive(Parser, Debug)]
#[command(version, about = "print geometry, voxel type and intensity range of image files")]
struct Args {
    /// print NIfTI header fields and comments if present
    #[arg(long)]
    header: bool,

    #[arg(num_args=1..)]
    files: Vec<String>
}

fn main() -> Result<()> {
    let args = Args::parse();

    for file in &args.files {
        let img = BisImage::open( file)?;
        let (min,max) = img.intensity_range();
        println!("{}  range=[{min},{max}]", img.description());

        if args.header {
            if let Some(hdr) = img.header() {
                println!("  qform_code={} sform_code={} qoffset={:?}", hdr.qform_code, hdr.sform_code, hdr.qoffset);
                for row in &hdr.srow { println!("  srow={row:?}") }
            }
            for c in img.comments() { println!("  comment: {c}") }
        }
    }

    Ok(())
}
