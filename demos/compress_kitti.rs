//! Compress one KITTI Velodyne scan with every method and print the results.
//!
//! ```text
//! cargo run --release --example compress_kitti -- 000000.bin [error_bound_cm] [out_dir]
//! ```
//!
//! Set `RUST_LOG=debug` to see per-codec tree and stream statistics.

use std::error::Error;
use std::path::PathBuf;

use ebcloud::io::{read_kitti_bin, write_blob};
use ebcloud::{compress, compression_ratio, decompress, reconstruction_error, CodecConfig, Method};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(scan) = args.next().map(PathBuf::from) else {
        eprintln!("usage: compress_kitti <scan.bin> [error_bound_cm] [out_dir]");
        std::process::exit(2);
    };
    let cm: f64 = match args.next() {
        Some(s) => s.parse()?,
        None => 5.0,
    };
    let out_dir = args.next().map(PathBuf::from);

    let cloud = read_kitti_bin(&scan)?;
    if cloud.is_empty() {
        return Err(format!("{} holds no points", scan.display()).into());
    }
    log::info!("loaded {} points from {}", cloud.len(), scan.display());

    let config = CodecConfig::with_error_bound_cm(cm)?;
    println!(
        "{:<18} {:>10} {:>8} {:>10} {:>10} {:>10} {:>6}",
        "method", "bytes", "ratio", "max_axis", "max_l2", "chamfer", "iou"
    );
    for method in Method::ALL {
        let blob = compress(&cloud, method, &config)?;
        let decoded = decompress(&blob)?;
        let report = reconstruction_error(&cloud, &decoded, 0.1);
        println!(
            "{:<18} {:>10} {:>8.4} {:>10.5} {:>10.5} {:>10.6} {:>6.3}",
            method.name(),
            blob.len(),
            compression_ratio(blob.len(), cloud.len()),
            report.max_axis,
            report.max_l2,
            report.chamfer,
            report.occupancy_iou
        );

        if let Some(dir) = &out_dir {
            let stem = scan.file_stem().and_then(|s| s.to_str()).unwrap_or("scan");
            let path = dir.join(format!("{}.tag{}.ebc", stem, method.tag()));
            write_blob(&path, &blob)?;
        }
    }
    Ok(())
}
