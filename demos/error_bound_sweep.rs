//! Sweep the error bound on a synthetic street scene and show how size and
//! fidelity trade off for each lossy method.

use std::error::Error;

use ebcloud::{
    compress, compression_ratio, decompress, reconstruction_error, CodecConfig, Method, PointCloud,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BOUNDS_CM: [f64; 7] = [0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 20.0];

fn street_scene(seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pts = Vec::with_capacity(60_000);
    // Road surface
    for _ in 0..40_000 {
        pts.push([
            rng.gen_range(-30.0f32..30.0),
            rng.gen_range(-8.0f32..8.0),
            -1.7 + rng.gen_range(-0.02f32..0.02),
        ]);
    }
    // Building facades either side
    for _ in 0..20_000 {
        let side = if rng.gen_bool(0.5) { 9.0 } else { -9.0 };
        pts.push([
            rng.gen_range(-30.0f32..30.0),
            side + rng.gen_range(-0.05f32..0.05),
            rng.gen_range(-1.7f32..6.0),
        ]);
    }
    PointCloud::from_points(&pts)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cloud = street_scene(7);
    log::info!("synthetic scene with {} points", cloud.len());

    println!("{:<18} {:>6} {:>9} {:>10} {:>10}", "method", "cm", "ratio", "max_err", "chamfer");
    for method in Method::ALL.into_iter().filter(|m| !m.is_lossless()) {
        let Some(metric) = method.metric() else { continue };
        for cm in BOUNDS_CM {
            let config = CodecConfig::with_error_bound_cm(cm)?;
            let blob = compress(&cloud, method, &config)?;
            let decoded = decompress(&blob)?;
            let report = reconstruction_error(&cloud, &decoded, 0.1);
            println!(
                "{:<18} {:>6.2} {:>9.4} {:>10.5} {:>10.6}",
                method.name(),
                cm,
                compression_ratio(blob.len(), cloud.len()),
                report.max_error(metric),
                report.chamfer
            );
        }
    }
    Ok(())
}
