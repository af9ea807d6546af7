//! Error-bound conformance: every lossy method keeps each original point
//! within the configured bound of the reconstruction, up to one
//! quantization step.

use ebcloud_codec::{compress, decompress, Method};
use ebcloud_core::{CodecConfig, ErrorBound, PointCloud};
use ebcloud_metrics::reconstruction_error;
use rand::prelude::*;

fn uniform_cloud(n: usize, extent: f32, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let pts: Vec<[f32; 3]> = (0..n)
        .map(|_| {
            [
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent..extent),
                rng.gen_range(-extent * 0.1..extent * 0.1),
            ]
        })
        .collect();
    PointCloud::from_points(&pts)
}

/// Dense blobs around a few centres, like returns off nearby objects.
fn clustered_cloud(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let centres = [[5.0f32, 2.0, 0.5], [-12.0, 7.5, 1.0], [30.0, -4.0, -1.5]];
    let pts: Vec<[f32; 3]> = (0..n)
        .map(|i| {
            let c = centres[i % centres.len()];
            [
                c[0] + rng.gen_range(-0.3f32..0.3),
                c[1] + rng.gen_range(-0.3f32..0.3),
                c[2] + rng.gen_range(-0.3f32..0.3),
            ]
        })
        .collect();
    PointCloud::from_points(&pts)
}

fn assert_within_bound(cloud: &PointCloud, method: Method, cm: f64) {
    let config = CodecConfig {
        error_bound: ErrorBound::from_cm(cm).unwrap(),
        ..CodecConfig::default()
    };
    let blob = compress(cloud, method, &config).unwrap();
    let decoded = decompress(&blob).unwrap();
    assert!(!decoded.is_empty(), "{} produced no points", method);

    let metric = method.metric().unwrap();
    let slack = 1.0 / config.scale_factor as f64;
    let report = reconstruction_error(cloud, &decoded, 0.1);
    let max = report.max_error(metric);
    assert!(
        max <= config.error_bound.meters() + slack,
        "{} at {} cm: max error {} exceeds bound",
        method,
        cm,
        max
    );
}

#[test]
fn lossy_methods_respect_bound_on_uniform_cloud() {
    let cloud = uniform_cloud(3000, 20.0, 7);
    for method in Method::ALL.into_iter().filter(|m| !m.is_lossless()) {
        for cm in [1.0, 5.0, 10.0] {
            assert_within_bound(&cloud, method, cm);
        }
    }
}

#[test]
fn lossy_methods_respect_bound_on_clustered_cloud() {
    let cloud = clustered_cloud(3000, 11);
    for method in Method::ALL.into_iter().filter(|m| !m.is_lossless()) {
        for cm in [0.5, 2.0, 20.0] {
            assert_within_bound(&cloud, method, cm);
        }
    }
}

#[test]
fn eb_hc_keeps_point_order_and_count() {
    let cloud = uniform_cloud(500, 10.0, 3);
    let config = CodecConfig::with_error_bound_cm(5.0).unwrap();
    for method in [Method::EbHcAxis, Method::EbHcL2] {
        let decoded = decompress(&compress(&cloud, method, &config).unwrap()).unwrap();
        assert_eq!(decoded.len(), cloud.len());
        let metric = method.metric().unwrap();
        for (p, q) in cloud.iter_points().zip(decoded.iter_points()) {
            let d = metric.deviation([
                p[0] as f64 - q[0] as f64,
                p[1] as f64 - q[1] as f64,
                p[2] as f64 - q[2] as f64,
            ]);
            assert!(d <= 0.05 + 0.001, "{}: {} > bound", method, d);
        }
    }
}

#[test]
fn eb_hc_3d_keeps_every_point() {
    let cloud = clustered_cloud(900, 5);
    let config = CodecConfig::with_error_bound_cm(2.0).unwrap();
    for method in [Method::EbHc3dAxis, Method::EbHc3dL2] {
        let decoded = decompress(&compress(&cloud, method, &config).unwrap()).unwrap();
        assert_eq!(decoded.len(), cloud.len());
    }
}

#[test]
fn eb_octree_never_emits_more_points_than_it_read() {
    let cloud = clustered_cloud(2000, 17);
    let config = CodecConfig::with_error_bound_cm(10.0).unwrap();
    for method in [Method::EbOctreeAxis, Method::EbOctreeL2] {
        let decoded = decompress(&compress(&cloud, method, &config).unwrap()).unwrap();
        assert!(decoded.len() < cloud.len());
    }
}

#[test]
fn lossless_baseline_is_exact_to_the_scale_factor() {
    let cloud = uniform_cloud(1000, 50.0, 23);
    let config = CodecConfig::default();
    let decoded = decompress(&compress(&cloud, Method::Huffman, &config).unwrap()).unwrap();
    assert_eq!(decoded.len(), cloud.len());
    for (p, q) in cloud.iter_points().zip(decoded.iter_points()) {
        for axis in 0..3 {
            assert!((p[axis] - q[axis]).abs() <= 0.0005 + 1e-5);
        }
    }
}

#[test]
fn zero_bound_octree_reproduces_quantized_points() {
    let cloud = uniform_cloud(200, 5.0, 29);
    let config = CodecConfig {
        error_bound: ErrorBound::zero(),
        ..CodecConfig::default()
    };
    let decoded = decompress(&compress(&cloud, Method::EbOctreeAxis, &config).unwrap()).unwrap();
    let report = reconstruction_error(&cloud, &decoded, 0.1);
    assert!(report.max_axis <= 0.0005 + 1e-5);
}
