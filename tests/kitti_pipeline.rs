use ebcloud_codec::{blob_method, compress, decompress, Method};
use ebcloud_core::{CodecConfig, PointCloud};
use ebcloud_io::{read_blob, read_kitti_bin, write_blob, write_kitti_bin, RECORD_SIZE};
use ebcloud_metrics::reconstruction_error;
use rand::prelude::*;
use tempfile::NamedTempFile;

/// A scan-like cloud: concentric rings around the sensor with intensity.
fn ring_scan(seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cloud = PointCloud::new();
    let mut intensity = Vec::new();
    for ring in 0..16 {
        let radius = 4.0 + ring as f32 * 1.5;
        let z = -1.7 + ring as f32 * 0.05;
        for step in 0..360 {
            let theta = (step as f32).to_radians();
            let jitter = rng.gen_range(-0.01f32..0.01);
            cloud.push([
                (radius + jitter) * theta.cos(),
                (radius + jitter) * theta.sin(),
                z,
            ]);
            intensity.push(rng.gen_range(0.0f32..1.0));
        }
    }
    cloud.intensity = Some(intensity);
    cloud
}

#[test]
fn scan_file_roundtrip() {
    let scan = ring_scan(1);
    let tmp = NamedTempFile::new().unwrap();
    write_kitti_bin(tmp.path(), &scan).unwrap();
    assert_eq!(
        std::fs::metadata(tmp.path()).unwrap().len() as usize,
        scan.len() * RECORD_SIZE
    );
    let loaded = read_kitti_bin(tmp.path()).unwrap();
    assert_eq!(loaded, scan);
}

#[test]
fn ragged_scan_file_loads_as_empty() {
    let tmp = NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), [0u8; RECORD_SIZE * 3 + 5]).unwrap();
    assert!(read_kitti_bin(tmp.path()).unwrap().is_empty());
}

#[test]
fn scan_to_blob_file_and_back() {
    let scan = ring_scan(2);
    let scan_file = NamedTempFile::new().unwrap();
    write_kitti_bin(scan_file.path(), &scan).unwrap();
    let loaded = read_kitti_bin(scan_file.path()).unwrap();

    let config = CodecConfig::with_error_bound_cm(2.0).unwrap();
    for method in Method::ALL {
        let blob = compress(&loaded, method, &config).unwrap();
        let blob_file = NamedTempFile::new().unwrap();
        write_blob(blob_file.path(), &blob).unwrap();

        let stored = read_blob(blob_file.path()).unwrap();
        assert_eq!(blob_method(&stored).unwrap(), Some(method));
        let decoded = decompress(&stored).unwrap();
        assert!(decoded.intensity.is_none());

        let report = reconstruction_error(&loaded, &decoded, 0.1);
        let max = match method.metric() {
            Some(metric) => report.max_error(metric),
            None => report.max_axis,
        };
        assert!(max <= 0.02 + 0.001, "{}: {}", method, max);
    }
}
