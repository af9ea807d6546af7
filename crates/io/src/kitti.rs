use ebcloud_core::PointCloud;
use std::fs;
use std::io;
use std::path::Path;

/// Bytes per record: x, y, z, intensity as little-endian `f32`.
pub const RECORD_SIZE: usize = 16;

/// Parses a buffer of KITTI-style Velodyne records.
///
/// A buffer whose length is not a multiple of [`RECORD_SIZE`] is treated as
/// unusable: a warning is logged and an empty cloud returned.
pub fn parse_kitti_records(bytes: &[u8]) -> PointCloud {
    if bytes.len() % RECORD_SIZE != 0 {
        log::warn!(
            "point buffer of {} bytes is not a whole number of {}-byte records, ignoring it",
            bytes.len(),
            RECORD_SIZE
        );
        return PointCloud::new();
    }

    let n = bytes.len() / RECORD_SIZE;
    let mut cloud = PointCloud::with_capacity(n);
    let mut intensity = Vec::with_capacity(n);
    for record in bytes.chunks_exact(RECORD_SIZE) {
        let field = |i: usize| {
            f32::from_le_bytes([record[i], record[i + 1], record[i + 2], record[i + 3]])
        };
        cloud.push([field(0), field(4), field(8)]);
        intensity.push(field(12));
    }
    cloud.intensity = Some(intensity);
    cloud
}

/// Reads a `.bin` scan from disk.
pub fn read_kitti_bin(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let raw = fs::read(path)?;
    Ok(parse_kitti_records(&raw))
}

/// Serializes `cloud` as KITTI records. Missing intensity is written as 0.
pub fn kitti_records(cloud: &PointCloud) -> Vec<u8> {
    let mut buf = Vec::with_capacity(cloud.len() * RECORD_SIZE);
    for i in 0..cloud.len() {
        let intensity = cloud
            .intensity
            .as_ref()
            .and_then(|it| it.get(i).copied())
            .unwrap_or(0.0);
        buf.extend_from_slice(&cloud.x[i].to_le_bytes());
        buf.extend_from_slice(&cloud.y[i].to_le_bytes());
        buf.extend_from_slice(&cloud.z[i].to_le_bytes());
        buf.extend_from_slice(&intensity.to_le_bytes());
    }
    buf
}

pub fn write_kitti_bin(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    fs::write(path, kitti_records(cloud))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::NamedTempFile;

    #[test]
    fn kitti_roundtrip_keeps_intensity() {
        let mut cloud = PointCloud::from_xyz(
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        );
        cloud.intensity = Some(vec![0.1, 0.2, 0.3]);
        let tmp = NamedTempFile::new().unwrap();
        write_kitti_bin(tmp.path(), &cloud).unwrap();
        let loaded = read_kitti_bin(tmp.path()).unwrap();
        assert_eq!(loaded, cloud);
    }

    #[test]
    fn missing_intensity_is_written_as_zero() {
        let cloud = PointCloud::from_points(&[[1.0, 2.0, 3.0]]);
        let bytes = kitti_records(&cloud);
        assert_eq!(bytes.len(), RECORD_SIZE);
        assert_eq!(&bytes[12..], &0.0f32.to_le_bytes());
        let parsed = parse_kitti_records(&bytes);
        assert_eq!(parsed.intensity, Some(vec![0.0]));
    }

    #[test]
    fn ragged_buffer_gives_empty_cloud() {
        let cloud = parse_kitti_records(&[0u8; 17]);
        assert!(cloud.is_empty());
    }

    #[test]
    fn empty_buffer_gives_empty_cloud() {
        let cloud = parse_kitti_records(&[]);
        assert!(cloud.is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_kitti_bin(dir.path().join("nope.bin")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    proptest! {
        #[test]
        fn kitti_roundtrip_is_bit_exact(
            pts in prop::collection::vec(
                (-1000.0f32..1000.0f32, -1000.0f32..1000.0f32, -1000.0f32..1000.0f32, 0.0f32..1.0f32),
                0..200
            )
        ) {
            let mut cloud = PointCloud::from_points(
                &pts.iter().map(|p| [p.0, p.1, p.2]).collect::<Vec<_>>(),
            );
            cloud.intensity = Some(pts.iter().map(|p| p.3).collect());

            let loaded = parse_kitti_records(&kitti_records(&cloud));
            prop_assert_eq!(loaded.len(), cloud.len());
            for i in 0..cloud.len() {
                prop_assert_eq!(loaded.x[i].to_bits(), cloud.x[i].to_bits());
                prop_assert_eq!(loaded.y[i].to_bits(), cloud.y[i].to_bits());
                prop_assert_eq!(loaded.z[i].to_bits(), cloud.z[i].to_bits());
            }
            prop_assert_eq!(loaded.intensity, cloud.intensity);
        }
    }
}
