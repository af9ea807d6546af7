use std::fmt;
use std::str::FromStr;

use ebcloud_core::{CodecConfig, CodecError, ErrorMetric, PointCloud, Result};

use crate::{axis, hybrid, lossless, octree};

/// A compression method. The tag byte leading every blob identifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Lossless Huffman over the quantized coordinate bytes.
    Huffman,
    EbHcAxis,
    EbHcL2,
    EbOctreeAxis,
    EbOctreeL2,
    EbHc3dAxis,
    EbHc3dL2,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Huffman,
        Method::EbHcAxis,
        Method::EbHcL2,
        Method::EbOctreeAxis,
        Method::EbOctreeL2,
        Method::EbHc3dAxis,
        Method::EbHc3dL2,
    ];

    pub fn tag(self) -> u8 {
        match self {
            Method::Huffman => 1,
            Method::EbHcAxis => 2,
            Method::EbHcL2 => 3,
            Method::EbOctreeAxis => 4,
            Method::EbOctreeL2 => 5,
            Method::EbHc3dAxis => 6,
            Method::EbHc3dL2 => 7,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.tag() == tag)
    }

    /// Metric the method bounds, `None` for the lossless baseline.
    pub fn metric(self) -> Option<ErrorMetric> {
        match self {
            Method::Huffman => None,
            Method::EbHcAxis | Method::EbOctreeAxis | Method::EbHc3dAxis => {
                Some(ErrorMetric::Axis)
            }
            Method::EbHcL2 | Method::EbOctreeL2 | Method::EbHc3dL2 => Some(ErrorMetric::L2),
        }
    }

    pub fn eb_hc(metric: ErrorMetric) -> Self {
        match metric {
            ErrorMetric::Axis => Method::EbHcAxis,
            ErrorMetric::L2 => Method::EbHcL2,
        }
    }

    pub fn eb_octree(metric: ErrorMetric) -> Self {
        match metric {
            ErrorMetric::Axis => Method::EbOctreeAxis,
            ErrorMetric::L2 => Method::EbOctreeL2,
        }
    }

    pub fn eb_hc_3d(metric: ErrorMetric) -> Self {
        match metric {
            ErrorMetric::Axis => Method::EbHc3dAxis,
            ErrorMetric::L2 => Method::EbHc3dL2,
        }
    }

    pub fn is_lossless(self) -> bool {
        self.metric().is_none()
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Huffman => "Huffman",
            Method::EbHcAxis => "EB-HC(Axis)",
            Method::EbHcL2 => "EB-HC(L2)",
            Method::EbOctreeAxis => "EB-Octree(Axis)",
            Method::EbOctreeL2 => "EB-Octree(L2)",
            Method::EbHc3dAxis => "EB-HC-3D(Axis)",
            Method::EbHc3dL2 => "EB-HC-3D(L2)",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = CodecError;

    /// Accepts display names (`EB-Octree(L2)`) and kebab-case identifiers
    /// (`eb-octree-l2`, `ebhc3d-axis`), case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let method = match key.as_str() {
            "huffman" | "lossless" => Method::Huffman,
            "ebhcaxis" => Method::EbHcAxis,
            "ebhcl2" => Method::EbHcL2,
            "eboctreeaxis" => Method::EbOctreeAxis,
            "eboctreel2" => Method::EbOctreeL2,
            "ebhc3daxis" => Method::EbHc3dAxis,
            "ebhc3dl2" => Method::EbHc3dL2,
            _ => {
                return Err(CodecError::invalid_input(format!(
                    "unknown compression method {:?}",
                    s
                )))
            }
        };
        Ok(method)
    }
}

/// Compress `cloud` with `method`.
pub fn compress(cloud: &PointCloud, method: Method, config: &CodecConfig) -> Result<Vec<u8>> {
    match method {
        Method::Huffman => lossless::compress(cloud, config),
        Method::EbHcAxis => axis::compress(cloud, ErrorMetric::Axis, config),
        Method::EbHcL2 => axis::compress(cloud, ErrorMetric::L2, config),
        Method::EbOctreeAxis => octree::compress(cloud, ErrorMetric::Axis, config),
        Method::EbOctreeL2 => octree::compress(cloud, ErrorMetric::L2, config),
        Method::EbHc3dAxis => hybrid::compress(cloud, ErrorMetric::Axis, config),
        Method::EbHc3dL2 => hybrid::compress(cloud, ErrorMetric::L2, config),
    }
}

/// Method a blob was written with, `None` for an empty slice.
pub fn blob_method(blob: &[u8]) -> Result<Option<Method>> {
    match blob.first() {
        None => Ok(None),
        Some(&tag) => Method::from_tag(tag)
            .map(Some)
            .ok_or_else(|| CodecError::malformed(format!("unknown method tag {}", tag))),
    }
}

/// Decode any blob produced by [`compress`]. An empty slice is an empty cloud.
pub fn decompress(blob: &[u8]) -> Result<PointCloud> {
    let Some(method) = blob_method(blob)? else {
        return Ok(PointCloud::new());
    };
    match method {
        Method::Huffman => lossless::decompress(blob),
        Method::EbHcAxis | Method::EbHcL2 => axis::decompress(blob),
        Method::EbOctreeAxis | Method::EbOctreeL2 => octree::decompress(blob),
        Method::EbHc3dAxis | Method::EbHc3dL2 => hybrid::decompress(blob),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique_and_roundtrip() {
        for method in Method::ALL {
            assert_eq!(Method::from_tag(method.tag()), Some(method));
        }
        assert_eq!(Method::from_tag(0), None);
        assert_eq!(Method::from_tag(8), None);
    }

    #[test]
    fn parses_names_and_identifiers() {
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>().unwrap(), method);
        }
        assert_eq!("eb-octree-l2".parse::<Method>().unwrap(), Method::EbOctreeL2);
        assert_eq!("EBHC3D_axis".parse::<Method>().unwrap(), Method::EbHc3dAxis);
        assert!("octree".parse::<Method>().is_err());
    }

    #[test]
    fn metric_families() {
        assert!(Method::Huffman.is_lossless());
        assert_eq!(Method::eb_octree(ErrorMetric::L2), Method::EbOctreeL2);
        assert_eq!(Method::eb_hc_3d(ErrorMetric::Axis).metric(), Some(ErrorMetric::Axis));
        assert_eq!(Method::eb_hc(ErrorMetric::L2).metric(), Some(ErrorMetric::L2));
    }

    #[test]
    fn empty_slice_is_empty_cloud() {
        assert!(decompress(&[]).unwrap().is_empty());
    }

    #[test]
    fn unknown_tag_is_malformed() {
        assert!(matches!(
            decompress(&[0xEE, 1, 2, 3]),
            Err(CodecError::MalformedBlob(_))
        ));
    }
}
