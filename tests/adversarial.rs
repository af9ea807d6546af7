//! Corrupt and hostile blobs.
//!
//! Decoders must reject these with an error: no panics, no partial clouds.

use ebcloud_codec::{compress, decompress, Method};
use ebcloud_core::{CodecConfig, CodecError, PackerChoice, PointCloud};
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

fn sample_cloud() -> PointCloud {
    let mut rng = StdRng::seed_from_u64(99);
    let pts: Vec<[f32; 3]> = (0..300)
        .map(|_| {
            [
                rng.gen_range(-5.0f32..5.0),
                rng.gen_range(-5.0f32..5.0),
                rng.gen_range(-1.0f32..1.0),
            ]
        })
        .collect();
    PointCloud::from_points(&pts)
}

fn blobs() -> Vec<(Method, Vec<u8>)> {
    let cloud = sample_cloud();
    let mut out = Vec::new();
    for packer in [PackerChoice::Plain, PackerChoice::Zstd] {
        let config = CodecConfig {
            packer,
            ..CodecConfig::with_error_bound_cm(5.0).unwrap()
        };
        for method in Method::ALL {
            if packer == PackerChoice::Zstd && !matches!(method, Method::EbOctreeAxis | Method::EbOctreeL2) {
                continue;
            }
            out.push((method, compress(&cloud, method, &config).unwrap()));
        }
    }
    out
}

#[test]
fn every_truncation_is_rejected() {
    for (method, blob) in blobs() {
        for cut in 1..blob.len() {
            let result = decompress(&blob[..cut]);
            assert!(
                matches!(
                    result,
                    Err(CodecError::DecodeStreamExhausted { .. } | CodecError::MalformedBlob(_))
                ),
                "{} gave {:?} for a blob cut to {} of {} bytes",
                method,
                result.map(|c| c.len()),
                cut,
                blob.len()
            );
        }
    }
}

#[test]
fn trailing_garbage_is_rejected() {
    for (method, mut blob) in blobs() {
        blob.extend_from_slice(&[0xAB, 0xCD]);
        assert!(decompress(&blob).is_err(), "{} ignored trailing bytes", method);
    }
}

#[test]
fn unknown_tag_is_malformed() {
    for tag in [0u8, 8, 42, 255] {
        let err = decompress(&[tag, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedBlob(_)), "tag {}: {:?}", tag, err);
    }
}

#[test]
fn metric_byte_must_match_tag() {
    for (method, mut blob) in blobs() {
        if method.is_lossless() {
            continue;
        }
        blob[1] ^= 1;
        let err = decompress(&blob).unwrap_err();
        assert!(matches!(err, CodecError::MalformedBlob(_)), "{}: {:?}", method, err);
    }
}

#[test]
fn header_only_truncation_reports_exhaustion() {
    for (method, blob) in blobs() {
        let err = decompress(&blob[..2]).unwrap_err();
        assert!(
            matches!(err, CodecError::DecodeStreamExhausted { .. }),
            "{}: {:?}",
            method,
            err
        );
    }
}

#[test]
fn empty_slice_is_an_empty_cloud() {
    assert!(decompress(&[]).unwrap().is_empty());
}

#[test]
fn non_finite_input_is_rejected() {
    let cloud = PointCloud::from_points(&[[0.0, 0.0, 0.0], [f32::NAN, 1.0, 2.0]]);
    let config = CodecConfig::default();
    for method in Method::ALL {
        let err = compress(&cloud, method, &config).unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)), "{}: {:?}", method, err);
    }
}

#[test]
fn coordinates_beyond_i32_range_are_rejected() {
    let cloud = PointCloud::from_points(&[[3.0e6, 0.0, 0.0]]);
    let config = CodecConfig::default();
    for method in [Method::Huffman, Method::EbHcAxis, Method::EbOctreeAxis] {
        let err = compress(&cloud, method, &config).unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)), "{}: {:?}", method, err);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_bytes_after_a_valid_tag_never_panic(
        tag in 1u8..=7,
        body in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        let mut blob = vec![tag];
        blob.extend_from_slice(&body);
        let _ = decompress(&blob);
    }

    #[test]
    fn single_byte_flips_never_panic(index in any::<prop::sample::Index>(), bit in 0u8..8) {
        for (_, mut blob) in blobs() {
            let i = index.index(blob.len());
            blob[i] ^= 1 << bit;
            let _ = decompress(&blob);
        }
    }
}
