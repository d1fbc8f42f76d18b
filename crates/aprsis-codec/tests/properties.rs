//! Property-based tests for the coordinate, base-91 and frame codecs.
//!
//! - base-91 text decodes back to the value it was encoded from
//! - uncompressed coordinate text survives decode then encode unchanged
//! - compressed coordinates stay within one scale step of the input
//! - no frame panics the decoder

use aprsis_codec::coordinate::{self, Axis, LATITUDE_SCALE, LONGITUDE_SCALE};
use aprsis_codec::{base91, decode_frame, Packet};
use proptest::prelude::*;

// 91^4: the range of a four-digit compressed coordinate
const FOUR_DIGITS: u64 = 68_574_961;

// Strategy for DDMM.mmH / DDDMM.mmH text. Zero always encodes as N/E.
fn coordinate_text(axis: Axis) -> impl Strategy<Value = String> {
    let max_degrees = axis.limit() as u32 - 1;
    (0..=max_degrees, 0u32..60, 0u32..100, any::<bool>()).prop_map(
        move |(degrees, minutes, hundredths, negative)| {
            let negative = negative && (degrees, minutes, hundredths) != (0, 0, 0);
            format!(
                "{degrees:0dw$}{minutes:02}.{hundredths:02}{}",
                axis.hemisphere(negative),
                dw = axis.degree_width(),
            )
        },
    )
}

#[test]
fn prop_base91_round_trip() {
    proptest!(|(value in any::<u64>())| {
        let text = base91::encode(value);
        prop_assert_eq!(base91::decode(&text).unwrap(), value);
    });
}

#[test]
fn prop_base91_padded_width() {
    proptest!(|(value in 0..FOUR_DIGITS)| {
        let text = base91::encode_padded(value, 4);
        prop_assert_eq!(text.len(), 4);
        let in_alphabet = text.bytes().all(|b| (b'!'..=b'{').contains(&b));
        prop_assert!(in_alphabet);
        prop_assert_eq!(base91::decode(&text).unwrap(), value);
    });
}

#[test]
fn prop_latitude_text_is_stable() {
    proptest!(|(text in coordinate_text(Axis::Latitude))| {
        let value = coordinate::decode(&text).unwrap();
        prop_assert_eq!(coordinate::encode(value, Axis::Latitude).unwrap(), text);
    });
}

#[test]
fn prop_longitude_text_is_stable() {
    proptest!(|(text in coordinate_text(Axis::Longitude))| {
        let value = coordinate::decode(&text).unwrap();
        prop_assert_eq!(coordinate::encode(value, Axis::Longitude).unwrap(), text);
    });
}

#[test]
fn prop_encode_truncates_toward_zero() {
    proptest!(|(value in -89.999f64..89.999)| {
        let text = coordinate::encode(value, Axis::Latitude).unwrap();
        let back = coordinate::decode(&text).unwrap();
        // within one hundredth of a minute, never further from zero
        prop_assert!((value - back).abs() < 1.0 / 6000.0 + 1e-9);
        prop_assert!(back.abs() <= value.abs() + 1e-9);
    });
}

#[test]
fn prop_compressed_latitude_round_trip() {
    proptest!(|(value in -90.0f64..=90.0)| {
        let code = coordinate::compress_latitude(value).unwrap();
        prop_assert_eq!(code.len(), 4);
        let back = coordinate::decompress_latitude(&code).unwrap();
        prop_assert!((back - value).abs() <= 1.0 / LATITUDE_SCALE);
    });
}

#[test]
fn prop_compressed_longitude_round_trip() {
    proptest!(|(value in -180.0f64..=180.0)| {
        let code = coordinate::compress_longitude(value).unwrap();
        prop_assert_eq!(code.len(), 4);
        let back = coordinate::decompress_longitude(&code).unwrap();
        prop_assert!((back - value).abs() <= 1.0 / LONGITUDE_SCALE);
    });
}

#[test]
fn prop_arbitrary_frames_never_panic() {
    proptest!(|(frame in proptest::collection::vec(any::<u8>(), 0..128))| {
        let has_source = frame.contains(&b'>');
        match decode_frame(frame.clone()) {
            Ok(decoded) => {
                let wire = decoded.packet.to_frame();
                prop_assert_eq!(wire.as_ref(), frame.as_slice());
            }
            Err(err) => {
                prop_assert!(err.is_format_error());
                if !has_source {
                    prop_assert_eq!(err, aprsis_codec::CodecError::MissingSourceDelimiter);
                }
            }
        }
    });
}

#[test]
fn prop_position_frames_decode() {
    proptest!(|(
        lat in coordinate_text(Axis::Latitude),
        lon in coordinate_text(Axis::Longitude),
        comment in "[ -~]{0,20}",
    )| {
        let frame = format!("N0CALL>APRS:!{lat}/{lon}-{comment}");
        let decoded = Packet::decode(frame.into_bytes()).unwrap();
        prop_assert!(decoded.is_clean());
        let position = decoded.packet.position().copied().unwrap();
        prop_assert_eq!(coordinate::encode(position.latitude, Axis::Latitude).unwrap(), lat);
        prop_assert_eq!(coordinate::encode(position.longitude, Axis::Longitude).unwrap(), lon);
    });
}
