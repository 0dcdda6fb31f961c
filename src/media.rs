//! Opaque metadata decoders for binary media.
//!
//! Both decoders are total: they accept arbitrary bytes and return a
//! best-effort attribute bag. Malformed or unrecognized media yields a
//! bag of `None`s, never an error — absence of an attribute means
//! "unknown", not failure. These bypass the text structuring engine
//! entirely.

use chrono::NaiveDateTime;
use exif::{In, Tag, Value};
use lofty::{AudioFile, FileType, Probe, TaggedFileExt};
use serde::Serialize;

/// EXIF and dimension attributes of an image upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageAttrs {
    pub taken_at: Option<NaiveDateTime>,
    pub camera_make: Option<String>,
    pub camera_model: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub has_gps: Option<bool>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Container/format attributes of an audio upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioAttrs {
    pub duration_s: Option<f64>,
    pub codec: Option<String>,
    pub sample_rate: Option<i64>,
    pub channels: Option<i64>,
}

/// Decode image dimensions and EXIF metadata.
pub fn decode_image(bytes: &[u8]) -> ImageAttrs {
    let mut attrs = ImageAttrs::default();

    if let Ok(size) = imagesize::blob_size(bytes) {
        attrs.width = Some(size.width as i64);
        attrs.height = Some(size.height as i64);
    }

    let mut cursor = std::io::Cursor::new(bytes);
    if let Ok(meta) = exif::Reader::new().read_from_container(&mut cursor) {
        attrs.taken_at = ascii_field(&meta, Tag::DateTimeOriginal)
            .and_then(|s| NaiveDateTime::parse_from_str(&s, "%Y:%m:%d %H:%M:%S").ok());
        attrs.camera_make = ascii_field(&meta, Tag::Make);
        attrs.camera_model = ascii_field(&meta, Tag::Model);

        let lat = gps_coord(&meta, Tag::GPSLatitude, Tag::GPSLatitudeRef);
        let lon = gps_coord(&meta, Tag::GPSLongitude, Tag::GPSLongitudeRef);
        attrs.has_gps = Some(lat.is_some() && lon.is_some());
        attrs.lat = lat;
        attrs.lon = lon;
    }

    attrs
}

/// Decode audio container properties. The declared content type is only
/// used as a format hint when the byte signature is not recognized.
pub fn decode_audio(bytes: &[u8], content_type: &str) -> AudioAttrs {
    let tagged = Probe::new(std::io::Cursor::new(bytes))
        .guess_file_type()
        .ok()
        .and_then(|probe| probe.read().ok())
        .or_else(|| {
            let hint = file_type_hint(content_type)?;
            Probe::new(std::io::Cursor::new(bytes))
                .set_file_type(hint)
                .read()
                .ok()
        });

    let Some(tagged) = tagged else {
        return AudioAttrs::default();
    };

    let props = tagged.properties();
    AudioAttrs {
        duration_s: Some(props.duration().as_secs_f64()),
        codec: Some(format!("{:?}", tagged.file_type())),
        sample_rate: props.sample_rate().map(i64::from),
        channels: props.channels().map(i64::from),
    }
}

fn file_type_hint(content_type: &str) -> Option<FileType> {
    match content_type.to_ascii_lowercase().as_str() {
        "audio/mpeg" | "audio/mp3" => Some(FileType::Mpeg),
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some(FileType::Wav),
        "audio/flac" | "audio/x-flac" => Some(FileType::Flac),
        "audio/ogg" => Some(FileType::Vorbis),
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" => Some(FileType::Mp4),
        _ => None,
    }
}

fn ascii_field(meta: &exif::Exif, tag: Tag) -> Option<String> {
    let field = meta.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts
            .first()
            .map(|raw| {
                String::from_utf8_lossy(raw)
                    .trim_matches('\0')
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Degrees/minutes/seconds rationals to signed decimal degrees.
fn gps_coord(meta: &exif::Exif, tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = meta.get_field(tag, In::PRIMARY)?;
    let Value::Rational(parts) = &field.value else {
        return None;
    };
    if parts.len() < 3 {
        return None;
    }
    let value = parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0;
    if !value.is_finite() {
        return None;
    }
    match ascii_field(meta, ref_tag).as_deref() {
        Some("S") | Some("W") => Some(-value),
        _ => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_decode_to_unknown_image_attrs() {
        let attrs = decode_image(b"definitely not an image");
        assert_eq!(attrs, ImageAttrs::default());
    }

    #[test]
    fn garbage_bytes_decode_to_unknown_audio_attrs() {
        let attrs = decode_audio(b"not audio either", "audio/mpeg");
        assert_eq!(attrs, AudioAttrs::default());
    }

    #[test]
    fn empty_input_never_errors() {
        assert_eq!(decode_image(&[]), ImageAttrs::default());
        assert_eq!(decode_audio(&[], "application/octet-stream"), AudioAttrs::default());
    }

    #[test]
    fn png_header_yields_dimensions_without_exif() {
        // Minimal valid PNG signature + IHDR declaring a 2x3 image.
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D]); // IHDR length
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&2u32.to_be_bytes()); // width
        bytes.extend_from_slice(&3u32.to_be_bytes()); // height
        bytes.extend_from_slice(&[8, 2, 0, 0, 0]); // bit depth etc.
        bytes.extend_from_slice(&[0, 0, 0, 0]); // crc (unchecked by sniffers)

        let attrs = decode_image(&bytes);
        assert_eq!(attrs.width, Some(2));
        assert_eq!(attrs.height, Some(3));
        assert_eq!(attrs.taken_at, None);
        assert_eq!(attrs.has_gps, None);
    }
}
