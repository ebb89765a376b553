//! Readers for the IDX file format used by the MNIST digit set.
//!
//! Both files start with a big-endian magic number. Image files follow it with the sample
//! count, row count and column count, then one unsigned byte per pixel. Label files
//! follow it with the sample count, then one byte per label.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use ndarray::Array2;

use crate::error::{NetError, Result};

pub const IMAGE_MAGIC: u32 = 0x0000_0803;
pub const LABEL_MAGIC: u32 = 0x0000_0801;

fn read_u32<R: Read>(reader: &mut R, field: &str) -> Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes).map_err(|e| truncated(e, field))?;
    Ok(u32::from_be_bytes(bytes))
}

fn truncated(err: io::Error, what: &str) -> NetError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        NetError::InvalidData(format!("IDX file truncated while reading {}", what))
    } else {
        NetError::from(err)
    }
}

/// Read exactly `len` payload bytes without trusting the header for the allocation size.
fn read_payload<R: Read>(reader: &mut R, len: usize, what: &str) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut payload)?;
    if payload.len() != len {
        return Err(NetError::InvalidData(format!(
            "IDX file truncated while reading {}: expected {} bytes, got {}",
            what,
            len,
            payload.len()
        )));
    }
    Ok(payload)
}

fn check_magic(found: u32, expected: u32) -> Result<()> {
    if found != expected {
        return Err(NetError::InvalidData(format!(
            "bad IDX magic number {:#010x}, expected {:#010x}",
            found, expected
        )));
    }
    Ok(())
}

/// Read an image file into one row of scaled pixels per sample.
pub fn read_idx_images<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let file = File::open(path.as_ref())?;
    read_idx_images_from(BufReader::new(file))
}

/// Read images from any byte source. Pixels are divided by 255 so they land in `[0, 1]`.
pub fn read_idx_images_from<R: Read>(mut reader: R) -> Result<Array2<f64>> {
    check_magic(read_u32(&mut reader, "magic number")?, IMAGE_MAGIC)?;
    let count = read_u32(&mut reader, "image count")? as usize;
    let rows = read_u32(&mut reader, "row count")? as usize;
    let cols = read_u32(&mut reader, "column count")? as usize;
    let (pixels_per_image, total) = rows
        .checked_mul(cols)
        .and_then(|per_image| Some((per_image, per_image.checked_mul(count)?)))
        .ok_or_else(|| {
            NetError::InvalidData(format!(
                "IDX header size {} x {} x {} overflows",
                count, rows, cols
            ))
        })?;

    let pixels = read_payload(&mut reader, total, "pixel data")?;

    let scaled = pixels.into_iter().map(|p| f64::from(p) / 255.0).collect();
    Array2::from_shape_vec((count, pixels_per_image), scaled)
        .map_err(|e| NetError::InvalidData(e.to_string()))
}

/// Read a label file.
pub fn read_idx_labels<P: AsRef<Path>>(path: P) -> Result<Vec<usize>> {
    let file = File::open(path.as_ref())?;
    read_idx_labels_from(BufReader::new(file))
}

pub fn read_idx_labels_from<R: Read>(mut reader: R) -> Result<Vec<usize>> {
    check_magic(read_u32(&mut reader, "magic number")?, LABEL_MAGIC)?;
    let count = read_u32(&mut reader, "label count")? as usize;

    let labels = read_payload(&mut reader, count, "label data")?;
    Ok(labels.into_iter().map(usize::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn image_bytes(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for word in [IMAGE_MAGIC, count, rows, cols] {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes.extend_from_slice(pixels);
        bytes
    }

    fn label_bytes(labels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    #[test]
    fn test_read_images_scales_pixels() {
        let bytes = image_bytes(2, 1, 2, &[0, 255, 51, 102]);
        let images = read_idx_images_from(&bytes[..]).unwrap();

        assert_eq!(images.shape(), &[2, 2]);
        assert_eq!(images[[0, 0]], 0.0);
        assert_eq!(images[[0, 1]], 1.0);
        assert!((images[[1, 0]] - 0.2).abs() < 1e-12);
        assert!((images[[1, 1]] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_read_labels() {
        let labels = read_idx_labels_from(&label_bytes(&[7, 2, 1])[..]).unwrap();
        assert_eq!(labels, vec![7, 2, 1]);
    }

    #[test]
    fn test_wrong_magic() {
        // Label file handed to the image reader
        let result = read_idx_images_from(&label_bytes(&[1, 2])[..]);
        assert!(matches!(result, Err(NetError::InvalidData(_))));

        let result = read_idx_labels_from(&image_bytes(1, 1, 1, &[0])[..]);
        assert!(matches!(result, Err(NetError::InvalidData(_))));
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = image_bytes(2, 2, 2, &[0, 1, 2]);
        let result = read_idx_images_from(&bytes[..]);
        assert!(matches!(result, Err(NetError::InvalidData(_))));

        let mut bytes = label_bytes(&[1, 2, 3]);
        bytes.pop();
        assert!(matches!(read_idx_labels_from(&bytes[..]), Err(NetError::InvalidData(_))));

        assert!(matches!(read_idx_labels_from(&[0u8, 0][..]), Err(NetError::InvalidData(_))));
    }

    #[test]
    fn test_overflowing_header_rejected() {
        let bytes = image_bytes(1, u32::MAX, u32::MAX, &[]);
        let result = std::panic::catch_unwind(|| read_idx_images_from(&bytes[..]));
        assert!(matches!(result, Ok(Err(NetError::InvalidData(_)))));

        let bytes = image_bytes(u32::MAX, u32::MAX, u32::MAX, &[0; 8]);
        assert!(matches!(read_idx_images_from(&bytes[..]), Err(NetError::InvalidData(_))));
    }

    #[test]
    fn test_oversized_header_is_truncation() {
        // Claims 10^12 pixels but carries four; must fail without allocating the claim
        let bytes = image_bytes(1_000_000, 1000, 1000, &[1, 2, 3, 4]);
        assert!(matches!(read_idx_images_from(&bytes[..]), Err(NetError::InvalidData(_))));

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());
        bytes.extend_from_slice(&[1, 2]);
        assert!(matches!(read_idx_labels_from(&bytes[..]), Err(NetError::InvalidData(_))));
    }

    #[test]
    fn test_read_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let images_path = dir.path().join("images.idx3-ubyte");
        let labels_path = dir.path().join("labels.idx1-ubyte");
        File::create(&images_path)
            .unwrap()
            .write_all(&image_bytes(3, 2, 2, &[255; 12]))
            .unwrap();
        File::create(&labels_path)
            .unwrap()
            .write_all(&label_bytes(&[0, 1, 2]))
            .unwrap();

        let dataset = crate::data::Dataset::from_idx(&images_path, &labels_path).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.feature_len(), 4);
        assert!(dataset.features().iter().all(|&p| p == 1.0));
    }

    #[test]
    fn test_count_mismatch_between_files() {
        let dir = tempfile::tempdir().unwrap();
        let images_path = dir.path().join("images");
        let labels_path = dir.path().join("labels");
        std::fs::write(&images_path, image_bytes(2, 1, 1, &[0, 0])).unwrap();
        std::fs::write(&labels_path, label_bytes(&[0])).unwrap();

        let result = crate::data::Dataset::from_idx(&images_path, &labels_path);
        assert!(matches!(result, Err(NetError::InvalidData(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(read_idx_labels("/nonexistent/labels"), Err(NetError::Io(_))));
    }
}
