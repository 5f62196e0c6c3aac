//! MNIST IDX file decoding.
//!
//! Both file kinds start with big-endian `u32` header fields:
//! - images (`*-images.idx3-ubyte`): magic 2051, count, rows, cols, then one byte per pixel
//! - labels (`*-labels.idx1-ubyte`): magic 2049, count, then one byte per label
//!
//! Images become a design matrix: one row per image, a leading bias column of 1.0, then the
//! raw pixel intensities (0-255, not normalized).

use std::fs;
use std::path::Path;

use crate::{Error, Matrix, Result};

pub const IMAGE_MAGIC: u32 = 2051;
pub const LABEL_MAGIC: u32 = 2049;

/// Side length of an MNIST digit.
pub const DIGIT_SIDE: usize = 28;

/// Number of digit classes.
pub const CLASSES: usize = 10;

/// Read an IDX image file into a `(count, 1 + rows * cols)` design matrix.
pub fn read_images(path: impl AsRef<Path>) -> Result<Matrix> {
    let path = path.as_ref();
    log::debug!("reading images from {}", path.display());
    parse_images(&fs::read(path)?)
}

/// Read an IDX label file into a `(count, 1)` matrix.
pub fn read_labels(path: impl AsRef<Path>) -> Result<Matrix> {
    let path = path.as_ref();
    log::debug!("reading labels from {}", path.display());
    parse_labels(&fs::read(path)?)
}

pub fn parse_images(bytes: &[u8]) -> Result<Matrix> {
    let mut offset = 0;
    expect_magic(bytes, &mut offset, IMAGE_MAGIC)?;
    let count = read_be_u32(bytes, &mut offset)? as usize;
    let rows = read_be_u32(bytes, &mut offset)? as usize;
    let cols = read_be_u32(bytes, &mut offset)? as usize;

    let pixels = rows * cols;
    if count == 0 || pixels == 0 {
        return Err(Error::InvalidData(format!(
            "image file declares {count} images of {rows}x{cols}"
        )));
    }
    let total = count.checked_mul(pixels).ok_or_else(|| {
        Error::InvalidData(format!(
            "image file declares {count} images of {rows}x{cols}"
        ))
    })?;
    let body = take(bytes, offset, total)?;

    let width = pixels + 1;
    let mut data = Vec::with_capacity(count * width);
    for image in body.chunks_exact(pixels) {
        data.push(1.0);
        data.extend(image.iter().map(|&p| f64::from(p)));
    }
    Matrix::from_flat(data, width)
}

pub fn parse_labels(bytes: &[u8]) -> Result<Matrix> {
    let mut offset = 0;
    expect_magic(bytes, &mut offset, LABEL_MAGIC)?;
    let count = read_be_u32(bytes, &mut offset)? as usize;
    if count == 0 {
        return Err(Error::InvalidData("label file declares 0 labels".to_owned()));
    }
    let body = take(bytes, offset, count)?;
    Matrix::from_flat(body.iter().map(|&l| f64::from(l)).collect(), 1)
}

/// Divide every pixel by 255, leaving the bias column untouched.
pub fn normalize_pixels(images: &Matrix) -> Result<Matrix> {
    let cols = images.cols();
    let data = images
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, &v)| if i % cols == 0 { v } else { v / 255.0 })
        .collect();
    Matrix::from_flat(data, cols)
}

/// The label line followed by the digit as a 28x28 grid (`*` for intensity > 127).
pub fn render_digit(images: &Matrix, labels: &Matrix, idx: usize) -> Result<String> {
    if idx >= images.rows() || idx >= labels.rows() {
        return Err(Error::IndexOutOfRange(format!(
            "digit {idx} requested from {} images and {} labels",
            images.rows(),
            labels.rows()
        )));
    }
    if images.cols() != DIGIT_SIDE * DIGIT_SIDE + 1 {
        return Err(Error::ShapeMismatch(format!(
            "expected {} columns (bias + 28x28 pixels), got {}",
            DIGIT_SIDE * DIGIT_SIDE + 1,
            images.cols()
        )));
    }

    let pixels = &images.row(idx)[1..];
    let mut out = format!("Label: {}\n", labels.get(idx, 0));
    for line in pixels.chunks_exact(DIGIT_SIDE) {
        out.extend(line.iter().map(|&p| if p > 127.0 { '*' } else { ' ' }));
        out.push('\n');
    }
    Ok(out)
}

fn read_be_u32(bytes: &[u8], offset: &mut usize) -> Result<u32> {
    let field = take(bytes, *offset, 4)?;
    *offset += 4;
    Ok(u32::from_be_bytes([field[0], field[1], field[2], field[3]]))
}

fn expect_magic(bytes: &[u8], offset: &mut usize, expected: u32) -> Result<()> {
    let magic = read_be_u32(bytes, offset)?;
    if magic != expected {
        return Err(Error::InvalidData(format!(
            "bad magic number {magic}, expected {expected}"
        )));
    }
    Ok(())
}

fn take(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.checked_add(len).unwrap_or(usize::MAX);
    bytes.get(offset..end).ok_or_else(|| {
        Error::InvalidData(format!(
            "truncated file: need {len} bytes at offset {offset}, have {}",
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(fields: &[u32]) -> Vec<u8> {
        fields.iter().flat_map(|f| f.to_be_bytes()).collect()
    }

    #[test]
    fn parses_images_with_bias_column() {
        let mut bytes = header(&[IMAGE_MAGIC, 2, 2, 2]);
        bytes.extend_from_slice(&[0, 255, 10, 20, 1, 2, 3, 4]);

        let images = parse_images(&bytes).unwrap();
        assert_eq!(images.shape(), (2, 5));
        assert_eq!(images.row(0), &[1.0, 0.0, 255.0, 10.0, 20.0]);
        assert_eq!(images.row(1), &[1.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn parses_labels() {
        let mut bytes = header(&[LABEL_MAGIC, 3]);
        bytes.extend_from_slice(&[7, 0, 9]);
        let labels = parse_labels(&bytes).unwrap();
        assert_eq!(labels.shape(), (3, 1));
        assert_eq!(labels.as_slice(), &[7.0, 0.0, 9.0]);
    }

    #[test]
    fn rejects_bad_magic_and_truncated_bodies() {
        let mut bytes = header(&[LABEL_MAGIC, 1]);
        bytes.push(3);
        assert!(matches!(parse_images(&bytes), Err(Error::InvalidData(_))));

        let mut bytes = header(&[IMAGE_MAGIC, 2, 2, 2]);
        bytes.extend_from_slice(&[0; 7]);
        assert!(matches!(parse_images(&bytes), Err(Error::InvalidData(_))));

        assert!(matches!(parse_labels(&[0, 0, 8]), Err(Error::InvalidData(_))));
    }

    #[test]
    fn normalize_keeps_bias_column() {
        let mut bytes = header(&[IMAGE_MAGIC, 1, 1, 2]);
        bytes.extend_from_slice(&[255, 51]);
        let images = normalize_pixels(&parse_images(&bytes).unwrap()).unwrap();
        assert_eq!(images.row(0), &[1.0, 1.0, 0.2]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            read_labels("/nonexistent/t10k-labels.idx1-ubyte"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn renders_digit_grid() {
        let side = DIGIT_SIDE * DIGIT_SIDE;
        let mut bytes = header(&[IMAGE_MAGIC, 1, DIGIT_SIDE as u32, DIGIT_SIDE as u32]);
        let mut pixels = vec![0_u8; side];
        pixels[0] = 200;
        pixels[DIGIT_SIDE + 1] = 128;
        pixels[2] = 127;
        bytes.extend_from_slice(&pixels);
        let images = parse_images(&bytes).unwrap();
        let labels = Matrix::from_flat(vec![5.0], 1).unwrap();

        let text = render_digit(&images, &labels, 0).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), DIGIT_SIDE + 1);
        assert_eq!(lines[0], "Label: 5");
        assert!(lines[1].starts_with("*  "));
        assert!(lines[2].starts_with(" *"));

        assert!(matches!(
            render_digit(&images, &labels, 1),
            Err(Error::IndexOutOfRange(_))
        ));
    }
}
