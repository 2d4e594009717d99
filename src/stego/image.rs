//! LSB (least significant bit) steganography for images.
//!
//! Hides a byte stream in the LSBs of the R, G, and B channels, scanning
//! pixels in row-major order. The payload is prefixed with a 4-byte
//! big-endian length; bits are written MSB-first within each byte. A pixel
//! contributes exactly 3 bits, and pixels beyond the payload are untouched.
//!
//! All reads and writes go through an unpremultiplied 8-bit RGBA view.
//! Premultiplied color models round channel values during conversion and
//! would corrupt the LSBs. For the same reason the embedded result must be
//! stored losslessly (PNG); JPEG is accepted on the read side only.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

/// Bytes of big-endian length prefix in front of the hidden payload.
const LENGTH_PREFIX: usize = 4;

/// Errors that can occur during embedding or extraction.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("message too large for carrier: need {needed} bits, have {available}")]
    MessageTooLarge { needed: usize, available: usize },

    #[error("no hidden data found in image")]
    NoHiddenData,

    #[error("image decode error: {0}")]
    ImageDecode(String),

    #[error("image encode error: {0}")]
    ImageEncode(String),
}

/// Hides `data` in a copy of `carrier`.
///
/// Fails if the carrier has fewer than `(4 + data.len()) * 8` usable bits.
/// The returned image must be saved in a lossless container.
pub fn embed(carrier: &DynamicImage, data: &[u8]) -> Result<DynamicImage, StegoError> {
    let (width, height) = carrier.dimensions();
    let available = width as usize * height as usize * 3;
    let needed = (LENGTH_PREFIX + data.len()) * 8;
    if needed > available {
        return Err(StegoError::MessageTooLarge { needed, available });
    }

    // fullPayload = [length (32-bit BE)] + [data]
    let mut payload = Vec::with_capacity(LENGTH_PREFIX + data.len());
    payload.extend_from_slice(&(data.len() as u32).to_be_bytes());
    payload.extend_from_slice(data);
    let payload_bits = payload.len() * 8;

    let mut output = carrier.to_rgba8();
    let mut bit_index = 0;

    'pixels: for y in 0..height {
        for x in 0..width {
            if bit_index >= payload_bits {
                break 'pixels;
            }
            let pixel = output.get_pixel_mut(x, y);
            for channel in 0..3 {
                if bit_index >= payload_bits {
                    break;
                }
                let bit = (payload[bit_index / 8] >> (7 - bit_index % 8)) & 1;
                pixel.0[channel] = (pixel.0[channel] & 0xFE) | bit;
                bit_index += 1;
            }
        }
    }

    Ok(DynamicImage::ImageRgba8(output))
}

/// Recovers a byte stream hidden by [`embed`].
///
/// Fails with [`StegoError::NoHiddenData`] when the decoded length prefix is
/// zero or larger than the image could possibly hold.
pub fn extract(stego: &DynamicImage) -> Result<Vec<u8>, StegoError> {
    let rgba = stego.to_rgba8();
    let (width, height) = rgba.dimensions();
    let available = width as usize * height as usize * 3;
    if available < 32 {
        return Err(StegoError::NoHiddenData);
    }

    // pixels() iterates row-major, matching the embed order.
    let mut bits = rgba
        .pixels()
        .flat_map(|pixel| [pixel.0[0] & 1, pixel.0[1] & 1, pixel.0[2] & 1]);

    let mut length = 0u32;
    for _ in 0..32 {
        length = (length << 1) | u32::from(bits.next().expect("capacity checked"));
    }
    let length = length as usize;

    if length == 0 || length * 8 > available - 32 {
        return Err(StegoError::NoHiddenData);
    }

    let mut data = vec![0u8; length];
    for i in 0..length * 8 {
        let bit = bits.next().expect("capacity checked");
        data[i / 8] |= bit << (7 - i % 8);
    }

    Ok(data)
}

/// Decodes an image from raw container bytes (PNG, JPEG, ...).
pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage, StegoError> {
    image::load_from_memory(bytes).map_err(|e| StegoError::ImageDecode(e.to_string()))
}

/// Encodes an image as PNG bytes. PNG is lossless, which embedded LSBs
/// require.
pub fn to_png_bytes(img: &DynamicImage) -> Result<Vec<u8>, StegoError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| StegoError::ImageEncode(e.to_string()))?;
    Ok(bytes)
}
