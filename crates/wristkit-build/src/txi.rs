//! TXI on-device image format
//!
//! # Layout
//!
//! ```text
//! +-------+-------+--------+--------+-------+---------+
//! | magic | width | height | format | flags | payload |
//! | TXI\1 | u16le | u16le  |   u8   |  u8   |   ...   |
//! +-------+-------+--------+--------+-------+---------+
//! ```
//!
//! The payload holds `width * height` pixels, row-major, each encoded per
//! [`PixelFormat`]. With flag bit 0 set the payload is run-length encoded
//! in packets of 1..=128 pixels:
//!
//! - run: header `count - 1` (`0x00..=0x7F`) followed by one pixel
//! - literal: header `0x80 | (count - 1)` followed by `count` pixels

use wristkit_core::{BuildError, BuildResult};

pub const MAGIC: &[u8; 4] = b"TXI\x01";
pub const HEADER_LEN: usize = 10;
pub const FLAG_RLE: u8 = 0x01;

const MAX_PACKET: usize = 128;

/// Pixel encoding of a TXI payload
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// One 8-bit channel
    A8 = 0,
    /// Packed 5-6-5 colour, little-endian u16
    Rgb565 = 1,
    #[default]
    Rgba8888 = 2,
    /// Packed 6-6-6-6 colour and alpha in three bytes, little-endian
    Rgba6666 = 3,
}

impl PixelFormat {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PixelFormat::A8),
            1 => Some(PixelFormat::Rgb565),
            2 => Some(PixelFormat::Rgba8888),
            3 => Some(PixelFormat::Rgba6666),
            _ => None,
        }
    }

    /// Bytes per encoded pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::A8 => 1,
            PixelFormat::Rgb565 => 2,
            PixelFormat::Rgba8888 => 4,
            PixelFormat::Rgba6666 => 3,
        }
    }

    fn pack(&self, [r, g, b, a]: [u8; 4], out: &mut Vec<u8>) {
        match self {
            PixelFormat::A8 => out.push(r),
            PixelFormat::Rgb565 => {
                let value = (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3);
                out.extend_from_slice(&value.to_le_bytes());
            }
            PixelFormat::Rgba8888 => out.extend_from_slice(&[r, g, b, a]),
            PixelFormat::Rgba6666 => {
                let value = (u32::from(r >> 2) << 18)
                    | (u32::from(g >> 2) << 12)
                    | (u32::from(b >> 2) << 6)
                    | u32::from(a >> 2);
                out.extend_from_slice(&value.to_le_bytes()[..3]);
            }
        }
    }

    fn unpack(&self, pixel: &[u8]) -> [u8; 4] {
        match self {
            PixelFormat::A8 => [pixel[0], pixel[0], pixel[0], 0xFF],
            PixelFormat::Rgb565 => {
                let value = u16::from_le_bytes([pixel[0], pixel[1]]);
                [
                    widen5((value >> 11) as u8),
                    widen6(((value >> 5) & 0x3F) as u8),
                    widen5((value & 0x1F) as u8),
                    0xFF,
                ]
            }
            PixelFormat::Rgba8888 => [pixel[0], pixel[1], pixel[2], pixel[3]],
            PixelFormat::Rgba6666 => {
                let value = u32::from_le_bytes([pixel[0], pixel[1], pixel[2], 0]);
                [
                    widen6(((value >> 18) & 0x3F) as u8),
                    widen6(((value >> 12) & 0x3F) as u8),
                    widen6(((value >> 6) & 0x3F) as u8),
                    widen6((value & 0x3F) as u8),
                ]
            }
        }
    }
}

fn widen5(value: u8) -> u8 {
    (value << 3) | (value >> 2)
}

fn widen6(value: u8) -> u8 {
    (value << 2) | (value >> 4)
}

/// Whether to run-length encode the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RleMode {
    Off,
    On,
    /// Encode both ways and keep the smaller
    #[default]
    Auto,
}

/// A decoded TXI image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxiImage {
    pub width: u16,
    pub height: u16,
    pub format: PixelFormat,
    pub rle: bool,
    /// Raw (un-RLE'd) payload in `format`
    pub pixels: Vec<u8>,
}

impl TxiImage {
    /// Expand the payload to RGBA8; lossy formats come back widened
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .chunks_exact(self.format.bytes_per_pixel())
            .flat_map(|pixel| self.format.unpack(pixel))
            .collect()
    }
}

/// Encode RGBA8 pixels as a TXI file.
///
/// For [`PixelFormat::A8`] the red channel is stored, which is the grey
/// level of an expanded greyscale image.
pub fn encode(
    width: u32,
    height: u32,
    format: PixelFormat,
    rgba: &[u8],
    rle: RleMode,
) -> BuildResult<Vec<u8>> {
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(BuildError::Image(format!(
            "image is {width}x{height}, larger than the 65535x65535 maximum"
        )));
    };
    let count = usize::from(w) * usize::from(h);
    if rgba.len() != count * 4 {
        return Err(BuildError::Image(format!(
            "expected {} bytes of RGBA data for {width}x{height}, got {}",
            count * 4,
            rgba.len()
        )));
    }

    let mut raw = Vec::with_capacity(count * format.bytes_per_pixel());
    for pixel in rgba.chunks_exact(4) {
        format.pack([pixel[0], pixel[1], pixel[2], pixel[3]], &mut raw);
    }

    let bpp = format.bytes_per_pixel();
    let (payload, flags) = match rle {
        RleMode::Off => (raw, 0),
        RleMode::On => (rle_encode(&raw, bpp), FLAG_RLE),
        RleMode::Auto => {
            let compressed = rle_encode(&raw, bpp);
            if compressed.len() < raw.len() {
                (compressed, FLAG_RLE)
            } else {
                (raw, 0)
            }
        }
    };

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&w.to_le_bytes());
    out.extend_from_slice(&h.to_le_bytes());
    out.push(format as u8);
    out.push(flags);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a TXI file
pub fn decode(data: &[u8]) -> BuildResult<TxiImage> {
    if data.len() < HEADER_LEN || &data[..4] != MAGIC {
        return Err(BuildError::Image("not a TXI image".to_string()));
    }
    let width = u16::from_le_bytes([data[4], data[5]]);
    let height = u16::from_le_bytes([data[6], data[7]]);
    let format = PixelFormat::from_u8(data[8])
        .ok_or_else(|| BuildError::Image(format!("unknown pixel format {}", data[8])))?;
    let rle = data[9] & FLAG_RLE != 0;

    let bpp = format.bytes_per_pixel();
    let expected = usize::from(width) * usize::from(height) * bpp;
    let payload = &data[HEADER_LEN..];
    let pixels = if rle {
        rle_decode(payload, bpp, expected)?
    } else {
        payload.to_vec()
    };
    if pixels.len() != expected {
        return Err(BuildError::Image(format!(
            "payload holds {} bytes, expected {expected}",
            pixels.len()
        )));
    }

    Ok(TxiImage {
        width,
        height,
        format,
        rle,
        pixels,
    })
}

fn rle_encode(raw: &[u8], bpp: usize) -> Vec<u8> {
    let pixels: Vec<&[u8]> = raw.chunks_exact(bpp).collect();
    let mut out = Vec::with_capacity(raw.len());
    let mut literal_start = 0;
    let mut i = 0;

    let flush_literal = |out: &mut Vec<u8>, from: usize, to: usize| {
        for chunk in pixels[from..to].chunks(MAX_PACKET) {
            out.push(0x80 | (chunk.len() - 1) as u8);
            for pixel in chunk {
                out.extend_from_slice(pixel);
            }
        }
    };

    while i < pixels.len() {
        let run = pixels[i..]
            .iter()
            .take(MAX_PACKET)
            .take_while(|p| **p == pixels[i])
            .count();
        if run >= 2 {
            flush_literal(&mut out, literal_start, i);
            out.push((run - 1) as u8);
            out.extend_from_slice(pixels[i]);
            i += run;
            literal_start = i;
        } else {
            i += 1;
        }
    }
    flush_literal(&mut out, literal_start, pixels.len());
    out
}

fn rle_decode(payload: &[u8], bpp: usize, expected: usize) -> BuildResult<Vec<u8>> {
    let truncated = || BuildError::Image("truncated RLE payload".to_string());
    let mut out = Vec::with_capacity(expected);
    let mut pos = 0;

    while pos < payload.len() {
        let header = payload[pos];
        pos += 1;
        let count = usize::from(header & 0x7F) + 1;
        if header & 0x80 == 0 {
            let pixel = payload.get(pos..pos + bpp).ok_or_else(truncated)?;
            for _ in 0..count {
                out.extend_from_slice(pixel);
            }
            pos += bpp;
        } else {
            let pixels = payload.get(pos..pos + count * bpp).ok_or_else(truncated)?;
            out.extend_from_slice(pixels);
            pos += count * bpp;
        }
        if out.len() > expected {
            return Err(BuildError::Image("RLE payload overruns image".to_string()));
        }
    }
    Ok(out)
}
