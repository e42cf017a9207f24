// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Frame codec - maps a byte chunk + header to a three-valued 4K image and
//! back, with 2x2-block majority voting on decode.

use image::{Rgba, RgbaImage};

use crate::config::{BLOCK, DATA_BYTES, FRAME_H, FRAME_W, META_BYTES, PAYLOAD_BITS};
use crate::meta::Header;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Result of decoding a single frame's pixels back into bytes.
pub struct DecodedFrame {
    /// `PAYLOAD_BYTES` bytes, LSB-first packed: header followed by data.
    pub bytes: Vec<u8>,
    /// Number of non-RED (data-carrying) blocks seen before the first RED
    /// block, i.e. how many of `bytes`'s bits are meaningful.
    pub data_symbol_count: usize,
    /// Number of blocks whose four pixels did not unanimously agree.
    pub pixel_errors: usize,
}

/// Encode `chunk` (at most `DATA_BYTES`) together with `header` into a
/// `FRAME_W` x `FRAME_H` image. Blocks past the last meaningful bit are
/// painted RED.
pub fn encode_frame(chunk: &[u8], header: &Header) -> RgbaImage {
    assert!(chunk.len() <= DATA_BYTES, "chunk exceeds DATA_BYTES");

    let mut bits = vec![false; PAYLOAD_BITS];
    let header_bytes = header.to_bytes();
    write_bits_lsb_first(&mut bits[0..META_BYTES * 8], &header_bytes);

    let data_start = META_BYTES * 8;
    write_bits_lsb_first(&mut bits[data_start..data_start + chunk.len() * 8], chunk);

    let last = data_start + chunk.len() * 8; // exclusive bound, first non-data index

    let mut img = RgbaImage::new(FRAME_W, FRAME_H);
    let mut w = 0usize;
    let mut x = 0u32;
    while x < FRAME_W {
        let mut y = 0u32;
        while y < FRAME_H {
            let color = if w < last {
                if bits[w] { BLACK } else { WHITE }
            } else {
                RED
            };
            paint_block(&mut img, x, y, color);
            w += 1;
            y += BLOCK;
        }
        x += BLOCK;
    }
    img
}

/// Decode `img` back into packed bytes, tracking pixel errors and where the
/// RED past-end region begins.
pub fn decode_frame(img: &RgbaImage) -> DecodedFrame {
    let mut bits = Vec::with_capacity(PAYLOAD_BITS);
    let mut pixel_errors = 0usize;

    let mut x = 0u32;
    while x < FRAME_W {
        let mut y = 0u32;
        while y < FRAME_H {
            let (red, white, black) = classify_block(img, x, y);
            if red > black && red > white {
                y += BLOCK;
                continue;
            }
            let bit = black >= white;
            let winner = if bit { black } else { white };
            if winner != 4 {
                pixel_errors += 1;
            }
            bits.push(bit);
            y += BLOCK;
        }
        x += BLOCK;
    }

    let data_symbol_count = bits.len();
    let bytes = pack_bits_lsb_first(&bits);
    DecodedFrame {
        bytes,
        data_symbol_count,
        pixel_errors,
    }
}

/// Paint all four pixels of the 2x2 block whose top-left corner is `(x, y)`.
fn paint_block(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>) {
    img.put_pixel(x, y, color);
    img.put_pixel(x + 1, y, color);
    img.put_pixel(x, y + 1, color);
    img.put_pixel(x + 1, y + 1, color);
}

/// Count how many of a block's four pixels classify as RED/WHITE/BLACK using
/// the 8-bit channel majority rule from the frame codec's decode rules.
fn classify_block(img: &RgbaImage, x: u32, y: u32) -> (u32, u32, u32) {
    let mut red = 0;
    let mut white = 0;
    let mut black = 0;
    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        let Rgba([r, g, b, _]) = *img.get_pixel(x + dx, y + dy);
        if r > 128 && g < 128 && b < 128 {
            red += 1;
        } else if r > 128 && g > 128 && b > 128 {
            white += 1;
        } else {
            black += 1;
        }
    }
    (red, white, black)
}

/// Write `bytes`'s bits into `bits`, LSB-first, one `bool` per bit.
fn write_bits_lsb_first(bits: &mut [bool], bytes: &[u8]) {
    debug_assert_eq!(bits.len(), bytes.len() * 8);
    for (i, &byte) in bytes.iter().enumerate() {
        for k in 0..8 {
            bits[i * 8 + k] = (byte >> k) & 1 == 1;
        }
    }
}

/// Pack a bit sequence into bytes, LSB-first. Any trailing partial byte is
/// zero-padded on the high end.
fn pack_bits_lsb_first(bits: &[bool]) -> Vec<u8> {
    let mut out = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PAYLOAD_BYTES;
    use std::path::Path;

    fn header() -> Header {
        Header::build(Path::new("test.bin"), b"x")
    }

    #[test]
    fn empty_chunk_is_all_red_past_header() {
        let h = header();
        let img = encode_frame(&[], &h);
        let decoded = decode_frame(&img);
        assert_eq!(decoded.data_symbol_count, META_BYTES * 8);
    }

    #[test]
    fn full_chunk_has_no_red_blocks() {
        let h = header();
        let chunk = vec![0xFFu8; DATA_BYTES];
        let img = encode_frame(&chunk, &h);
        let decoded = decode_frame(&img);
        assert_eq!(decoded.data_symbol_count, PAYLOAD_BITS);
        assert_eq!(decoded.bytes.len(), PAYLOAD_BYTES);
        assert_eq!(decoded.pixel_errors, 0);
    }

    #[test]
    fn round_trip_recovers_header_and_data() {
        let h = header();
        let chunk = b"hello frame codec".to_vec();
        let img = encode_frame(&chunk, &h);
        let decoded = decode_frame(&img);

        let n_bytes = decoded.data_symbol_count / 8;
        let recovered_header = Header::parse(&decoded.bytes[0..META_BYTES]);
        assert_eq!(recovered_header.filename, h.filename);
        assert_eq!(&decoded.bytes[META_BYTES..n_bytes], chunk.as_slice());
    }

    #[test]
    fn bit_ordering_is_lsb_first() {
        // Byte 0x01 at chunk position 0 -> block 2048 is BLACK (bit 0 = 1),
        // blocks 2049..2055 are WHITE (bits 1..7 = 0).
        let h = header();
        let chunk = [0x01u8];
        let img = encode_frame(&chunk, &h);

        let block_index = META_BYTES * 8; // 2048
        let (x0, y0) = block_coords(block_index);
        assert_eq!(*img.get_pixel(x0, y0), BLACK);

        let (x1, y1) = block_coords(block_index + 7);
        assert_eq!(*img.get_pixel(x1, y1), WHITE);

        // Swapping bit 0 and bit 7 (0x80) flips which end is BLACK.
        let swapped = [0x80u8];
        let img2 = encode_frame(&swapped, &h);
        assert_eq!(*img2.get_pixel(x0, y0), WHITE);
        assert_eq!(*img2.get_pixel(x1, y1), BLACK);
    }

    #[test]
    fn single_pixel_flip_increments_error_but_keeps_bit() {
        let h = header();
        let chunk = vec![0xFFu8; DATA_BYTES];
        let mut img = encode_frame(&chunk, &h);

        // Flip one pixel in an otherwise-unanimous BLACK block.
        let (x, y) = block_coords(3);
        assert_eq!(*img.get_pixel(x, y), BLACK);
        img.put_pixel(x, y, WHITE);

        let decoded = decode_frame(&img);
        assert_eq!(decoded.pixel_errors, 1);
        // Majority is still black -> bit 1 -> byte 0 bit 3 (block index 3 is
        // the 4th header bit) is unaffected in the packed output.
        assert_eq!(decoded.bytes.len(), PAYLOAD_BYTES);
    }

    fn block_coords(block_index: usize) -> (u32, u32) {
        let blocks_per_col = (FRAME_H / BLOCK) as usize;
        let col = block_index / blocks_per_col;
        let row = block_index % blocks_per_col;
        (col as u32 * BLOCK, row as u32 * BLOCK)
    }
}
