// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use color_eyre::eyre::{Result, ensure, eyre};
use std::io::{BufRead, Write};

/// Reads a binary PPM (`P6`) file into a flat RGB buffer plus its
/// dimensions. Comments (`#` to end of line) are skipped between header
/// tokens, matching the format's usual relaxed parsing.
pub fn read_ppm<R: BufRead>(reader: &mut R) -> Result<(usize, usize, Vec<u8>)> {
    let magic = read_token(reader)?;
    ensure!(magic == "P6", "unsupported PNM magic {magic:?}, expected P6");
    let width: usize = read_token(reader)?.parse()?;
    let height: usize = read_token(reader)?.parse()?;
    let maxval: u32 = read_token(reader)?.parse()?;
    ensure!(maxval == 255, "only 8-bit PPM (maxval 255) is supported, got {maxval}");

    let mut rgb = vec![0u8; width * height * 3];
    reader
        .read_exact(&mut rgb)
        .map_err(|e| eyre!("truncated PPM pixel data: {e}"))?;
    Ok((width, height, rgb))
}

/// Writes a flat RGB buffer as a binary PPM (`P6`) file.
pub fn write_ppm<W: Write>(writer: &mut W, width: usize, height: usize, rgb: &[u8]) -> Result<()> {
    ensure!(rgb.len() == width * height * 3, "rgb buffer size does not match dimensions");
    write!(writer, "P6\n{width} {height}\n255\n")?;
    writer.write_all(rgb)?;
    Ok(())
}

/// Expands a flat 3-byte-per-pixel RGB buffer into the host's 4-byte
/// RGB+padding layout the core `Image` type exchanges at its boundary.
pub fn rgb_to_host_buffer(rgb: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgb.len() / 3 * 4);
    for chunk in rgb.chunks_exact(3) {
        out.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
    }
    out
}

/// Inverse of [`rgb_to_host_buffer`]: drops the padding byte.
pub fn host_buffer_to_rgb(buf: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len() / 4 * 3);
    for chunk in buf.chunks_exact(4) {
        out.extend_from_slice(&chunk[0..3]);
    }
    out
}

fn read_token<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut token = String::new();
    loop {
        let mut byte = [0u8; 1];
        let n = reader.read(&mut byte)?;
        if n == 0 {
            return Err(eyre!("unexpected end of PNM header"));
        }
        let c = byte[0] as char;
        if c == '#' {
            // Skip the rest of the comment line.
            let mut line = String::new();
            reader.read_line(&mut line)?;
            continue;
        }
        if c.is_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(c);
    }
    Ok(token)
}
