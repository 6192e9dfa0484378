// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, ensure};
use splash::{Decoder, Encoder, SplashParams};
use splash_cli::pnm;

#[derive(Parser)]
#[command(version)]
struct Opt {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode one or more PPM frames into a splash packet stream.
    Encode {
        /// Raw RGB PPM (P6) frames, encoded in sequence through one context.
        frames: Vec<PathBuf>,

        /// Brush radius, 1..=255.
        #[clap(long, default_value_t = 5)]
        radius: u32,

        /// Pixels-per-frame divisor for frames after the first.
        #[clap(long, default_value_t = 1.0)]
        ppf: f32,

        /// Pixels-per-key-frame divisor for the first frame.
        #[clap(long, default_value_t = 2.0)]
        ppk: f32,

        /// Output packet stream.
        #[clap(short, long)]
        output: PathBuf,
    },
    /// Decode a splash packet stream into one PPM per frame.
    Decode {
        /// Input packet stream written by `encode`.
        input: PathBuf,

        /// Canvas width, same as the encoded frames.
        #[clap(long)]
        width: usize,

        /// Canvas height, same as the encoded frames.
        #[clap(long)]
        height: usize,

        /// Output PPM path prefix; frame N is written to `<prefix>.N.ppm`.
        #[clap(short, long)]
        output: PathBuf,
    },
}

/// Length-prefixed framing for concatenating multiple packets in one
/// file: the wire format itself carries no total-packet-length field
/// (spec §6 header is fixed at 12 bytes), so the CLI adds its own
/// 4-byte little-endian length prefix ahead of each packet.
fn write_framed(writer: &mut impl Write, packet: &[u8]) -> Result<()> {
    writer.write_all(&(packet.len() as u32).to_le_bytes())?;
    writer.write_all(packet)?;
    Ok(())
}

fn read_framed(reader: &mut impl Read) -> Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(len_bytes) as usize;
    let mut packet = vec![0u8; len];
    reader.read_exact(&mut packet)?;
    Ok(Some(packet))
}

fn run_encode(frames: Vec<PathBuf>, radius: u32, ppf: f32, ppk: f32, output: PathBuf) -> Result<()> {
    ensure!(!frames.is_empty(), "encode needs at least one frame");
    let params = SplashParams::new(ppf, ppk, radius).wrap_err("invalid codec parameters")?;

    let out_file = File::create(&output).wrap_err_with(|| format!("creating {output:?}"))?;
    let mut writer = BufWriter::new(out_file);

    let mut encoder: Option<Encoder> = None;
    for path in frames {
        let file = File::open(&path).wrap_err_with(|| format!("reading {path:?}"))?;
        let mut reader = BufReader::new(file);
        let (width, height, rgb) = pnm::read_ppm(&mut reader).wrap_err_with(|| format!("parsing {path:?}"))?;
        let host_buf = pnm::rgb_to_host_buffer(&rgb);
        let target = splash::Image::from_host_buffer(width, height, &host_buf)?;

        let enc = match &mut encoder {
            Some(enc) => enc,
            None => encoder.insert(Encoder::new(width, height, params)?),
        };
        let packet = enc.encode_frame(&target)?;
        write_framed(&mut writer, &packet.bytes)?;
    }
    writer.flush()?;
    Ok(())
}

fn run_decode(input: PathBuf, width: usize, height: usize, output: PathBuf) -> Result<()> {
    let file = File::open(&input).wrap_err_with(|| format!("reading {input:?}"))?;
    let mut reader = BufReader::new(file);

    let mut decoder = Decoder::new(width, height, SplashParams::default())?;
    let mut frame_index = 0usize;
    while let Some(packet) = read_framed(&mut reader)? {
        let frame = decoder.decode_packet(&packet)?;
        let rgb = pnm::host_buffer_to_rgb(&frame.canvas_bytes);

        let frame_path = output.with_extension(format!("{frame_index}.ppm"));
        let out_file = File::create(&frame_path).wrap_err_with(|| format!("creating {frame_path:?}"))?;
        let mut out_writer = BufWriter::new(out_file);
        pnm::write_ppm(&mut out_writer, frame.width, frame.height, &rgb)?;
        out_writer.flush()?;
        frame_index += 1;
    }
    ensure!(frame_index > 0, "no packets found in {input:?}");
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let opt = Opt::parse();
    match opt.command {
        Command::Encode { frames, radius, ppf, ppk, output } => run_encode(frames, radius, ppf, ppk, output),
        Command::Decode { input, width, height, output } => run_decode(input, width, height, output),
    }
}
