//! Common `FrameSource` instance loader.

use log::*;
use std::io::{BufReader, Read};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use zonewatch::prelude::v1::*;

pub mod sequence;
pub mod stream;

pub use sequence::ImageSequence;
pub use stream::{write_frame, FrameStream};

/// Create a frame source depending on the input.
///
/// If the input is a directory, every `.pgm` and `.png` file within it is read in file name
/// order. If the input ends with `.frames`, it will be interpreted as a raw frame stream.
///
/// In frame stream mode, `tcp://` will be interpreted as a TCP network stream rather than a
/// regular file.
pub fn create_source(input: &str) -> AnyResult<Box<dyn FrameSource>> {
    if Path::new(input).is_dir() {
        return Ok(Box::new(ImageSequence::open(input)?));
    }

    if input.ends_with(".frames") || input.starts_with("tcp://") {
        let reader = BufReader::new(open_file(input)?);
        return Ok(Box::new(FrameStream::new(reader)));
    }

    Err(anyhow!("Unsupported input: {input}"))
}

/// Open a file or an input stream.
///
/// `tcp://@:port` listens for a single connection, `tcp://addr:port` connects out.
pub fn open_file(input: &str) -> AnyResult<Box<dyn Read + Send>> {
    if let Some(input) = input.strip_prefix("tcp://") {
        let (addr, port) = input
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid format"))?;
        let port: u16 = str::parse(port)?;

        let stream = if addr == "@" {
            let listener = TcpListener::bind(("0.0.0.0", port))?;
            let (sock, addr) = listener.accept()?;
            info!("Accept {}", addr);
            sock
        } else {
            info!("Connecting to {}", input);
            TcpStream::connect(input)?
        };

        Ok(Box::new(stream))
    } else {
        std::fs::File::open(input)
            .map(|i| Box::new(i) as _)
            .map_err(Into::into)
    }
}
