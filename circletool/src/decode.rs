use std::io::BufRead;

use circlelib::protocol::{CrcPolicy, Response, FRAME_END, FRAME_START};

use crate::common::print_fields;

#[derive(clap::Args, Debug)]
pub struct DecodeOpts {
    /// Response frames, as text. Read one per line from stdin if none
    /// are given.
    frames: Vec<String>,
    /// Fail frames whose checksum doesn't match.
    #[arg(long)]
    verify_checksum: bool,
}

/// Turn a frame as copied from a log or a terminal back into bytes.
///
/// Start and end markers are optional, either raw or written out as
/// escapes.
pub fn frame_from_text(text: &str) -> Vec<u8> {
    let raw_start = String::from_utf8_lossy(&FRAME_START).into_owned();
    let body = text.trim_end_matches(['\r', '\n']).trim_start();
    let body = body.strip_suffix("\\r\\n").unwrap_or(body);
    let body = body
        .strip_prefix("\\x05\\x05\\x03\\x03")
        .or_else(|| body.strip_prefix(raw_start.as_str()))
        .unwrap_or(body);

    let mut frame = FRAME_START.to_vec();
    frame.extend_from_slice(body.trim().as_bytes());
    frame.extend_from_slice(&FRAME_END);
    frame
}

impl crate::ToolRun for DecodeOpts {
    fn run(&self) -> anyhow::Result<()> {
        let frames = if self.frames.is_empty() {
            std::io::stdin()
                .lock()
                .lines()
                .collect::<Result<Vec<_>, _>>()?
        } else {
            self.frames.clone()
        };

        let crc = CrcPolicy::verify(self.verify_checksum);
        let mut failed = 0;
        for text in frames.iter().filter(|t| !t.trim().is_empty()) {
            let raw = frame_from_text(text);
            match Response::parse_frame(&crc, &raw) {
                Ok(frame) => {
                    println!(
                        "{} (function code {:04X}, counter {:04X}, from {})",
                        frame.message.name(),
                        frame.function_code,
                        frame.counter,
                        frame.mac
                    );
                    print_fields(&frame.message.to_map());
                }
                Err(e) => {
                    println!("{}: {}", raw.escape_ascii(), e);
                    failed += 1;
                }
            }
            println!();
        }

        if failed > 0 {
            anyhow::bail!("{} frame(s) failed to decode", failed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const FRAME: &[u8] = b"\x05\x05\x03\x03003F00020123456789ABCDEF0A1E0F01000000ABCD\r\n";

    #[test]
    fn bare_body() {
        assert_eq!(
            frame_from_text("003F00020123456789ABCDEF0A1E0F01000000ABCD"),
            FRAME
        );
    }

    #[test]
    fn escaped_markers() {
        assert_eq!(
            frame_from_text("\\x05\\x05\\x03\\x03003F00020123456789ABCDEF0A1E0F01000000ABCD\\r\\n"),
            FRAME
        );
    }

    #[test]
    fn raw_markers() {
        let text = std::str::from_utf8(FRAME).unwrap();
        assert_eq!(frame_from_text(text), FRAME);
    }

    #[test]
    fn decodes_clock_info() {
        let raw = frame_from_text("003F00020123456789ABCDEF0A1E0F01000000ABCD");
        let frame = Response::parse_frame(&CrcPolicy::Ignore, &raw).unwrap();
        assert_eq!(frame.message.name(), "clock info");
        assert!(Response::parse_frame(&CrcPolicy::Verify, &raw).is_err());
    }
}
