pub const FRAME_START: [u8; 4] = [0x05, 0x05, 0x03, 0x03];
pub const FRAME_END: [u8; 2] = [0x0d, 0x0a];

/// Hex digits used by function codes, sequence counters, and checksums.
pub const CODE_LEN: usize = 4;

/// FRAME_START + function code + counter + MAC, on responses.
pub const PREFIX_LEN: usize = FRAME_START.len() + CODE_LEN + CODE_LEN + crate::MAC_LEN;

/// Response frame length not counting the parameters.
pub const FRAME_OVERHEAD: usize = PREFIX_LEN + CODE_LEN + FRAME_END.len();

/// Lines longer than this are handed over as-is, without waiting for
/// a line ending.
pub const MAX_FRAME_SIZE: usize = 0x200;

pub const BAUD_RATE: u32 = 115200;

pub mod crc;
pub use self::crc::*;

pub mod field;
pub use field::{Field, FieldError, FieldKind, FieldValue};

pub mod parse;
pub use parse::{Frame, FrameError, MessageParse};

mod messages;
pub use messages::*;

pub mod serialize;
pub use serialize::MessageSerialize;

/// Parse an entire response frame, as read off the wire, including
/// start/end markers and CRC.
pub fn parse<M, C>(crc: &C, input: &[u8]) -> Result<Frame<M>, FrameError>
where
    C: crc::CrcStyle,
    M: MessageParse,
{
    parse::frame(crc, input)
}

/// Serialize a request into a full frame, with CRC and start/end
/// markers.
pub fn serialize<M>(message: &M) -> Result<Vec<u8>, FieldError>
where
    M: MessageSerialize,
{
    let mut ser = serialize::SerializerVec::new();
    message.frame(&mut ser).map_err(|e| match e {
        serialize::SerializeError::Field(e) => e,
        serialize::SerializeError::Io(never) => match never {},
    })?;
    Ok(ser.done())
}
