use super::crc::CrcStyle;
use super::field::{decode_fields, fields_width, FieldError, FieldKind};
use super::messages::{util::Values, MessageType};
use super::{CODE_LEN, FRAME_END, FRAME_OVERHEAD, FRAME_START};
use crate::{Mac, MacError};

/// A response frame, decoded, alongside the envelope values read from
/// it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<M> {
    /// Function code as found on the wire.
    pub function_code: u16,
    /// Sequence counter assigned by the stick.
    pub counter: u16,
    /// Device the response came from.
    pub mac: Mac,
    /// Checksum as provided on the wire. Only compared against the
    /// calculated value when the CrcStyle asks for it.
    pub checksum: u16,
    pub message: M,
}

impl<M> Frame<M> {
    /// Fail unless the frame came from `expected`.
    pub fn check_mac(self, expected: &Mac) -> Result<Self, FrameError> {
        if self.mac != *expected {
            return Err(FrameError::Sender {
                expected: *expected,
                found: self.mac,
            });
        }
        Ok(self)
    }

    pub fn map<F, N>(self, f: F) -> Frame<N>
    where
        F: FnOnce(M) -> N,
    {
        Frame {
            function_code: self.function_code,
            counter: self.counter,
            mac: self.mac,
            checksum: self.checksum,
            message: f(self.message),
        }
    }
}

impl<M> Frame<M>
where
    M: MessageType,
{
    /// Fail unless the function code on the wire is the one this
    /// message type is declared under.
    pub fn check_function_code(self) -> Result<Self, FrameError> {
        if self.function_code != M::CODE {
            return Err(FrameError::FunctionCode {
                expected: M::CODE,
                found: self.function_code,
            });
        }
        Ok(self)
    }
}

/// Reasons a frame can fail to decode.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Frame length does not match the expected response's layout.
    Length { expected: usize, actual: usize },
    /// Frame does not start with FRAME_START.
    Header,
    /// Frame does not end with FRAME_END.
    Footer,
    /// Function code differs from the expected response's.
    FunctionCode { expected: u16, found: u16 },
    /// Checksum was checked, and does not match.
    Checksum { calculated: u16, provided: u16 },
    /// No known response has this function code.
    UnknownFunctionCode(u16),
    /// MAC address in the frame is malformed.
    Mac(MacError),
    /// Frame came from another device than the one asked.
    Sender { expected: Mac, found: Mac },
    /// A field failed to decode.
    Field(FieldError),
}

impl std::error::Error for FrameError {}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Length { expected, actual } => write!(
                f,
                "frame length mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            Self::Header => write!(f, "frame header mismatch"),
            Self::Footer => write!(f, "frame footer mismatch"),
            Self::FunctionCode { expected, found } => write!(
                f,
                "function code mismatch: expected {:04X}, got {:04X}",
                expected, found
            ),
            Self::Checksum {
                calculated,
                provided,
            } => write!(
                f,
                "checksum mismatch: calculated {:04X}, provided {:04X}",
                calculated, provided
            ),
            Self::UnknownFunctionCode(code) => write!(f, "unknown function code {:04X}", code),
            Self::Mac(e) => e.fmt(f),
            Self::Sender { expected, found } => {
                write!(f, "sender mismatch: expected {}, got {}", expected, found)
            }
            Self::Field(e) => e.fmt(f),
        }
    }
}

impl From<MacError> for FrameError {
    fn from(value: MacError) -> Self {
        Self::Mac(value)
    }
}

impl From<FieldError> for FrameError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

/// A trait for parseable messages.
pub trait MessageParse: MessageType + Sized {
    /// Build the message from its decoded fields, in declared order.
    fn from_values(values: &mut Values) -> Result<Self, FieldError>;

    /// Exact length of a full frame carrying this message.
    fn frame_len() -> usize {
        FRAME_OVERHEAD + fields_width(Self::FIELDS)
    }

    /// Parse an entire frame containing this message.
    ///
    /// This checks length, header, footer, and CRC (as far as the
    /// CrcStyle cares), but not the function code.
    fn parse_frame<C>(crc: &C, input: &[u8]) -> Result<Frame<Self>, FrameError>
    where
        C: CrcStyle,
    {
        frame(crc, input)
    }
}

/// Split `n` bytes off the front of `input`.
fn take_slice(input: &[u8], n: usize) -> Result<(&[u8], &[u8]), FrameError> {
    let taken: nom::IResult<&[u8], &[u8]> = nom::bytes::complete::take(n)(input);
    taken.map_err(|_| FrameError::Length {
        expected: n,
        actual: input.len(),
    })
}

/// Read the function code from a raw frame, without checking anything
/// but the header.
pub fn peek_function_code(input: &[u8]) -> Result<u16, FrameError> {
    let (rest, header) = take_slice(input, FRAME_START.len())?;
    if header != FRAME_START {
        return Err(FrameError::Header);
    }
    let (_, code) = FieldKind::Int(CODE_LEN).decode_hex(rest)?;
    Ok(code as u16)
}

/// Decode a full frame as the message `M`.
pub fn frame<C, M>(crc: &C, input: &[u8]) -> Result<Frame<M>, FrameError>
where
    C: CrcStyle,
    M: MessageParse,
{
    let expected = M::frame_len();
    if input.len() != expected {
        return Err(FrameError::Length {
            expected,
            actual: input.len(),
        });
    }

    // prefix: start, function code, counter, mac
    let (rest, header) = take_slice(input, FRAME_START.len())?;
    if header != FRAME_START {
        return Err(FrameError::Header);
    }
    let code_kind = FieldKind::Int(CODE_LEN);
    let (rest, function_code) = code_kind.decode_hex(rest)?;
    let (rest, counter) = code_kind.decode_hex(rest)?;
    let (rest, mac) = take_slice(rest, crate::MAC_LEN)?;
    let mac = Mac::new_from_bytes(mac)?;

    // parameters, then checksum and end
    let (rest, values) = decode_fields(M::FIELDS, rest)?;
    let message = M::from_values(&mut Values::new(M::FIELDS, values))?;

    let (rest, checksum) = code_kind.decode_hex(rest)?;
    if rest != FRAME_END {
        return Err(FrameError::Footer);
    }

    // checksum covers everything between start and the checksum itself
    let body = &input[FRAME_START.len()..input.len() - CODE_LEN - FRAME_END.len()];
    let calculated = crc.checksum(body);
    let provided = checksum as u16;
    if !crc.validate(calculated, provided) {
        return Err(FrameError::Checksum {
            calculated,
            provided,
        });
    }

    Ok(Frame {
        function_code: function_code as u16,
        counter: counter as u16,
        mac,
        checksum: provided,
        message,
    })
}
