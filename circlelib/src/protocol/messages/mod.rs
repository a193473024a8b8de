//! Message types used in the protocol.

use crate::protocol::crc::CrcStyle;
use crate::protocol::field::{Field, FieldValue};
use crate::protocol::parse::{peek_function_code, Frame, FrameError, MessageParse};
use crate::protocol::serialize::MessageSerialize;

pub mod circle;
pub use circle::*;
pub mod history;
pub use history::*;
pub mod stick;
pub use stick::*;
pub mod util;

/// A trait for messages with a statically-known function code and
/// field layout.
pub trait MessageType: core::fmt::Debug {
    const CODE: u16;

    /// Arguments (requests) or parameters (responses), in wire order.
    const FIELDS: &'static [Field];

    /// Field values in the same order as [Self::FIELDS].
    fn values(&self) -> Vec<FieldValue>;

    /// Field names paired with their values, in wire order.
    fn to_map(&self) -> Vec<(&'static str, FieldValue)> {
        Self::FIELDS
            .iter()
            .map(|f| f.name)
            .zip(self.values())
            .collect()
    }
}

/// A request that is answered by a response of a known type.
pub trait Request: MessageSerialize {
    type Response: MessageParse;
}

/// Any response, for when the function code isn't known ahead of time.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// 0x0011
    Init(stick::InitResponse),
    /// 0x0027
    Calibration(circle::CalibrationResponse),
    /// 0x0013
    PowerUsage(circle::PowerUsageResponse),
    /// 0x0024
    Info(circle::InfoResponse),
    /// 0x003F
    ClockInfo(circle::ClockInfoResponse),
    /// 0x0049
    PowerBuffer(history::PowerBufferResponse),
}

impl Response {
    /// Parse a frame as whichever response its function code names.
    pub fn parse_frame<C>(crc: &C, input: &[u8]) -> Result<Frame<Self>, FrameError>
    where
        C: CrcStyle,
    {
        match peek_function_code(input)? {
            stick::InitResponse::CODE => {
                stick::InitResponse::parse_frame(crc, input).map(|f| f.map(Self::Init))
            }
            circle::CalibrationResponse::CODE => {
                circle::CalibrationResponse::parse_frame(crc, input)
                    .map(|f| f.map(Self::Calibration))
            }
            circle::PowerUsageResponse::CODE => {
                circle::PowerUsageResponse::parse_frame(crc, input)
                    .map(|f| f.map(Self::PowerUsage))
            }
            circle::InfoResponse::CODE => {
                circle::InfoResponse::parse_frame(crc, input).map(|f| f.map(Self::Info))
            }
            circle::ClockInfoResponse::CODE => {
                circle::ClockInfoResponse::parse_frame(crc, input).map(|f| f.map(Self::ClockInfo))
            }
            history::PowerBufferResponse::CODE => {
                history::PowerBufferResponse::parse_frame(crc, input)
                    .map(|f| f.map(Self::PowerBuffer))
            }
            code => Err(FrameError::UnknownFunctionCode(code)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Calibration(_) => "calibration",
            Self::PowerUsage(_) => "power usage",
            Self::Info(_) => "info",
            Self::ClockInfo(_) => "clock info",
            Self::PowerBuffer(_) => "power buffer",
        }
    }

    pub fn to_map(&self) -> Vec<(&'static str, FieldValue)> {
        match self {
            Self::Init(m) => m.to_map(),
            Self::Calibration(m) => m.to_map(),
            Self::PowerUsage(m) => m.to_map(),
            Self::Info(m) => m.to_map(),
            Self::ClockInfo(m) => m.to_map(),
            Self::PowerBuffer(m) => m.to_map(),
        }
    }
}
