//! Messages exchanged with a single Circle, addressed by MAC.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc};

use crate::protocol::field::{Field, FieldError, FieldKind, FieldValue};
use crate::protocol::parse::MessageParse;
use crate::protocol::serialize::MessageSerialize;
use crate::Mac;

use super::{util::Values, MessageType, Request};

/// 0x0026 Calibration request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalibrationRequest {
    pub mac: Mac,
}

impl CalibrationRequest {
    pub fn new(mac: Mac) -> Self {
        Self { mac }
    }
}

impl MessageType for CalibrationRequest {
    const CODE: u16 = 0x0026;
    const FIELDS: &'static [Field] = &[];

    fn values(&self) -> Vec<FieldValue> {
        Vec::new()
    }
}

impl MessageSerialize for CalibrationRequest {
    fn mac(&self) -> Option<&Mac> {
        Some(&self.mac)
    }
}

impl Request for CalibrationRequest {
    type Response = CalibrationResponse;
}

/// 0x0027 Calibration response. Coefficients of the power curve used
/// to turn pulse counts into watts.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResponse {
    pub gain_a: f32,
    pub gain_b: f32,
    pub off_tot: f32,
    pub off_ruis: f32,
}

impl MessageType for CalibrationResponse {
    const CODE: u16 = 0x0027;
    const FIELDS: &'static [Field] = &[
        Field::new("gain_a", FieldKind::Float),
        Field::new("gain_b", FieldKind::Float),
        Field::new("off_tot", FieldKind::Float),
        Field::new("off_ruis", FieldKind::Float),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Float(self.gain_a),
            FieldValue::Float(self.gain_b),
            FieldValue::Float(self.off_tot),
            FieldValue::Float(self.off_ruis),
        ]
    }
}

impl MessageParse for CalibrationResponse {
    fn from_values(values: &mut Values) -> Result<Self, FieldError> {
        Ok(Self {
            gain_a: values.float()?,
            gain_b: values.float()?,
            off_tot: values.float()?,
            off_ruis: values.float()?,
        })
    }
}

/// 0x0012 Power usage request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PowerUsageRequest {
    pub mac: Mac,
}

impl PowerUsageRequest {
    pub fn new(mac: Mac) -> Self {
        Self { mac }
    }
}

impl MessageType for PowerUsageRequest {
    const CODE: u16 = 0x0012;
    const FIELDS: &'static [Field] = &[];

    fn values(&self) -> Vec<FieldValue> {
        Vec::new()
    }
}

impl MessageSerialize for PowerUsageRequest {
    fn mac(&self) -> Option<&Mac> {
        Some(&self.mac)
    }
}

impl Request for PowerUsageRequest {
    type Response = PowerUsageResponse;
}

/// 0x0013 Power usage response, as raw pulse counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PowerUsageResponse {
    /// Pulses over the last second.
    pub pulse_1s: u16,
    /// Pulses over the last 8 seconds.
    pub pulse_8s: u16,
    pub pulse_total: u32,
    pub reserved: [u16; 3],
}

impl MessageType for PowerUsageResponse {
    const CODE: u16 = 0x0013;
    const FIELDS: &'static [Field] = &[
        Field::new("pulse_1s", FieldKind::Int(4)),
        Field::new("pulse_8s", FieldKind::Int(4)),
        Field::new("pulse_total", FieldKind::Int(8)),
        Field::new("reserved_1", FieldKind::Int(4)),
        Field::new("reserved_2", FieldKind::Int(4)),
        Field::new("reserved_3", FieldKind::Int(4)),
    ];

    fn values(&self) -> Vec<FieldValue> {
        let mut values = vec![
            FieldValue::Int(self.pulse_1s as u64),
            FieldValue::Int(self.pulse_8s as u64),
            FieldValue::Int(self.pulse_total as u64),
        ];
        values.extend(self.reserved.iter().map(|r| FieldValue::Int(*r as u64)));
        values
    }
}

impl MessageParse for PowerUsageResponse {
    fn from_values(values: &mut Values) -> Result<Self, FieldError> {
        Ok(Self {
            pulse_1s: values.int_as()?,
            pulse_8s: values.int_as()?,
            pulse_total: values.int_as()?,
            reserved: [values.int_as()?, values.int_as()?, values.int_as()?],
        })
    }
}

/// 0x0023 Info request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InfoRequest {
    pub mac: Mac,
}

impl InfoRequest {
    pub fn new(mac: Mac) -> Self {
        Self { mac }
    }
}

impl MessageType for InfoRequest {
    const CODE: u16 = 0x0023;
    const FIELDS: &'static [Field] = &[];

    fn values(&self) -> Vec<FieldValue> {
        Vec::new()
    }
}

impl MessageSerialize for InfoRequest {
    fn mac(&self) -> Option<&Mac> {
        Some(&self.mac)
    }
}

impl Request for InfoRequest {
    type Response = InfoResponse;
}

/// 0x0024 Info response: device clock, relay and log buffer state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InfoResponse {
    pub datetime: NaiveDateTime,
    /// Most recently written log buffer slot.
    pub last_logaddr: u32,
    /// Relay is closed, so the outlet is powered.
    pub relay_state: bool,
    /// Raw mains frequency code.
    pub hz: u8,
    pub hw_ver: String,
    /// Firmware build time.
    pub fw_ver: DateTime<Utc>,
    pub reserved: u8,
}

impl MessageType for InfoResponse {
    const CODE: u16 = 0x0024;
    const FIELDS: &'static [Field] = &[
        Field::new("datetime", FieldKind::DateTime),
        Field::new("last_logaddr", FieldKind::LogAddr),
        Field::new("relay_state", FieldKind::Int(2)),
        Field::new("hz", FieldKind::Int(2)),
        Field::new("hw_ver", FieldKind::Str(12)),
        Field::new("fw_ver", FieldKind::UnixTimestamp),
        Field::new("reserved", FieldKind::Int(2)),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::DateTime(self.datetime),
            FieldValue::LogAddr(self.last_logaddr),
            FieldValue::Int(self.relay_state as u64),
            FieldValue::Int(self.hz as u64),
            FieldValue::Str(self.hw_ver.clone()),
            FieldValue::Timestamp(self.fw_ver),
            FieldValue::Int(self.reserved as u64),
        ]
    }
}

impl MessageParse for InfoResponse {
    fn from_values(values: &mut Values) -> Result<Self, FieldError> {
        Ok(Self {
            datetime: values.date_time()?,
            last_logaddr: values.log_addr()?,
            relay_state: values.flag()?,
            hz: values.int_as()?,
            hw_ver: values.string()?,
            fw_ver: values.timestamp()?,
            reserved: values.int_as()?,
        })
    }
}

/// 0x003E Clock info request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClockInfoRequest {
    pub mac: Mac,
}

impl ClockInfoRequest {
    pub fn new(mac: Mac) -> Self {
        Self { mac }
    }
}

impl MessageType for ClockInfoRequest {
    const CODE: u16 = 0x003e;
    const FIELDS: &'static [Field] = &[];

    fn values(&self) -> Vec<FieldValue> {
        Vec::new()
    }
}

impl MessageSerialize for ClockInfoRequest {
    fn mac(&self) -> Option<&Mac> {
        Some(&self.mac)
    }
}

impl Request for ClockInfoRequest {
    type Response = ClockInfoResponse;
}

/// 0x003F Clock info response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClockInfoResponse {
    pub time: NaiveTime,
    /// Monday is 0.
    pub day_of_week: u8,
    pub reserved_1: u8,
    pub reserved_2: u16,
}

impl MessageType for ClockInfoResponse {
    const CODE: u16 = 0x003f;
    const FIELDS: &'static [Field] = &[
        Field::new("time", FieldKind::Time),
        Field::new("day_of_week", FieldKind::Int(2)),
        Field::new("reserved_1", FieldKind::Int(2)),
        Field::new("reserved_2", FieldKind::Int(4)),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Time(self.time),
            FieldValue::Int(self.day_of_week as u64),
            FieldValue::Int(self.reserved_1 as u64),
            FieldValue::Int(self.reserved_2 as u64),
        ]
    }
}

impl MessageParse for ClockInfoResponse {
    fn from_values(values: &mut Values) -> Result<Self, FieldError> {
        Ok(Self {
            time: values.time()?,
            day_of_week: values.int_as()?,
            reserved_1: values.int_as()?,
            reserved_2: values.int_as()?,
        })
    }
}

/// Log buffer address written by a clock set. Devices ignore it.
pub const CLOCK_SET_LOGADDR: &str = "FFFFFFFF";

/// 0x0016 Clock set request. Not answered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClockSetRequest {
    pub mac: Mac,
    pub datetime: NaiveDateTime,
}

impl ClockSetRequest {
    pub fn new(mac: Mac, datetime: NaiveDateTime) -> Self {
        Self { mac, datetime }
    }
}

impl MessageType for ClockSetRequest {
    const CODE: u16 = 0x0016;
    const FIELDS: &'static [Field] = &[
        Field::new("datetime", FieldKind::DateTime),
        Field::new("logaddr", FieldKind::Str(8)),
        Field::new("time", FieldKind::Time),
        Field::new("day_of_week", FieldKind::Int(2)),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::DateTime(self.datetime),
            FieldValue::Str(CLOCK_SET_LOGADDR.to_owned()),
            FieldValue::Time(self.datetime.time()),
            FieldValue::Int(self.datetime.weekday().num_days_from_monday() as u64),
        ]
    }
}

impl MessageSerialize for ClockSetRequest {
    fn mac(&self) -> Option<&Mac> {
        Some(&self.mac)
    }
}

/// 0x0017 Switch request. Not answered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwitchRequest {
    pub mac: Mac,
    /// Close the relay, powering the outlet.
    pub on: bool,
}

impl SwitchRequest {
    pub fn new(mac: Mac, on: bool) -> Self {
        Self { mac, on }
    }
}

impl MessageType for SwitchRequest {
    const CODE: u16 = 0x0017;
    const FIELDS: &'static [Field] = &[Field::new("on", FieldKind::Int(2))];

    fn values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Int(self.on as u64)]
    }
}

impl MessageSerialize for SwitchRequest {
    fn mac(&self) -> Option<&Mac> {
        Some(&self.mac)
    }
}
