//! Power usage history, read back from a Circle's log buffer.

use chrono::NaiveDateTime;

use crate::protocol::field::{Field, FieldError, FieldKind, FieldValue};
use crate::protocol::parse::MessageParse;
use crate::protocol::serialize::MessageSerialize;
use crate::Mac;

use super::{util::Values, MessageType, Request};

/// Number of hourly entries in one log buffer slot.
pub const ENTRIES_PER_SLOT: usize = 4;

/// 0x0048 Power buffer request, for one log buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PowerBufferRequest {
    pub mac: Mac,
    pub slot: u32,
}

impl PowerBufferRequest {
    pub fn new(mac: Mac, slot: u32) -> Self {
        Self { mac, slot }
    }
}

impl MessageType for PowerBufferRequest {
    const CODE: u16 = 0x0048;
    const FIELDS: &'static [Field] = &[Field::new("logaddr", FieldKind::LogAddr)];

    fn values(&self) -> Vec<FieldValue> {
        vec![FieldValue::LogAddr(self.slot)]
    }
}

impl MessageSerialize for PowerBufferRequest {
    fn mac(&self) -> Option<&Mac> {
        Some(&self.mac)
    }
}

impl Request for PowerBufferRequest {
    type Response = PowerBufferResponse;
}

/// One hour of consumption. Entries the device hasn't reached yet are
/// left blank on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PowerBufferEntry {
    /// Start of the hour.
    pub datetime: NaiveDateTime,
    pub pulses: u32,
}

/// Date fields of log entries that haven't been written yet.
const ENTRY_DATE_TIME: FieldKind = FieldKind::MaybeBlank(&FieldKind::DateTime);

/// Pulse count carried by an entry that hasn't been written yet.
const BLANK_PULSES: u64 = 0xffff_ffff;

/// 0x0049 Power buffer response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PowerBufferResponse {
    /// Oldest first. `None` for hours not yet logged.
    pub entries: [Option<PowerBufferEntry>; ENTRIES_PER_SLOT],
    /// Slot these entries were read from.
    pub logaddr: u32,
}

impl MessageType for PowerBufferResponse {
    const CODE: u16 = 0x0049;
    const FIELDS: &'static [Field] = &[
        Field::new("datetime_1", ENTRY_DATE_TIME),
        Field::new("pulses_1", FieldKind::Int(8)),
        Field::new("datetime_2", ENTRY_DATE_TIME),
        Field::new("pulses_2", FieldKind::Int(8)),
        Field::new("datetime_3", ENTRY_DATE_TIME),
        Field::new("pulses_3", FieldKind::Int(8)),
        Field::new("datetime_4", ENTRY_DATE_TIME),
        Field::new("pulses_4", FieldKind::Int(8)),
        Field::new("logaddr", FieldKind::LogAddr),
    ];

    fn values(&self) -> Vec<FieldValue> {
        let mut values = Vec::with_capacity(Self::FIELDS.len());
        for entry in self.entries.iter() {
            match entry {
                Some(entry) => {
                    values.push(FieldValue::DateTime(entry.datetime));
                    values.push(FieldValue::Int(entry.pulses as u64));
                }
                None => {
                    values.push(FieldValue::Blank);
                    values.push(FieldValue::Int(BLANK_PULSES));
                }
            }
        }
        values.push(FieldValue::LogAddr(self.logaddr));
        values
    }
}

impl PowerBufferResponse {
    /// Entries that have been logged, oldest first.
    pub fn filled(&self) -> impl Iterator<Item = &PowerBufferEntry> {
        self.entries.iter().flatten()
    }
}

impl MessageParse for PowerBufferResponse {
    fn from_values(values: &mut Values) -> Result<Self, FieldError> {
        let mut entry = || -> Result<Option<PowerBufferEntry>, FieldError> {
            let datetime = values.maybe_date_time()?;
            let pulses = values.int_as()?;
            Ok(datetime.map(|datetime| PowerBufferEntry { datetime, pulses }))
        };
        let entries = [entry()?, entry()?, entry()?, entry()?];
        Ok(Self {
            entries,
            logaddr: values.log_addr()?,
        })
    }
}
