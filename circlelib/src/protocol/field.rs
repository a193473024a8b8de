//! Fixed-width ASCII-hex fields.
//!
//! Every value on the wire is text: integers are zero-padded uppercase
//! hex, floats are the hex of their big-endian IEEE-754 bytes, and
//! dates are packed out of smaller integer fields. A field's width is
//! a property of its [FieldKind], never of the value being encoded.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Years on the wire are offset from this one.
pub const YEAR_EPOCH: i32 = 2000;

/// Raw log buffer address of slot 0.
pub const LOGADDR_OFFSET: u64 = 278528;

/// Raw log buffer address distance between slots.
pub const LOGADDR_STRIDE: u64 = 32;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// The kind of a field, which decides its width and text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Zero-padded uppercase hex integer of the given width.
    Int(usize),
    /// Written as zero-padded decimal, but read back as hex. Older
    /// firmware conversations use this.
    LegacyInt(usize),
    /// Big-endian IEEE-754 single, 8 hex digits. Receive only.
    Float,
    /// Raw text of the given width.
    Str(usize),
    /// Seconds since the unix epoch, 8 hex digits.
    UnixTimestamp,
    /// Year offset from [YEAR_EPOCH], 2 hex digits.
    Year,
    /// Log buffer slot, carried as a raw buffer address.
    LogAddr,
    /// Composite of year, month and minutes-of-month.
    DateTime,
    /// Composite of hour, minute and second.
    Time,
    /// The wrapped kind, or all `F` for flash that was never written.
    MaybeBlank(&'static FieldKind),
}

const DATE_TIME_PARTS: [FieldKind; 3] = [FieldKind::Year, FieldKind::Int(2), FieldKind::Int(4)];
const TIME_PARTS: [FieldKind; 3] = [FieldKind::Int(2), FieldKind::Int(2), FieldKind::Int(2)];

impl FieldKind {
    /// Child fields of a composite kind, in wire order. Empty for
    /// scalar kinds.
    pub fn parts(&self) -> &'static [FieldKind] {
        match self {
            Self::DateTime => &DATE_TIME_PARTS,
            Self::Time => &TIME_PARTS,
            Self::MaybeBlank(inner) => inner.parts(),
            _ => &[],
        }
    }

    /// Encoded width in characters.
    pub fn width(&self) -> usize {
        match self {
            Self::Int(w) | Self::LegacyInt(w) | Self::Str(w) => *w,
            Self::Float | Self::UnixTimestamp | Self::LogAddr => 8,
            Self::Year => 2,
            Self::DateTime | Self::Time => self.parts().iter().map(|p| p.width()).sum(),
            Self::MaybeBlank(inner) => inner.width(),
        }
    }

    /// Append the encoding of `value` to `out`. Exactly [Self::width()]
    /// characters are written on success, and nothing on failure.
    pub fn encode(&self, value: &FieldValue, out: &mut String) -> Result<(), FieldError> {
        let text = self.render(value)?;
        if text.len() != self.width() {
            return Err(FieldError::Width {
                kind: *self,
                text,
            });
        }
        out.push_str(&text);
        Ok(())
    }

    fn render(&self, value: &FieldValue) -> Result<String, FieldError> {
        match (self, value) {
            (Self::Int(w), FieldValue::Int(v)) => Ok(format!("{:0w$X}", v, w = *w)),
            (Self::LegacyInt(w), FieldValue::Int(v)) => Ok(format!("{:0w$}", v, w = *w)),
            (Self::Float, _) => Err(FieldError::Unsupported(*self)),
            (Self::Str(_), FieldValue::Str(s)) => Ok(s.clone()),
            (Self::UnixTimestamp, FieldValue::Timestamp(t)) => {
                let secs = u64::try_from(t.timestamp()).map_err(|_| self.out_of_range(value))?;
                Ok(format!("{:08X}", secs))
            }
            (Self::Year, FieldValue::Year(y)) => {
                let offset = y
                    .checked_sub(YEAR_EPOCH)
                    .and_then(|offset| u64::try_from(offset).ok())
                    .ok_or_else(|| self.out_of_range(value))?;
                Ok(format!("{:02X}", offset))
            }
            (Self::LogAddr, FieldValue::LogAddr(slot)) => {
                let raw = *slot as u64 * LOGADDR_STRIDE + LOGADDR_OFFSET;
                Ok(format!("{:08X}", raw))
            }
            (Self::DateTime, FieldValue::DateTime(dt)) => {
                let [year, month, minutes] = DATE_TIME_PARTS;
                let month_minutes =
                    (dt.day() - 1) * MINUTES_PER_DAY + dt.hour() * 60 + dt.minute();

                let mut text = String::with_capacity(self.width());
                year.encode(&FieldValue::Year(dt.year()), &mut text)?;
                month.encode(&FieldValue::Int(dt.month() as u64), &mut text)?;
                minutes.encode(&FieldValue::Int(month_minutes as u64), &mut text)?;
                Ok(text)
            }
            (Self::Time, FieldValue::Time(t)) => {
                let [hour, minute, second] = TIME_PARTS;
                let mut text = String::with_capacity(self.width());
                hour.encode(&FieldValue::Int(t.hour() as u64), &mut text)?;
                minute.encode(&FieldValue::Int(t.minute() as u64), &mut text)?;
                second.encode(&FieldValue::Int(t.second() as u64), &mut text)?;
                Ok(text)
            }
            (Self::MaybeBlank(inner), FieldValue::Blank) => Ok("F".repeat(inner.width())),
            (Self::MaybeBlank(inner), _) => inner.render(value),
            _ => Err(FieldError::Mismatch {
                kind: *self,
                value: value.clone(),
            }),
        }
    }

    /// Decode one field from the start of `input`, returning the rest.
    pub fn decode<'a>(&self, input: &'a [u8]) -> Result<(&'a [u8], FieldValue), FieldError> {
        match self {
            Self::Int(_) | Self::LegacyInt(_) => {
                let (rest, v) = self.decode_hex(input)?;
                Ok((rest, FieldValue::Int(v)))
            }
            Self::Float => {
                let (rest, bits) = self.decode_hex(input)?;
                // 8 hex digits always fit
                Ok((rest, FieldValue::Float(f32::from_bits(bits as u32))))
            }
            Self::Str(_) => {
                let (rest, slot) = self.take(input)?;
                let text = core::str::from_utf8(slot).map_err(|_| FieldError::NotText {
                    kind: *self,
                    bytes: slot.to_vec(),
                })?;
                Ok((rest, FieldValue::Str(text.to_owned())))
            }
            Self::UnixTimestamp => {
                let (rest, secs) = self.decode_hex(input)?;
                let t = DateTime::<Utc>::from_timestamp(secs as i64, 0)
                    .ok_or_else(|| self.bad_slot(input))?;
                Ok((rest, FieldValue::Timestamp(t)))
            }
            Self::Year => {
                let (rest, offset) = self.decode_hex(input)?;
                Ok((rest, FieldValue::Year(YEAR_EPOCH + offset as i32)))
            }
            Self::LogAddr => {
                let (rest, raw) = self.decode_hex(input)?;
                Ok((rest, FieldValue::LogAddr(logaddr_slot(raw)?)))
            }
            Self::DateTime => {
                let [year, month, minutes] = DATE_TIME_PARTS;
                let (rest, y) = year.decode(input)?;
                let (rest, m) = month.decode_hex(rest)?;
                let (rest, mins) = minutes.decode_hex(rest)?;

                let FieldValue::Year(y) = y else {
                    return Err(self.bad_slot(input));
                };
                let mins = mins as u32;
                let day = mins / MINUTES_PER_DAY + 1;
                let hour = (mins % MINUTES_PER_DAY) / 60;
                let minute = mins % 60;

                let dt = NaiveDate::from_ymd_opt(y, m as u32, day)
                    .and_then(|d| d.and_hms_opt(hour, minute, 0))
                    .ok_or_else(|| self.bad_slot(input))?;
                Ok((rest, FieldValue::DateTime(dt)))
            }
            Self::Time => {
                let [hour, minute, second] = TIME_PARTS;
                let (rest, h) = hour.decode_hex(input)?;
                let (rest, m) = minute.decode_hex(rest)?;
                let (rest, s) = second.decode_hex(rest)?;

                let t = NaiveTime::from_hms_opt(h as u32, m as u32, s as u32)
                    .ok_or_else(|| self.bad_slot(input))?;
                Ok((rest, FieldValue::Time(t)))
            }
            Self::MaybeBlank(inner) => {
                let (rest, slot) = self.take(input)?;
                if slot.iter().all(|b| *b == b'F') {
                    return Ok((rest, FieldValue::Blank));
                }
                inner.decode(input)
            }
        }
    }

    /// Take this field's slot from `input` and read it as a hex integer.
    pub fn decode_hex<'a>(&self, input: &'a [u8]) -> Result<(&'a [u8], u64), FieldError> {
        let (rest, slot) = self.take(input)?;

        let digits: nom::IResult<&[u8], &[u8]> =
            nom::combinator::all_consuming(nom::character::complete::hex_digit1)(slot);
        let digits = match digits {
            Ok((_, digits)) => digits,
            Err(_) => {
                return Err(FieldError::NotHex {
                    kind: *self,
                    text: String::from_utf8_lossy(slot).into_owned(),
                })
            }
        };

        // hex_digit1 only passes ascii
        let text = core::str::from_utf8(digits).unwrap_or_default();
        let value = u64::from_str_radix(text, 16).map_err(|_| FieldError::OutOfRange {
            kind: *self,
            text: text.to_owned(),
        })?;
        Ok((rest, value))
    }

    fn take<'a>(&self, input: &'a [u8]) -> Result<(&'a [u8], &'a [u8]), FieldError> {
        let width = self.width();
        let taken: nom::IResult<&[u8], &[u8]> = nom::bytes::complete::take(width)(input);
        taken.map_err(|_| FieldError::Truncated {
            kind: *self,
            available: input.len(),
        })
    }

    fn bad_slot(&self, input: &[u8]) -> FieldError {
        let end = self.width().min(input.len());
        FieldError::OutOfRange {
            kind: *self,
            text: String::from_utf8_lossy(&input[..end]).into_owned(),
        }
    }

    fn out_of_range(&self, value: &FieldValue) -> FieldError {
        FieldError::OutOfRange {
            kind: *self,
            text: value.to_string(),
        }
    }
}

/// Convert a raw log buffer address into a zero-based slot index.
pub fn logaddr_slot(raw: u64) -> Result<u32, FieldError> {
    let offset = raw
        .checked_sub(LOGADDR_OFFSET)
        .ok_or(FieldError::UnalignedLogAddr(raw))?;
    if offset % LOGADDR_STRIDE != 0 {
        return Err(FieldError::UnalignedLogAddr(raw));
    }
    u32::try_from(offset / LOGADDR_STRIDE).map_err(|_| FieldError::UnalignedLogAddr(raw))
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(u64),
    Float(f32),
    Str(String),
    Timestamp(DateTime<Utc>),
    Year(i32),
    LogAddr(u32),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    /// Never written.
    Blank,
}

impl core::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(v) => write!(f, "{}", v),
            Self::Timestamp(v) => write!(f, "{}", v),
            Self::Year(v) => write!(f, "{}", v),
            Self::LogAddr(v) => write!(f, "slot {}", v),
            Self::DateTime(v) => write!(f, "{}", v),
            Self::Time(v) => write!(f, "{}", v),
            Self::Blank => write!(f, "-"),
        }
    }
}

/// A named field in a message layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// Total encoded width of a field layout.
pub fn fields_width(fields: &[Field]) -> usize {
    fields.iter().map(|f| f.kind.width()).sum()
}

/// Encode values against a field layout, in order.
pub fn encode_fields(
    fields: &[Field],
    values: &[FieldValue],
    out: &mut String,
) -> Result<(), FieldError> {
    if fields.len() != values.len() {
        return Err(FieldError::Count {
            expected: fields.len(),
            found: values.len(),
        });
    }
    for (field, value) in fields.iter().zip(values.iter()) {
        field.kind.encode(value, out)?;
    }
    Ok(())
}

/// Decode a field layout from the start of `input`, in order, each
/// field consuming exactly its width. Returns the rest.
pub fn decode_fields<'a>(
    fields: &[Field],
    mut input: &'a [u8],
) -> Result<(&'a [u8], Vec<FieldValue>), FieldError> {
    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let (rest, value) = field.kind.decode(input)?;
        log::trace!("{} = {}", field.name, value);
        values.push(value);
        input = rest;
    }
    Ok((input, values))
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// Not enough input left for this field.
    Truncated { kind: FieldKind, available: usize },
    /// Slot was not valid hex.
    NotHex { kind: FieldKind, text: String },
    /// String slot was not valid UTF-8.
    NotText { kind: FieldKind, bytes: Vec<u8> },
    /// Valid hex, but not a meaningful value for this kind.
    OutOfRange { kind: FieldKind, text: String },
    /// Log address below the buffer start or off the slot stride.
    UnalignedLogAddr(u64),
    /// Encoded text did not come out at the declared width.
    Width { kind: FieldKind, text: String },
    /// This kind can't be encoded.
    Unsupported(FieldKind),
    /// Value variant does not belong to this kind.
    Mismatch { kind: FieldKind, value: FieldValue },
    /// Number of values does not match the layout.
    Count { expected: usize, found: usize },
}

impl std::error::Error for FieldError {}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Truncated { kind, available } => write!(
                f,
                "{:?} field needs {} characters, only {} left",
                kind,
                kind.width(),
                available
            ),
            Self::NotHex { kind, text } => write!(f, "{:?} field is not hex: {:?}", kind, text),
            Self::NotText { kind, bytes } => {
                write!(f, "{:?} field is not text: {:x?}", kind, bytes)
            }
            Self::OutOfRange { kind, text } => {
                write!(f, "{:?} field out of range: {:?}", kind, text)
            }
            Self::UnalignedLogAddr(raw) => write!(
                f,
                "log address {:#x} is not a slot boundary (offset {:#x}, stride {})",
                raw, LOGADDR_OFFSET, LOGADDR_STRIDE
            ),
            Self::Width { kind, text } => write!(
                f,
                "{:?} field must be {} characters, got {:?}",
                kind,
                kind.width(),
                text
            ),
            Self::Unsupported(kind) => write!(f, "{:?} fields can't be encoded", kind),
            Self::Mismatch { kind, value } => {
                write!(f, "{:?} field can't hold {:?}", kind, value)
            }
            Self::Count { expected, found } => {
                write!(f, "expected {} field values, got {}", expected, found)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    use super::*;

    fn encode(kind: FieldKind, value: FieldValue) -> Result<String, FieldError> {
        let mut out = String::new();
        kind.encode(&value, &mut out)?;
        Ok(out)
    }

    fn decode(kind: FieldKind, text: &str) -> Result<FieldValue, FieldError> {
        let (rest, value) = kind.decode(text.as_bytes())?;
        assert!(rest.is_empty());
        Ok(value)
    }

    #[derive(Debug, Clone)]
    struct Moment(NaiveDateTime);

    impl Arbitrary for Moment {
        fn arbitrary(g: &mut Gen) -> Self {
            let year = YEAR_EPOCH + (u8::arbitrary(g) as i32);
            let month = 1 + u32::arbitrary(g) % 12;
            let day = 1 + u32::arbitrary(g) % 28;
            let hour = u32::arbitrary(g) % 24;
            let minute = u32::arbitrary(g) % 60;
            let dt = NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|d| d.and_hms_opt(hour, minute, 0))
                .unwrap();
            Moment(dt)
        }
    }

    #[test]
    fn composite_widths() {
        assert_eq!(FieldKind::DateTime.width(), 8);
        assert_eq!(FieldKind::Time.width(), 6);
        assert_eq!(FieldKind::DateTime.parts().len(), 3);
        assert!(FieldKind::Int(4).parts().is_empty());
    }

    #[quickcheck]
    fn int_fixed_width(v: u16) -> bool {
        let text = encode(FieldKind::Int(4), FieldValue::Int(v as u64)).unwrap();
        text.len() == 4 && decode(FieldKind::Int(4), &text) == Ok(FieldValue::Int(v as u64))
    }

    #[quickcheck]
    fn int_wide_fixed_width(v: u64) -> bool {
        let text = encode(FieldKind::Int(16), FieldValue::Int(v)).unwrap();
        text.len() == 16 && decode(FieldKind::Int(16), &text) == Ok(FieldValue::Int(v))
    }

    #[test]
    fn int_uppercase_padded() {
        assert_eq!(encode(FieldKind::Int(4), FieldValue::Int(0xab)).unwrap(), "00AB");
        assert_eq!(encode(FieldKind::Int(2), FieldValue::Int(1)).unwrap(), "01");
    }

    #[test]
    fn int_too_wide() {
        assert!(matches!(
            encode(FieldKind::Int(2), FieldValue::Int(0x100)),
            Err(FieldError::Width { .. })
        ));
    }

    #[test]
    fn legacy_int_is_asymmetric() {
        assert_eq!(
            encode(FieldKind::LegacyInt(4), FieldValue::Int(12)).unwrap(),
            "0012"
        );
        assert_eq!(decode(FieldKind::LegacyInt(4), "0012"), Ok(FieldValue::Int(0x12)));
    }

    #[test]
    fn not_hex() {
        assert!(matches!(
            decode(FieldKind::Int(4), "00ZZ"),
            Err(FieldError::NotHex { .. })
        ));
        assert!(matches!(
            decode(FieldKind::Int(4), "+0FF"),
            Err(FieldError::NotHex { .. })
        ));
    }

    #[test]
    fn truncated() {
        assert_eq!(
            FieldKind::Int(4).decode(b"01"),
            Err(FieldError::Truncated {
                kind: FieldKind::Int(4),
                available: 2
            })
        );
    }

    #[test]
    fn float_one() {
        assert_eq!(decode(FieldKind::Float, "3F800000"), Ok(FieldValue::Float(1.0)));
        assert_eq!(decode(FieldKind::Float, "C0000000"), Ok(FieldValue::Float(-2.0)));
    }

    #[test]
    fn float_is_receive_only() {
        assert_eq!(
            encode(FieldKind::Float, FieldValue::Float(1.0)),
            Err(FieldError::Unsupported(FieldKind::Float))
        );
    }

    #[test]
    fn string_passthrough() {
        let kind = FieldKind::Str(12);
        assert_eq!(
            decode(kind, "000000070140"),
            Ok(FieldValue::Str("000000070140".to_owned()))
        );
        assert_eq!(
            encode(FieldKind::Str(8), FieldValue::Str("FFFFFFFF".to_owned())).unwrap(),
            "FFFFFFFF"
        );
        assert!(matches!(
            encode(FieldKind::Str(8), FieldValue::Str("FFFF".to_owned())),
            Err(FieldError::Width { .. })
        ));
    }

    #[test]
    fn unix_timestamp() {
        let t = DateTime::<Utc>::from_timestamp(1_300_000_000, 0).unwrap();
        assert_eq!(
            encode(FieldKind::UnixTimestamp, FieldValue::Timestamp(t)).unwrap(),
            "4D7C6D00"
        );
        assert_eq!(
            decode(FieldKind::UnixTimestamp, "4D7C6D00"),
            Ok(FieldValue::Timestamp(t))
        );
    }

    #[test]
    fn year_offset() {
        assert_eq!(decode(FieldKind::Year, "0B"), Ok(FieldValue::Year(2011)));
        assert_eq!(encode(FieldKind::Year, FieldValue::Year(2011)).unwrap(), "0B");
        assert!(matches!(
            encode(FieldKind::Year, FieldValue::Year(1999)),
            Err(FieldError::OutOfRange { .. })
        ));
    }

    #[test]
    fn logaddr_slots() {
        assert_eq!(decode(FieldKind::LogAddr, "00044000"), Ok(FieldValue::LogAddr(0)));
        assert_eq!(decode(FieldKind::LogAddr, "00044020"), Ok(FieldValue::LogAddr(1)));
        assert_eq!(logaddr_slot(278528), Ok(0));
        assert_eq!(logaddr_slot(278560), Ok(1));
    }

    #[test]
    fn logaddr_unaligned() {
        assert_eq!(logaddr_slot(278530), Err(FieldError::UnalignedLogAddr(278530)));
        assert_eq!(logaddr_slot(0), Err(FieldError::UnalignedLogAddr(0)));
        assert_eq!(
            decode(FieldKind::LogAddr, "00044001"),
            Err(FieldError::UnalignedLogAddr(0x44001))
        );
    }

    #[quickcheck]
    fn logaddr_roundtrip(slot: u16) -> bool {
        let value = FieldValue::LogAddr(slot as u32);
        let text = encode(FieldKind::LogAddr, value.clone()).unwrap();
        text.len() == 8 && decode(FieldKind::LogAddr, &text) == Ok(value)
    }

    #[test]
    fn date_time_unpacks_minutes() {
        // 2011-05, (3 - 1) * 1440 + 10 * 60 + 30 = 3510 = 0x0db6
        let dt = NaiveDate::from_ymd_opt(2011, 5, 3)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(decode(FieldKind::DateTime, "0B050DB6"), Ok(FieldValue::DateTime(dt)));
        assert_eq!(
            encode(FieldKind::DateTime, FieldValue::DateTime(dt)).unwrap(),
            "0B050DB6"
        );
    }

    #[test]
    fn date_time_first_minute_is_day_one() {
        let dt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(decode(FieldKind::DateTime, "14010000"), Ok(FieldValue::DateTime(dt)));
    }

    #[test]
    fn date_time_impossible() {
        // month 13
        assert!(matches!(
            decode(FieldKind::DateTime, "0B0D0000"),
            Err(FieldError::OutOfRange { .. })
        ));
        // 31st of February
        assert!(matches!(
            decode(FieldKind::DateTime, "0B02A8C0"),
            Err(FieldError::OutOfRange { .. })
        ));
    }

    #[test]
    fn date_time_child_failure() {
        assert!(matches!(
            decode(FieldKind::DateTime, "0B05XXXX"),
            Err(FieldError::NotHex {
                kind: FieldKind::Int(4),
                ..
            })
        ));
    }

    #[quickcheck]
    fn date_time_roundtrip(m: Moment) -> bool {
        let value = FieldValue::DateTime(m.0);
        let text = encode(FieldKind::DateTime, value.clone()).unwrap();
        text.len() == 8 && decode(FieldKind::DateTime, &text) == Ok(value)
    }

    #[quickcheck]
    fn time_roundtrip(h: u8, m: u8, s: u8) -> bool {
        let t = NaiveTime::from_hms_opt(h as u32 % 24, m as u32 % 60, s as u32 % 60).unwrap();
        let text = encode(FieldKind::Time, FieldValue::Time(t)).unwrap();
        text.len() == 6 && decode(FieldKind::Time, &text) == Ok(FieldValue::Time(t))
    }

    #[test]
    fn time_out_of_range() {
        assert!(matches!(
            decode(FieldKind::Time, "190000"),
            Err(FieldError::OutOfRange { .. })
        ));
    }

    #[test]
    fn year_far_before_epoch() {
        assert!(matches!(
            encode(FieldKind::Year, FieldValue::Year(i32::MIN)),
            Err(FieldError::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(FieldKind::DateTime, FieldValue::DateTime(NaiveDateTime::MIN)),
            Err(FieldError::OutOfRange { .. })
        ));
    }

    #[test]
    fn maybe_blank() {
        const KIND: FieldKind = FieldKind::MaybeBlank(&FieldKind::DateTime);
        assert_eq!(KIND.width(), 8);
        assert_eq!(decode(KIND, "FFFFFFFF"), Ok(FieldValue::Blank));
        assert_eq!(encode(KIND, FieldValue::Blank).unwrap(), "FFFFFFFF");

        let dt = NaiveDate::from_ymd_opt(2011, 5, 3)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(decode(KIND, "0B050DB6"), Ok(FieldValue::DateTime(dt)));
        assert_eq!(encode(KIND, FieldValue::DateTime(dt)).unwrap(), "0B050DB6");

        // partly written is still a real value, and still validated
        assert!(matches!(
            decode(KIND, "FFFFFFF0"),
            Err(FieldError::OutOfRange { .. })
        ));
        assert!(matches!(
            encode(FieldKind::DateTime, FieldValue::Blank),
            Err(FieldError::Mismatch { .. })
        ));
    }

    #[test]
    fn mismatch() {
        assert!(matches!(
            encode(FieldKind::Int(2), FieldValue::Str("01".to_owned())),
            Err(FieldError::Mismatch { .. })
        ));
    }

    #[test]
    fn layouts() {
        let layout = [
            Field::new("a", FieldKind::Int(2)),
            Field::new("b", FieldKind::Time),
            Field::new("c", FieldKind::Str(3)),
        ];
        assert_eq!(fields_width(&layout), 11);

        let values = vec![
            FieldValue::Int(7),
            FieldValue::Time(NaiveTime::from_hms_opt(12, 34, 56).unwrap()),
            FieldValue::Str("abc".to_owned()),
        ];
        let mut text = String::new();
        encode_fields(&layout, &values, &mut text).unwrap();
        assert_eq!(text, "070C2238abc");

        let (rest, decoded) = decode_fields(&layout, b"070C2238abcREST").unwrap();
        assert_eq!(rest, b"REST");
        assert_eq!(decoded, values);

        assert_eq!(
            encode_fields(&layout, &values[..1], &mut text),
            Err(FieldError::Count {
                expected: 3,
                found: 1
            })
        );
    }
}
