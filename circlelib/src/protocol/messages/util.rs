//! Helpers for building messages out of decoded fields.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};

use crate::protocol::field::{Field, FieldError, FieldKind, FieldValue};

/// Decoded field values, handed out in declared order.
#[derive(Debug, Clone)]
pub struct Values {
    fields: &'static [Field],
    values: std::vec::IntoIter<FieldValue>,
    index: usize,
}

impl Values {
    pub fn new(fields: &'static [Field], values: Vec<FieldValue>) -> Self {
        Self {
            fields,
            values: values.into_iter(),
            index: 0,
        }
    }

    fn next(&mut self) -> Result<(FieldKind, FieldValue), FieldError> {
        let count = FieldError::Count {
            expected: self.fields.len(),
            found: self.index,
        };
        let field = self.fields.get(self.index).ok_or(count.clone())?;
        let value = self.values.next().ok_or(count)?;
        self.index += 1;
        Ok((field.kind, value))
    }

    pub fn int(&mut self) -> Result<u64, FieldError> {
        match self.next()? {
            (_, FieldValue::Int(v)) => Ok(v),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    /// An integer that must fit into a narrower type.
    pub fn int_as<T>(&mut self) -> Result<T, FieldError>
    where
        T: TryFrom<u64>,
    {
        match self.next()? {
            (kind, FieldValue::Int(v)) => T::try_from(v).map_err(|_| FieldError::OutOfRange {
                kind,
                text: v.to_string(),
            }),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    /// An integer used as a boolean, anything nonzero is true.
    pub fn flag(&mut self) -> Result<bool, FieldError> {
        Ok(self.int()? != 0)
    }

    pub fn float(&mut self) -> Result<f32, FieldError> {
        match self.next()? {
            (_, FieldValue::Float(v)) => Ok(v),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    pub fn string(&mut self) -> Result<String, FieldError> {
        match self.next()? {
            (_, FieldValue::Str(v)) => Ok(v),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    pub fn timestamp(&mut self) -> Result<DateTime<Utc>, FieldError> {
        match self.next()? {
            (_, FieldValue::Timestamp(v)) => Ok(v),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    pub fn log_addr(&mut self) -> Result<u32, FieldError> {
        match self.next()? {
            (_, FieldValue::LogAddr(v)) => Ok(v),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    pub fn date_time(&mut self) -> Result<NaiveDateTime, FieldError> {
        match self.next()? {
            (_, FieldValue::DateTime(v)) => Ok(v),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    /// A date and time that may never have been written.
    pub fn maybe_date_time(&mut self) -> Result<Option<NaiveDateTime>, FieldError> {
        match self.next()? {
            (_, FieldValue::DateTime(v)) => Ok(Some(v)),
            (_, FieldValue::Blank) => Ok(None),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }

    pub fn time(&mut self) -> Result<NaiveTime, FieldError> {
        match self.next()? {
            (_, FieldValue::Time(v)) => Ok(v),
            (kind, value) => Err(FieldError::Mismatch { kind, value }),
        }
    }
}
