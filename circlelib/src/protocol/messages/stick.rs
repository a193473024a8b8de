//! Messages answered by the USB stick itself.

use crate::protocol::field::{Field, FieldError, FieldKind, FieldValue};
use crate::protocol::parse::MessageParse;
use crate::protocol::serialize::MessageSerialize;

use super::{util::Values, MessageType, Request};

/// 0x000A Init, sent to the stick before anything else. Carries no MAC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InitRequest;

impl MessageType for InitRequest {
    const CODE: u16 = 0x000a;
    const FIELDS: &'static [Field] = &[];

    fn values(&self) -> Vec<FieldValue> {
        Vec::new()
    }
}

impl MessageSerialize for InitRequest {
    fn mac(&self) -> Option<&crate::Mac> {
        None
    }
}

impl Request for InitRequest {
    type Response = InitResponse;
}

/// 0x0011 Init response. The frame MAC is the stick's own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InitResponse {
    pub reserved_1: u8,
    /// Stick has joined a Circle network.
    pub network_is_online: bool,
    pub network_id: u64,
    pub network_id_short: u16,
    pub reserved_2: u8,
}

impl MessageType for InitResponse {
    const CODE: u16 = 0x0011;
    const FIELDS: &'static [Field] = &[
        Field::new("reserved_1", FieldKind::Int(2)),
        Field::new("network_is_online", FieldKind::Int(2)),
        Field::new("network_id", FieldKind::Int(16)),
        Field::new("network_id_short", FieldKind::Int(4)),
        Field::new("reserved_2", FieldKind::Int(2)),
    ];

    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int(self.reserved_1 as u64),
            FieldValue::Int(self.network_is_online as u64),
            FieldValue::Int(self.network_id),
            FieldValue::Int(self.network_id_short as u64),
            FieldValue::Int(self.reserved_2 as u64),
        ]
    }
}

impl MessageParse for InitResponse {
    fn from_values(values: &mut Values) -> Result<Self, FieldError> {
        Ok(Self {
            reserved_1: values.int_as()?,
            network_is_online: values.flag()?,
            network_id: values.int()?,
            network_id_short: values.int_as()?,
            reserved_2: values.int_as()?,
        })
    }
}
