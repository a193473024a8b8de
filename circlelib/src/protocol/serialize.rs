use super::crc::{CrcDigest, CrcStyle, CrcXModem};
use super::field::{encode_fields, FieldError};
use super::MessageType;

/// A sink for frame bytes.
pub trait Serializer {
    type Error;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        self.write_bytes(text.as_bytes())
    }

    /// Write a function code or checksum as 4 uppercase hex digits.
    fn write_hex_u16(&mut self, val: u16) -> Result<(), Self::Error> {
        self.write_str(&format!("{:04X}", val))
    }
}

impl<S> Serializer for &mut S
where
    S: Serializer,
{
    type Error = S::Error;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write_bytes(bytes)
    }

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        (**self).write_str(text)
    }

    fn write_hex_u16(&mut self, val: u16) -> Result<(), Self::Error> {
        (**self).write_hex_u16(val)
    }
}

/// A serializer that collects into a Vec, and cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SerializerVec {
    data: Vec<u8>,
}

impl SerializerVec {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn done(self) -> Vec<u8> {
        self.data
    }
}

impl Serializer for SerializerVec {
    type Error = std::convert::Infallible;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

/// Passes writes through while running a checksum over them.
pub struct SerializerCrc<D, T> {
    digest: D,
    inner: T,
}

impl<D, T> SerializerCrc<D, T>
where
    D: CrcDigest,
{
    pub fn new(digest: D, inner: T) -> Self {
        Self { digest, inner }
    }

    /// Checksum of everything written so far, and the wrapped
    /// serializer back.
    pub fn finalize(self) -> (u16, T) {
        (self.digest.finalize(), self.inner)
    }
}

impl<D, T> Serializer for SerializerCrc<D, T>
where
    D: CrcDigest,
    T: Serializer,
{
    type Error = T::Error;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.digest.update(bytes);
        self.inner.write_bytes(bytes)
    }
}

/// Either a field could not be encoded, or the underlying serializer
/// failed.
#[derive(Debug)]
pub enum SerializeError<E> {
    Field(FieldError),
    Io(E),
}

impl<E> std::error::Error for SerializeError<E> where E: core::fmt::Debug + core::fmt::Display {}

impl<E> core::fmt::Display for SerializeError<E>
where
    E: core::fmt::Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Field(e) => write!(f, "could not encode field: {}", e),
            Self::Io(e) => e.fmt(f),
        }
    }
}

impl<E> From<FieldError> for SerializeError<E> {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

/// Requests that can be written out as frames.
pub trait MessageSerialize: MessageType {
    /// Device this request is addressed to. Only the stick init
    /// request goes without one.
    fn mac(&self) -> Option<&crate::Mac>;

    /// Serialize the checksummed part of the frame: function code, MAC
    /// and arguments.
    ///
    /// Arguments are encoded before anything is written, so a value
    /// that doesn't fit its field leaves the serializer untouched.
    fn message_body<S>(&self, ser: &mut S) -> Result<(), SerializeError<S::Error>>
    where
        S: Serializer,
    {
        let mut args = String::new();
        encode_fields(Self::FIELDS, &self.values(), &mut args)?;

        ser.write_hex_u16(Self::CODE).map_err(SerializeError::Io)?;
        if let Some(mac) = self.mac() {
            ser.write_bytes(mac.as_bytes())
                .map_err(SerializeError::Io)?;
        }
        ser.write_str(&args).map_err(SerializeError::Io)
    }

    /// Serialize the message into a full frame, with CRC and start/end
    /// markers.
    fn frame<S>(&self, ser: &mut S) -> Result<(), SerializeError<S::Error>>
    where
        S: Serializer,
    {
        // validate everything up front, so a failure writes nothing
        let mut body = SerializerVec::new();
        self.message_body(&mut body).map_err(|e| match e {
            SerializeError::Field(e) => SerializeError::Field(e),
            SerializeError::Io(never) => match never {},
        })?;

        // frame is start, body, crc of body, end
        ser.write_bytes(&super::FRAME_START)
            .map_err(SerializeError::Io)?;

        let mut crc_ser = SerializerCrc::new(CrcXModem.digest(), &mut *ser);
        crc_ser
            .write_bytes(&body.done())
            .map_err(SerializeError::Io)?;
        let (crc_val, ser) = crc_ser.finalize();

        ser.write_hex_u16(crc_val).map_err(SerializeError::Io)?;
        ser.write_bytes(&super::FRAME_END).map_err(SerializeError::Io)
    }
}
