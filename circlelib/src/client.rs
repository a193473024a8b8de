use crate::protocol;
use crate::protocol::crc;
use crate::protocol::{FieldError, Frame, FrameError, MessageParse, MessageSerialize, Request};
use crate::{LineTransport, Mac, Transport};

/// An error type for [Client].
#[derive(Debug)]
pub enum ClientError {
    /// Nothing arrived before the transport's read timeout.
    Timeout,
    /// IO error in the underlying transport.
    Io(std::io::Error),
    /// The request could not be encoded.
    Field(FieldError),
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout => None,
            Self::Io(e) => Some(e),
            Self::Field(e) => Some(e),
        }
    }
}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out waiting for a response"),
            Self::Io(e) => write!(f, "io error: {}", e),
            Self::Field(e) => write!(f, "could not encode request: {}", e),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(other: std::io::Error) -> Self {
        Self::Io(other)
    }
}

impl From<FieldError> for ClientError {
    fn from(other: FieldError) -> Self {
        Self::Field(other)
    }
}

/// A client for the Circle serial protocol, talking through a stick.
///
/// One request is outstanding at a time. Responses that don't decode
/// as the one expected are treated as bus noise and skipped.
#[derive(Debug)]
pub struct Client<T, InC = crc::CrcUnchecked> {
    transport: T,
    in_crc: InC,
    check_function_code: bool,
    check_mac: bool,
}

impl<T> Client<T>
where
    T: Transport,
{
    /// Create a new client that accepts any response checksum.
    pub fn new(transport: T) -> Self {
        Client::new_crc(crc::CrcUnchecked, transport)
    }
}

impl<T> Client<T, crc::CrcXModem>
where
    T: Transport,
{
    /// Create a new client that skips responses with a bad checksum.
    pub fn new_verified(transport: T) -> Self {
        Client::new_crc(crc::CrcXModem::new(), transport)
    }
}

impl<F> Client<LineTransport<F>>
where
    F: std::io::Read + std::io::Write,
{
    /// Create a new client using an [std::io] port.
    pub fn new_std(port: F) -> Self {
        Self::new(LineTransport::new(port))
    }
}

impl<T, InC> Client<T, InC>
where
    T: Transport,
    InC: crc::CrcStyle,
{
    /// Create a new client with the provided incoming [crc::CrcStyle].
    pub fn new_crc(in_crc: InC, transport: T) -> Self {
        Self {
            transport,
            in_crc,
            check_function_code: false,
            check_mac: false,
        }
    }

    /// Also skip responses whose function code is not the expected
    /// response's.
    pub fn check_function_code(mut self, check: bool) -> Self {
        self.check_function_code = check;
        self
    }

    /// Also skip responses to a call that come from another device
    /// than the one the request went to.
    pub fn check_mac(mut self, check: bool) -> Self {
        self.check_mac = check;
        self
    }

    /// Release the components used to create this client.
    pub fn free(self) -> (InC, T) {
        (self.in_crc, self.transport)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the underlying transport, mutably.
    ///
    /// Reading from this directly may swallow a response.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Get the incoming [crc::CrcStyle] implementation.
    pub fn in_crc(&self) -> &InC {
        &self.in_crc
    }

    /// Write a message to the transport.
    pub fn send<M>(&mut self, msg: &M) -> Result<(), ClientError>
    where
        M: MessageSerialize,
    {
        let frame = protocol::serialize(msg)?;
        log::debug!("sending {:?}", msg);
        log::trace!("write: {}", frame.escape_ascii());
        self.transport.write_frame(&frame)?;
        Ok(())
    }

    /// Try to decode one raw frame as `M`.
    pub fn parse<M>(&self, raw: &[u8]) -> Result<Frame<M>, FrameError>
    where
        M: MessageParse,
    {
        let frame = protocol::parse::<M, _>(&self.in_crc, raw)?;
        if self.check_function_code {
            frame.check_function_code()
        } else {
            Ok(frame)
        }
    }

    /// Read frames until one decodes as `M`.
    ///
    /// Fails only on timeout or IO error. Everything else is skipped.
    pub fn read<M>(&mut self) -> Result<Frame<M>, ClientError>
    where
        M: MessageParse,
    {
        self.read_from(None)
    }

    /// Read frames until one decodes as `M`, and came from `sender`
    /// if given.
    fn read_from<M>(&mut self, sender: Option<Mac>) -> Result<Frame<M>, ClientError>
    where
        M: MessageParse,
    {
        loop {
            let raw = self.transport.read_frame()?;
            if raw.is_empty() {
                return Err(ClientError::Timeout);
            }
            log::trace!("read: {}", raw.escape_ascii());

            let parsed = self.parse::<M>(&raw);
            let parsed = match sender {
                Some(mac) => parsed.and_then(|frame| frame.check_mac(&mac)),
                None => parsed,
            };
            match parsed {
                Ok(frame) => {
                    log::debug!("received {:?}", frame.message);
                    return Ok(frame);
                }
                Err(e @ FrameError::Checksum { .. }) => {
                    log::warn!("skipping frame: {}", e);
                }
                Err(e) => {
                    log::debug!("skipping frame: {}", e);
                }
            }
        }
    }

    /// Send a request and wait for its response.
    pub fn call<R>(&mut self, req: &R) -> Result<R::Response, ClientError>
    where
        R: Request,
    {
        self.send(req)?;
        let sender = req.mac().copied().filter(|_| self.check_mac);
        Ok(self.read_from::<R::Response>(sender)?.message)
    }
}
