//! Frame checksums.
//!
//! Both directions use CRC-16/XMODEM over the text between the frame
//! start marker and the checksum itself. Outgoing frames always carry
//! the real value. What differs is how strictly incoming frames are
//! held to it.

static XMODEM: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);

/// A running checksum over a frame body.
pub trait CrcDigest {
    fn update(&mut self, bytes: &[u8]);
    fn finalize(self) -> u16;
}

/// How checksums are computed and checked.
pub trait CrcStyle {
    type Digest: CrcDigest;

    fn digest(&self) -> Self::Digest;

    /// Whether a frame carrying `provided` is acceptable, given the
    /// value computed over its body.
    fn validate(&self, calculated: u16, provided: u16) -> bool {
        calculated == provided
    }

    /// Checksum a whole body at once.
    fn checksum(&self, body: &[u8]) -> u16 {
        let mut digest = self.digest();
        digest.update(body);
        digest.finalize()
    }
}

impl<C> CrcStyle for &C
where
    C: CrcStyle,
{
    type Digest = C::Digest;

    fn digest(&self) -> Self::Digest {
        (*self).digest()
    }

    fn validate(&self, calculated: u16, provided: u16) -> bool {
        (*self).validate(calculated, provided)
    }
}

/// Digest for all the styles here.
#[derive(Clone)]
pub struct XModemDigest(crc::Digest<'static, u16>);

impl XModemDigest {
    pub fn new() -> Self {
        Self(XMODEM.digest())
    }
}

impl Default for XModemDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl CrcDigest for XModemDigest {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes)
    }

    fn finalize(self) -> u16 {
        self.0.finalize()
    }
}

/// Polynomial 0x1021, zero init, no reflection, no final xor. Frames
/// that don't match are rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CrcXModem;

impl CrcXModem {
    pub const fn new() -> Self {
        Self
    }
}

impl CrcStyle for CrcXModem {
    type Digest = XModemDigest;

    fn digest(&self) -> Self::Digest {
        XModemDigest::new()
    }
}

/// Computes the same value as [CrcXModem], but accepts whatever a
/// frame provides. Deployed Circle software has always read responses
/// this way, so it is the client default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CrcUnchecked;

impl CrcStyle for CrcUnchecked {
    type Digest = XModemDigest;

    fn digest(&self) -> Self::Digest {
        XModemDigest::new()
    }

    fn validate(&self, _calculated: u16, _provided: u16) -> bool {
        true
    }
}

/// Checksum strictness chosen at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrcPolicy {
    #[default]
    Ignore,
    Verify,
}

impl CrcPolicy {
    pub fn verify(verify: bool) -> Self {
        if verify {
            Self::Verify
        } else {
            Self::Ignore
        }
    }
}

impl CrcStyle for CrcPolicy {
    type Digest = XModemDigest;

    fn digest(&self) -> Self::Digest {
        XModemDigest::new()
    }

    fn validate(&self, calculated: u16, provided: u16) -> bool {
        match self {
            Self::Ignore => CrcUnchecked.validate(calculated, provided),
            Self::Verify => CrcXModem.validate(calculated, provided),
        }
    }
}
