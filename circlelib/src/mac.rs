/// Number of hex digits in a device MAC address.
pub const MAC_LEN: usize = 16;

/// A validated device MAC address: exactly [MAC_LEN] uppercase hex digits.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Mac([u8; MAC_LEN]);

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MacError {
    /// Address did not have exactly [MAC_LEN] characters.
    WrongLength(usize),
    /// Address contained something other than a hex digit.
    NotHex(char),
}

impl std::error::Error for MacError {}

impl core::fmt::Display for MacError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            MacError::WrongLength(len) => write!(
                f,
                "MAC address must be {} hex digits, got {}",
                MAC_LEN, len
            ),
            MacError::NotHex(c) => write!(f, "MAC address contains non-hex character {:?}", c),
        }
    }
}

impl Mac {
    /// Parse a MAC address. Lowercase hex digits are accepted and
    /// stored uppercase.
    pub fn new(mac: &str) -> Result<Self, MacError> {
        Self::new_from_bytes(mac.as_bytes())
    }

    pub fn new_from_bytes(bytes: &[u8]) -> Result<Self, MacError> {
        if bytes.len() != MAC_LEN {
            return Err(MacError::WrongLength(bytes.len()));
        }

        let mut data = [0; MAC_LEN];
        for (d, b) in data.iter_mut().zip(bytes.iter()) {
            if !b.is_ascii_hexdigit() {
                return Err(MacError::NotHex(*b as char));
            }
            *d = b.to_ascii_uppercase();
        }

        Ok(Self(data))
    }

    pub fn as_str(&self) -> &str {
        // only ascii hex digits ever make it in here
        core::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::str::FromStr for Mac {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl core::fmt::Debug for Mac {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error> {
        f.debug_tuple("Mac").field(&self.as_str()).finish()
    }
}

impl core::fmt::Display for Mac {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error> {
        f.write_str(self.as_str())
    }
}
