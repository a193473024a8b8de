use chrono::{NaiveDateTime, NaiveTime};

use crate::protocol::crc::CrcStyle;
use crate::protocol::{
    CalibrationRequest, CalibrationResponse, ClockInfoRequest, ClockSetRequest, InfoRequest,
    InfoResponse, InitRequest, InitResponse, PowerBufferRequest, PowerBufferResponse,
    PowerUsageRequest, PowerUsageResponse, SwitchRequest,
};
use crate::{Client, ClientError, Mac, MacError, Transport};

/// The USB stick every Circle is reached through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Stick;

impl Stick {
    /// Wake the stick up. This must be done once before talking to
    /// any Circle.
    pub fn init<T, C>(client: &mut Client<T, C>) -> Result<InitResponse, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        let resp = client.call(&InitRequest)?;
        log::info!(
            "stick initialized, network {:016X} {}",
            resp.network_id,
            if resp.network_is_online {
                "online"
            } else {
                "offline"
            }
        );
        Ok(resp)
    }
}

/// A Circle smartplug, addressed by MAC.
///
/// This holds no connection. Every call borrows the client it goes
/// through. Calibration is remembered once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    mac: Mac,
    calibration: Option<CalibrationResponse>,
}

impl Circle {
    /// Address a Circle by its MAC, failing before any IO if it is
    /// malformed.
    pub fn new(mac: &str) -> Result<Self, MacError> {
        Ok(Self::from_mac(Mac::new(mac)?))
    }

    pub fn from_mac(mac: Mac) -> Self {
        Self {
            mac,
            calibration: None,
        }
    }

    pub fn mac(&self) -> &Mac {
        &self.mac
    }

    /// Power curve coefficients, fetched on first use and kept after.
    pub fn calibration<T, C>(
        &mut self,
        client: &mut Client<T, C>,
    ) -> Result<&CalibrationResponse, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        let cal = match self.calibration.take() {
            Some(cal) => cal,
            None => self.calibrate(client)?,
        };
        Ok(self.calibration.insert(cal))
    }

    /// Fetch the power curve coefficients, always asking the device.
    pub fn calibrate<T, C>(
        &self,
        client: &mut Client<T, C>,
    ) -> Result<CalibrationResponse, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        client.call(&CalibrationRequest::new(self.mac))
    }

    /// Fetch the raw pulse counters.
    pub fn power_usage<T, C>(
        &self,
        client: &mut Client<T, C>,
    ) -> Result<PowerUsageResponse, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        client.call(&PowerUsageRequest::new(self.mac))
    }

    /// Fetch clock, relay and log buffer state.
    pub fn info<T, C>(&self, client: &mut Client<T, C>) -> Result<InfoResponse, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        client.call(&InfoRequest::new(self.mac))
    }

    /// Fetch the time of day from the device clock.
    pub fn clock<T, C>(&self, client: &mut Client<T, C>) -> Result<NaiveTime, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        Ok(client.call(&ClockInfoRequest::new(self.mac))?.time)
    }

    /// Set the device clock. The device does not answer.
    pub fn set_clock<T, C>(
        &self,
        client: &mut Client<T, C>,
        datetime: NaiveDateTime,
    ) -> Result<NaiveDateTime, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        client.send(&ClockSetRequest::new(self.mac, datetime))?;
        Ok(datetime)
    }

    /// Switch the relay. The device does not answer.
    pub fn switch<T, C>(&self, client: &mut Client<T, C>, on: bool) -> Result<(), ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        client.send(&SwitchRequest::new(self.mac, on))
    }

    pub fn switch_on<T, C>(&self, client: &mut Client<T, C>) -> Result<(), ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        self.switch(client, true)
    }

    pub fn switch_off<T, C>(&self, client: &mut Client<T, C>) -> Result<(), ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        self.switch(client, false)
    }

    /// Read one slot of hourly consumption history.
    pub fn power_buffer<T, C>(
        &self,
        client: &mut Client<T, C>,
        slot: u32,
    ) -> Result<PowerBufferResponse, ClientError>
    where
        T: Transport,
        C: CrcStyle,
    {
        client.call(&PowerBufferRequest::new(self.mac, slot))
    }
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;
    use crate::client::test::{calibration_frame, ScriptedTransport, MAC};
    use crate::protocol::parse::test::response;
    use crate::protocol::serialize;

    #[test]
    fn bad_mac_before_io() {
        assert_eq!(Circle::new("0123"), Err(MacError::WrongLength(4)));
        assert_eq!(
            Circle::new("0123456789abcdef").unwrap().mac().as_str(),
            MAC
        );
    }

    #[test]
    fn stick_init() {
        let mut client = Client::new(ScriptedTransport::new([response(
            "00110001000D6F0000B1B64F0001000D6F0000B1B64F4F4FFF",
        )]));
        let resp = Stick::init(&mut client).unwrap();
        assert!(resp.network_is_online);

        let (_, transport) = client.free();
        assert_eq!(transport.written, vec![b"\x05\x05\x03\x03000AB43C\r\n".to_vec()]);
    }

    #[test]
    fn switch_does_not_wait() {
        let circle = Circle::new(MAC).unwrap();
        let mut client = Client::new(ScriptedTransport::default());
        circle.switch_on(&mut client).unwrap();
        circle.switch_off(&mut client).unwrap();

        let (_, transport) = client.free();
        assert_eq!(
            transport.written,
            vec![
                b"\x05\x05\x03\x0300170123456789ABCDEF01703A\r\n".to_vec(),
                b"\x05\x05\x03\x0300170123456789ABCDEF00601B\r\n".to_vec(),
            ]
        );
    }

    #[test]
    fn set_clock_does_not_wait() {
        let circle = Circle::new(MAC).unwrap();
        let dt = NaiveDate::from_ymd_opt(2011, 5, 3)
            .unwrap()
            .and_hms_opt(10, 30, 15)
            .unwrap();
        let mut client = Client::new(ScriptedTransport::default());
        assert_eq!(circle.set_clock(&mut client, dt).unwrap(), dt);

        let (_, transport) = client.free();
        assert_eq!(
            transport.written,
            vec![serialize(&ClockSetRequest::new(*circle.mac(), dt)).unwrap()]
        );
    }

    #[test]
    fn calibrate_and_clock() {
        let circle = Circle::new(MAC).unwrap();
        let mut client = Client::new(ScriptedTransport::new([
            calibration_frame(),
            response(&format!("003F0002{}0A1E0F01000000", MAC)),
        ]));
        assert_eq!(circle.calibrate(&mut client).unwrap().off_ruis, 1.0);
        assert_eq!(
            circle.clock(&mut client).unwrap(),
            NaiveTime::from_hms_opt(10, 30, 15).unwrap()
        );
    }

    #[test]
    fn calibration_is_kept() {
        let mut circle = Circle::new(MAC).unwrap();
        let mut client = Client::new(ScriptedTransport::new([calibration_frame()]));
        assert_eq!(circle.calibration(&mut client).unwrap().gain_a, 1.0);
        assert_eq!(circle.calibration(&mut client).unwrap().gain_b, 1.0);

        let (_, transport) = client.free();
        assert_eq!(
            transport.written,
            vec![serialize(&CalibrationRequest::new(*circle.mac())).unwrap()]
        );
    }

    #[test]
    fn calibration_retried_after_timeout() {
        let mut circle = Circle::new(MAC).unwrap();
        let mut client = Client::new(ScriptedTransport::default());
        assert!(matches!(
            circle.calibration(&mut client),
            Err(ClientError::Timeout)
        ));

        let (_, transport) = client.free();
        let mut client = Client::new(ScriptedTransport::new([calibration_frame()]));
        assert_eq!(transport.written.len(), 1);
        assert_eq!(circle.calibration(&mut client).unwrap().off_tot, 1.0);
    }

    #[test]
    fn partly_written_slot() {
        let circle = Circle::new(MAC).unwrap();
        let mut client = Client::new(ScriptedTransport::new([response(&format!(
            "00490007{}0B050D9800000010{}00044060",
            MAC,
            "FFFFFFFFFFFFFFFF".repeat(3)
        ))]));
        let buffer = circle.power_buffer(&mut client, 3).unwrap();
        assert_eq!(buffer.filled().count(), 1);
        assert_eq!(buffer.filled().next().unwrap().pulses, 0x10);
        assert!(buffer.entries[1..].iter().all(Option::is_none));
    }

    #[test]
    fn power_buffer_requests_slot() {
        let circle = Circle::new(MAC).unwrap();
        let mut client = Client::new(ScriptedTransport::default());
        assert!(matches!(
            circle.power_buffer(&mut client, 2),
            Err(ClientError::Timeout)
        ));

        let (_, transport) = client.free();
        assert_eq!(
            transport.written,
            vec![serialize(&PowerBufferRequest::new(*circle.mac(), 2)).unwrap()]
        );
    }

    #[test]
    fn circles_share_a_client() {
        let a = Circle::new("000D6F0000B1B64F").unwrap();
        let b = Circle::new(MAC).unwrap();
        let mut client = Client::new(ScriptedTransport::new([
            calibration_frame(),
            calibration_frame(),
        ]));
        a.switch_on(&mut client).unwrap();
        b.calibrate(&mut client).unwrap();
        assert!(a.info(&mut client).is_err());
        assert!(b.power_usage(&mut client).is_err());
    }
}
