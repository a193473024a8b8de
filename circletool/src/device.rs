use chrono::NaiveDateTime;
use circlelib::protocol::MessageType;
use circlelib::{Circle, Mac, Stick};

use crate::common::{print_fields, ClientArgs};

#[derive(clap::Args, Debug)]
pub struct InitOpts {
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for InitOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut client = self.client.open_uninit()?;
        let resp = Stick::init(&mut client)?;
        print_fields(&resp.to_map());
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
pub struct CalibrateOpts {
    #[arg(short, long)]
    mac: Mac,
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for CalibrateOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut client = self.client.open()?;
        let cal = Circle::from_mac(self.mac).calibrate(&mut client)?;
        print_fields(&cal.to_map());
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
pub struct InfoOpts {
    #[arg(short, long)]
    mac: Mac,
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for InfoOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut client = self.client.open()?;
        let info = Circle::from_mac(self.mac).info(&mut client)?;
        print_fields(&info.to_map());
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
pub struct ClockOpts {
    #[arg(short, long)]
    mac: Mac,
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for ClockOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut client = self.client.open()?;
        let time = Circle::from_mac(self.mac).clock(&mut client)?;
        println!("{}", time);
        Ok(())
    }
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
}

#[derive(clap::Args, Debug)]
pub struct SetClockOpts {
    #[arg(short, long)]
    mac: Mac,
    /// Time to set, as "YYYY-MM-DD HH:MM:SS". Defaults to local time now.
    #[arg(long, value_parser = parse_datetime)]
    at: Option<NaiveDateTime>,
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for SetClockOpts {
    fn run(&self) -> anyhow::Result<()> {
        let datetime = self
            .at
            .unwrap_or_else(|| chrono::Local::now().naive_local());

        let mut client = self.client.open()?;
        let set = Circle::from_mac(self.mac).set_clock(&mut client, datetime)?;
        println!("clock set to {}", set);
        Ok(())
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    On,
    Off,
}

#[derive(clap::Args, Debug)]
pub struct SwitchOpts {
    #[arg(short, long)]
    mac: Mac,
    #[arg(value_enum)]
    state: SwitchState,
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for SwitchOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut client = self.client.open()?;
        let circle = Circle::from_mac(self.mac);
        match self.state {
            SwitchState::On => circle.switch_on(&mut client)?,
            SwitchState::Off => circle.switch_off(&mut client)?,
        }
        Ok(())
    }
}

#[derive(clap::Args, Debug)]
pub struct HistoryOpts {
    #[arg(short, long)]
    mac: Mac,
    /// First log buffer slot to read. Defaults to the most recent one.
    #[arg(short, long)]
    slot: Option<u32>,
    /// Number of slots to read, going back from the first.
    #[arg(short, long, default_value_t = 1)]
    count: u32,
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for HistoryOpts {
    fn run(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.count > 0, "count must be at least 1");

        let mut client = self.client.open()?;
        let mut circle = Circle::from_mac(self.mac);
        let cal = circle.calibration(&mut client)?.clone();

        let first = match self.slot {
            Some(slot) => slot,
            None => circle.info(&mut client)?.last_logaddr,
        };

        for slot in (0..=first).rev().take(self.count as usize) {
            let buffer = circle.power_buffer(&mut client, slot)?;
            for entry in buffer.filled() {
                println!(
                    "{:>6} {} {:>10} pulses {:>8.3} kWh",
                    buffer.logaddr,
                    entry.datetime,
                    entry.pulses,
                    crate::power::hourly_kwh(&cal, entry.pulses)
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn datetime_formats() {
        let expected = chrono::NaiveDate::from_ymd_opt(2011, 5, 3)
            .unwrap()
            .and_hms_opt(10, 30, 15)
            .unwrap();
        assert_eq!(parse_datetime("2011-05-03 10:30:15").unwrap(), expected);
        assert_eq!(parse_datetime("2011-05-03T10:30:15").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }
}
