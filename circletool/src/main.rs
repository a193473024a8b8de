use clap::Parser;

mod common;
mod decode;
mod device;
mod power;

trait ToolRun {
    fn run(&self) -> anyhow::Result<()>;
}

/// Talk to Plugwise Circle smartplugs through a USB stick.
#[derive(Parser, Debug)]
#[command(version)]
struct ToolOptions {
    /// Log more. Repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(clap::Subcommand, Debug)]
enum ToolCommand {
    /// Initialize the stick and print network status.
    Init(device::InitOpts),
    /// Read a circle's calibration constants.
    Calibrate(device::CalibrateOpts),
    /// Read current power draw in watts.
    Power(power::PowerOpts),
    /// Read device info.
    Info(device::InfoOpts),
    /// Read the circle's clock.
    Clock(device::ClockOpts),
    /// Set the circle's clock.
    SetClock(device::SetClockOpts),
    /// Switch the relay on or off.
    Switch(device::SwitchOpts),
    /// Read hourly energy use from the log buffer.
    History(device::HistoryOpts),
    /// Decode response frames captured elsewhere.
    Decode(decode::DecodeOpts),
}

impl ToolRun for ToolCommand {
    fn run(&self) -> anyhow::Result<()> {
        use ToolCommand::*;
        match self {
            Init(o) => o.run(),
            Calibrate(o) => o.run(),
            Power(o) => o.run(),
            Info(o) => o.run(),
            Clock(o) => o.run(),
            SetClock(o) => o.run(),
            Switch(o) => o.run(),
            History(o) => o.run(),
            Decode(o) => o.run(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let opts = ToolOptions::parse();
    common::init_logging(opts.debug);
    opts.command.run()
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        ToolOptions::command().debug_assert();
    }

    #[test]
    fn parses_switch() {
        let args = [
            "circletool",
            "-dd",
            "switch",
            "-m",
            "0123456789abcdef",
            "on",
            "/dev/null",
        ];
        let opts = ToolOptions::try_parse_from(args).unwrap();
        assert_eq!(opts.debug, 2);
        assert!(matches!(opts.command, ToolCommand::Switch(_)));
    }

    #[test]
    fn rejects_bad_mac() {
        assert!(ToolOptions::try_parse_from(["circletool", "info", "-m", "0123"]).is_err());
    }
}
