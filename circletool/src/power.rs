use circlelib::protocol::{CalibrationResponse, PowerUsageResponse};
use circlelib::Circle;

use crate::common::ClientArgs;

/// Corrected pulses per second that make one kilowatt.
pub const PULSES_PER_KW_SECOND: f64 = 468.9385193;

/// Turn a per-second pulse rate into watts, through the device's
/// power curve.
pub fn pulses_to_watts(cal: &CalibrationResponse, pulses_per_second: f64) -> f64 {
    let p = pulses_per_second + cal.off_ruis as f64;
    let corrected = p * p * cal.gain_b as f64 + p * cal.gain_a as f64 + cal.off_tot as f64;
    corrected / PULSES_PER_KW_SECOND * 1000.0
}

/// Watts over the last second and averaged over the last 8 seconds.
pub fn power_usage_watts(cal: &CalibrationResponse, usage: &PowerUsageResponse) -> (f64, f64) {
    (
        pulses_to_watts(cal, usage.pulse_1s as f64),
        pulses_to_watts(cal, usage.pulse_8s as f64 / 8.0),
    )
}

/// Energy used over one hour of history, in kilowatt hours.
pub fn hourly_kwh(cal: &CalibrationResponse, pulses: u32) -> f64 {
    pulses_to_watts(cal, pulses as f64 / 3600.0) / 1000.0
}

#[derive(clap::Args, Debug)]
pub struct PowerOpts {
    #[arg(short, long)]
    mac: circlelib::Mac,
    /// Also print the raw pulse counters.
    #[arg(long)]
    raw: bool,
    #[command(flatten)]
    client: ClientArgs,
}

impl crate::ToolRun for PowerOpts {
    fn run(&self) -> anyhow::Result<()> {
        let mut client = self.client.open()?;
        let mut circle = Circle::from_mac(self.mac);

        let cal = circle.calibration(&mut client)?.clone();
        let usage = circle.power_usage(&mut client)?;
        if self.raw {
            crate::common::print_fields(&circlelib::protocol::MessageType::to_map(&usage));
        }

        let (watts_1s, watts_8s) = power_usage_watts(&cal, &usage);
        println!("{:.2} W (1s), {:.2} W (8s)", watts_1s, watts_8s);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn linear() -> CalibrationResponse {
        CalibrationResponse {
            gain_a: 1.0,
            gain_b: 0.0,
            off_tot: 0.0,
            off_ruis: 0.0,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn one_kilowatt() {
        assert!(close(pulses_to_watts(&linear(), PULSES_PER_KW_SECOND), 1000.0));
        assert!(close(pulses_to_watts(&linear(), 0.0), 0.0));
    }

    #[test]
    fn curve_terms() {
        let cal = CalibrationResponse {
            gain_a: 2.0,
            gain_b: 0.5,
            off_tot: 1.0,
            off_ruis: 1.0,
        };
        // p = 3, 0.5 * 9 + 2 * 3 + 1 = 11.5
        let expected = 11.5 / PULSES_PER_KW_SECOND * 1000.0;
        assert!(close(pulses_to_watts(&cal, 2.0), expected));
    }

    #[test]
    fn eight_second_average() {
        let usage = PowerUsageResponse {
            pulse_1s: 10,
            pulse_8s: 80,
            pulse_total: 0,
            reserved: [0; 3],
        };
        let (w1, w8) = power_usage_watts(&linear(), &usage);
        assert!(close(w1, w8));
    }

    #[test]
    fn hour_of_one_kilowatt() {
        let pulses = (PULSES_PER_KW_SECOND * 3600.0).round() as u32;
        assert!((hourly_kwh(&linear(), pulses) - 1.0).abs() < 1e-3);
    }
}
