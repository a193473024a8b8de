use std::io::{Read, Write};
use std::time::Duration;

use circlelib::protocol::{CrcPolicy, FieldValue, BAUD_RATE};
use circlelib::{Client, LineTransport, Stick};

const FALLBACK_PORT: &str = "/dev/ttyUSB0";

/// How the stick is reached.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    /// A serial device, set up as 8N1.
    Serial,
    /// A raw TCP socket, as exposed by ser2net and friends.
    Tcp,
    /// A file or pipe, used as-is.
    File,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PortArgs {
    /// Serial device, TCP address, or file, depending on --via.
    #[arg(default_value_t = default_port())]
    port: String,
    #[arg(long, value_enum, default_value = "serial")]
    via: PortKind,
    #[arg(short, long, default_value_t = BAUD_RATE)]
    baud: u32,
    /// Seconds to wait for a response.
    #[arg(short, long, default_value_t = 5.0)]
    timeout: f64,
}

/// First USB serial adapter found, since that's what sticks show up as.
pub fn default_port() -> String {
    serialport::available_ports()
        .ok()
        .and_then(|ports| {
            ports
                .into_iter()
                .find(|p| matches!(p.port_type, serialport::SerialPortType::UsbPort(_)))
        })
        .map(|p| p.port_name)
        .unwrap_or_else(|| FALLBACK_PORT.to_owned())
}

/// An open connection to the stick.
pub enum Port {
    Serial(Box<dyn serialport::SerialPort>),
    Tcp(std::net::TcpStream),
    File(std::fs::File),
}

trait Stream: Read + Write {}
impl<T> Stream for T where T: Read + Write + ?Sized {}

impl Port {
    fn stream(&mut self) -> &mut dyn Stream {
        match self {
            Self::Serial(port) => port,
            Self::Tcp(port) => port,
            Self::File(port) => port,
        }
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serial(port) => f.debug_tuple("Serial").field(&port.name()).finish(),
            Self::Tcp(port) => f.debug_tuple("Tcp").field(&port.peer_addr().ok()).finish(),
            Self::File(_) => f.write_str("File"),
        }
    }
}

impl Read for Port {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream().read(buf)
    }
}

impl Write for Port {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stream().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream().flush()
    }
}

impl PortArgs {
    pub fn open(&self) -> anyhow::Result<Port> {
        anyhow::ensure!(self.timeout > 0.0, "timeout must be positive");
        let timeout = Duration::from_secs_f64(self.timeout);

        let port = match self.via {
            PortKind::Serial => Port::Serial(
                serialport::new(&self.port, self.baud)
                    .data_bits(serialport::DataBits::Eight)
                    .parity(serialport::Parity::None)
                    .stop_bits(serialport::StopBits::One)
                    .timeout(timeout)
                    .open()?,
            ),
            PortKind::Tcp => {
                let stream = std::net::TcpStream::connect(&self.port)?;
                stream.set_read_timeout(Some(timeout))?;
                Port::Tcp(stream)
            }
            PortKind::File => Port::File(
                std::fs::File::options()
                    .read(true)
                    .write(true)
                    .open(&self.port)?,
            ),
        };
        log::info!("opened {:?}", port);
        Ok(port)
    }
}

pub type ToolClient = Client<LineTransport<Port>, CrcPolicy>;

#[derive(clap::Args, Debug, Clone)]
pub struct ClientArgs {
    #[command(flatten)]
    port: PortArgs,
    /// Skip responses whose checksum doesn't match.
    #[arg(long)]
    verify_checksum: bool,
    /// Skip responses whose function code isn't the expected one.
    #[arg(long)]
    check_function_code: bool,
    /// Skip responses from devices other than the one asked.
    #[arg(long)]
    check_mac: bool,
    /// Don't initialize the stick first.
    #[arg(long)]
    skip_init: bool,
}

impl ClientArgs {
    /// Open the port and build a client, without touching the stick.
    pub fn open_uninit(&self) -> anyhow::Result<ToolClient> {
        let transport = LineTransport::new(self.port.open()?);
        Ok(
            Client::new_crc(CrcPolicy::verify(self.verify_checksum), transport)
                .check_function_code(self.check_function_code)
                .check_mac(self.check_mac),
        )
    }

    /// Open a client, and initialize the stick unless asked not to.
    pub fn open(&self) -> anyhow::Result<ToolClient> {
        let mut client = self.open_uninit()?;
        if !self.skip_init {
            Stick::init(&mut client)?;
        }
        Ok(client)
    }
}

/// Install the logger. Each `-d` raises the level one step from warn.
pub fn init_logging(debug: u8) {
    let level = match debug {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Print named field values, one per line.
pub fn print_fields(fields: &[(&'static str, FieldValue)]) {
    let width = fields.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    for (name, value) in fields {
        println!("{:>width$}: {}", name, value, width = width);
    }
}
