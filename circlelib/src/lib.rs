mod client;
pub use client::*;

mod device;
pub use device::*;

mod mac;
pub use mac::*;

pub mod protocol;

mod transport;
pub use transport::*;
