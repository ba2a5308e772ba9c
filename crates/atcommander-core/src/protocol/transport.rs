//! Transport capabilities
//!
//! The engine never touches hardware directly. Callers hand it something that
//! can move single bytes, sleep, and retune the host UART.

use std::io;

/// Byte-level access to the UART the device is attached to
pub trait Transport {
    /// Write a single byte to the device
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    /// Read a single byte, returning `None` when nothing is available yet
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u64);

    /// Reconfigure the host side of the link to a new baud rate
    fn set_host_baud(&mut self, baud: u32) -> io::Result<()>;

    /// Write every byte of a request
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn delay_ms(&mut self, ms: u64) {
        (**self).delay_ms(ms)
    }

    fn set_host_baud(&mut self, baud: u32) -> io::Result<()> {
        (**self).set_host_baud(baud)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }
}
