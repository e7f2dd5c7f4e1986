//! Byte sink the engine writes frames to

use std::{
    io::{self, Write},
    net::TcpStream,
};

/// Write half of the connection.
///
/// The engine never opens or closes it; it only writes whole frames and
/// reports short writes to the caller.
pub trait Transport {
    /// Write as much of `buf` as possible, returning the number of bytes taken
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

impl Transport for TcpStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Write::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self)
    }

    fn is_connected(&self) -> bool {
        self.peer_addr().is_ok()
    }
}

/// Capture buffer
impl Transport for Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }
}
