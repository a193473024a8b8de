use std::io::{ErrorKind, Read, Write};

use crate::protocol::{FRAME_END, MAX_FRAME_SIZE};

/// A duplex channel that moves whole frames.
pub trait Transport {
    /// Write one complete frame.
    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()>;

    /// Read one delimited frame, including its line ending.
    ///
    /// An empty frame means nothing arrived before the read timeout
    /// (or the other end closed).
    fn read_frame(&mut self) -> std::io::Result<Vec<u8>>;
}

impl<T> Transport for &mut T
where
    T: Transport + ?Sized,
{
    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        (**self).write_frame(frame)
    }

    fn read_frame(&mut self) -> std::io::Result<Vec<u8>> {
        (**self).read_frame()
    }
}

impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        (**self).write_frame(frame)
    }

    fn read_frame(&mut self) -> std::io::Result<Vec<u8>> {
        (**self).read_frame()
    }
}

/// A [Transport] over any [std::io] stream, splitting frames at line
/// endings.
///
/// Read timeouts are whatever the underlying port is configured with.
#[derive(Debug)]
pub struct LineTransport<F> {
    port: F,
    buffer: Vec<u8>,
}

impl<F> LineTransport<F> {
    pub fn new(port: F) -> Self {
        Self {
            port,
            buffer: Vec::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// Release the port, dropping any buffered partial frame.
    pub fn free(self) -> F {
        self.port
    }

    pub fn port(&self) -> &F {
        &self.port
    }

    /// Get the underlying port, mutably.
    ///
    /// Reading from this directly can split a frame in half.
    pub fn port_mut(&mut self) -> &mut F {
        &mut self.port
    }

    /// Remove the first complete line from the buffer, if there is one.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        let end_byte = FRAME_END[FRAME_END.len() - 1];
        let end = self.buffer.iter().position(|b| *b == end_byte)?;
        let rest = self.buffer.split_off(end + 1);
        Some(std::mem::replace(&mut self.buffer, rest))
    }

    fn take_all(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}

impl<F> Transport for LineTransport<F>
where
    F: Read + Write,
{
    fn write_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()
    }

    fn read_frame(&mut self) -> std::io::Result<Vec<u8>> {
        let mut chunk = [0u8; 64];
        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }

            // a runaway line with no ending is handed over as-is
            if self.buffer.len() >= MAX_FRAME_SIZE {
                return Ok(self.take_all());
            }

            let want = chunk.len().min(MAX_FRAME_SIZE - self.buffer.len());
            match self.port.read(&mut chunk[..want]) {
                Ok(0) => return Ok(self.take_all()),
                Ok(amt) => self.buffer.extend_from_slice(&chunk[..amt]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(self.take_all())
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::VecDeque;

    use super::*;

    /// An in-memory port: reads come from a script of chunks, writes
    /// are collected. An empty chunk reads as a timeout.
    #[derive(Debug, Default)]
    pub(crate) struct Duplex {
        pub(crate) input: VecDeque<Vec<u8>>,
        pub(crate) output: Vec<u8>,
    }

    impl Duplex {
        pub(crate) fn new<I, C>(chunks: I) -> Self
        where
            I: IntoIterator<Item = C>,
            C: AsRef<[u8]>,
        {
            Self {
                input: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
                output: Vec::new(),
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let Some(mut chunk) = self.input.pop_front() else {
                return Ok(0);
            };
            if chunk.is_empty() {
                return Err(ErrorKind::TimedOut.into());
            }
            let amt = buf.len().min(chunk.len());
            buf[..amt].copy_from_slice(&chunk[..amt]);
            if amt < chunk.len() {
                let rest = chunk.split_off(amt);
                self.input.push_front(rest);
            }
            Ok(amt)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn splits_lines() {
        let mut t = LineTransport::new(Duplex::new(["abc\r\nde", "f\r\n"]));
        assert_eq!(t.read_frame().unwrap(), b"abc\r\n");
        assert_eq!(t.read_frame().unwrap(), b"def\r\n");
        assert_eq!(t.read_frame().unwrap(), b"");
    }

    #[test]
    fn timeout_returns_partial() {
        let mut t = LineTransport::new(Duplex::new(["abc", "", "def\r\n"]));
        assert_eq!(t.read_frame().unwrap(), b"abc");
        assert_eq!(t.read_frame().unwrap(), b"def\r\n");
    }

    #[test]
    fn timeout_with_nothing_is_empty() {
        let mut t = LineTransport::new(Duplex::new([""]));
        assert_eq!(t.read_frame().unwrap(), b"");
    }

    #[test]
    fn runaway_line() {
        let long = vec![b'x'; MAX_FRAME_SIZE + 10];
        let mut t = LineTransport::new(Duplex::new([long.as_slice(), b"\n".as_slice()]));
        assert_eq!(t.read_frame().unwrap().len(), MAX_FRAME_SIZE);
        assert_eq!(t.read_frame().unwrap(), b"xxxxxxxxxx\n");
    }

    #[test]
    fn writes_whole_frame() {
        let mut t = LineTransport::new(Duplex::default());
        t.write_frame(b"hello\r\n").unwrap();
        assert_eq!(t.free().output, b"hello\r\n");
    }

    #[test]
    fn io_errors_pass_through() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(ErrorKind::BrokenPipe.into())
            }
        }
        impl Write for Broken {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut t = LineTransport::new(Broken);
        assert_eq!(
            t.read_frame().unwrap_err().kind(),
            ErrorKind::BrokenPipe
        );
    }
}
