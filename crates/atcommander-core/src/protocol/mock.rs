//! Scripted transport
//!
//! Plays back a fixed byte script and records everything the engine does to
//! it. Used by the test suites and handy for dry runs without hardware.

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;

use super::Transport;

/// In-memory transport that replays scripted bytes
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    /// Pending reads. `None` entries simulate "no data yet".
    script: VecDeque<Option<u8>>,
    /// Bytes queued whenever the host switches to the given baud rate
    baud_responses: HashMap<u32, Vec<u8>>,
    /// Baud rates the host cannot be switched to
    rejected_bauds: HashSet<u32>,
    /// Fail every write with a broken pipe
    pub fail_writes: bool,
    /// Every byte written by the engine
    pub written: Vec<u8>,
    /// Every host baud rate selected, in order
    pub bauds: Vec<u32>,
    /// Every delay requested, in order
    pub delays: Vec<u64>,
    /// Number of read attempts, including empty ones
    pub read_attempts: usize,
}

impl MockTransport {
    /// A transport that never has data
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that returns `bytes` in order, then nothing
    pub fn with_response(bytes: &[u8]) -> Self {
        let mut mock = Self::new();
        mock.push_bytes(bytes);
        mock
    }

    /// Append bytes to the read script
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.script.extend(bytes.iter().copied().map(Some));
    }

    /// Append `count` empty reads to the script
    pub fn push_silence(&mut self, count: usize) {
        self.script.extend(std::iter::repeat(None).take(count));
    }

    /// Queue `bytes` each time the host switches to `baud`
    pub fn respond_at_baud(&mut self, baud: u32, bytes: &[u8]) {
        self.baud_responses.insert(baud, bytes.to_vec());
    }

    /// Make `set_host_baud` fail for `baud`
    pub fn reject_baud(&mut self, baud: u32) {
        self.rejected_bauds.insert(baud);
    }

    /// Number of scripted reads not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.len()
    }

    /// Everything written so far, as text
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }

    /// Check if the engine has performed any I/O at all
    pub fn is_untouched(&self) -> bool {
        self.written.is_empty()
            && self.bauds.is_empty()
            && self.delays.is_empty()
            && self.read_attempts == 0
    }
}

impl Transport for MockTransport {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
        }
        self.written.push(byte);
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.read_attempts += 1;
        Ok(self.script.pop_front().flatten())
    }

    fn delay_ms(&mut self, ms: u64) {
        self.delays.push(ms);
    }

    fn set_host_baud(&mut self, baud: u32) -> io::Result<()> {
        if self.rejected_bauds.contains(&baud) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("mock cannot run at {} baud", baud),
            ));
        }
        self.bauds.push(baud);
        if let Some(bytes) = self.baud_responses.get(&baud).cloned() {
            self.push_bytes(&bytes);
        }
        Ok(())
    }
}
