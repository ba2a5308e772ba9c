//! Response reader
//!
//! Accumulates bytes from the transport until the requested count is reached,
//! a CRLF terminator follows at least two payload bytes, or the retry budget
//! runs out. Retries are counted over the whole read and are never reset by a
//! successful byte.

use std::io;

use super::Transport;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Read up to `max_bytes` payload bytes from the transport.
///
/// CR and LF are never placed in the returned buffer. The result may be
/// shorter than `max_bytes` when the device stops talking.
pub fn read_response<T: Transport + ?Sized>(
    transport: &mut T,
    max_bytes: usize,
    max_retries: u32,
    retry_delay_ms: u64,
) -> io::Result<Vec<u8>> {
    let mut response = Vec::with_capacity(max_bytes);
    let mut retries = 0;
    let mut last_byte: Option<u8> = None;

    while response.len() < max_bytes && retries < max_retries {
        match transport.read_byte()? {
            None => {
                transport.delay_ms(retry_delay_ms);
                retries += 1;
            }
            Some(byte) => {
                let terminated = last_byte == Some(CR) && byte == LF;
                last_byte = Some(byte);

                if byte != CR && byte != LF {
                    response.push(byte);
                }

                if terminated && response.len() >= 2 {
                    break;
                }
            }
        }
    }

    tracing::debug!(
        "read_response: {} of {} bytes after {} retries: {:?}",
        response.len(),
        max_bytes,
        retries,
        String::from_utf8_lossy(&response)
    );

    Ok(response)
}
