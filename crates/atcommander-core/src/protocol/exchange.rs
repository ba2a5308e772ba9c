//! Request/response exchanges
//!
//! An exchange writes one formatted request, waits for the platform's settle
//! time, then reads and checks the answer. Each exchange is attempted exactly
//! once; retrying across baud rates is the engine's job.

use serde::{Deserialize, Serialize};

use super::{
    command_builder::{CommandBuilder, FormatArg},
    read_response, AtCommand, PlatformProfile, ProtocolError, Transport, MAX_RETRIES,
    RETRY_DELAY_MS,
};

/// Bounds on how long a single response read may keep polling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Empty reads tolerated per response
    pub max_retries: u32,
    /// Sleep after each empty read
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            retry_delay_ms: RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    /// Worst-case time spent polling for one response, excluding the settle delay
    pub fn worst_case_ms(&self) -> u64 {
        u64::from(self.max_retries) * self.retry_delay_ms
    }
}

/// Format a request and push it onto the wire, then wait for the device
fn send_request<T: Transport + ?Sized>(
    transport: &mut T,
    profile: &PlatformProfile,
    builder: &CommandBuilder,
    command: &AtCommand,
    arg: Option<FormatArg<'_>>,
) -> Result<(), ProtocolError> {
    let request = builder.build(command.request_format, arg)?;

    tracing::debug!(
        "send_request: {} bytes: {:?}",
        request.len(),
        String::from_utf8_lossy(&request)
    );

    transport.write_all(&request)?;
    transport.delay_ms(profile.response_delay_ms);
    Ok(())
}

/// Send a command and verify the device answers with its expected token.
///
/// Commands without an expected response are fire-and-forget: they succeed
/// once the request has been written.
pub fn set_request<T: Transport + ?Sized>(
    transport: &mut T,
    profile: &PlatformProfile,
    builder: &CommandBuilder,
    policy: &RetryPolicy,
    command: &AtCommand,
    arg: Option<FormatArg<'_>>,
) -> Result<(), ProtocolError> {
    send_request(transport, profile, builder, command, arg)?;

    let Some(expected) = command.expected_response else {
        return Ok(());
    };

    let response = read_response(
        transport,
        expected.len(),
        policy.max_retries,
        policy.retry_delay_ms,
    )?;

    check_response(&response, expected)
}

/// Compare a response against the expected token, logging any mismatch
fn check_response(response: &[u8], expected: &str) -> Result<(), ProtocolError> {
    if response == expected.as_bytes() {
        return Ok(());
    }

    let actual = String::from_utf8_lossy(response).into_owned();
    if response.len() != expected.len() {
        tracing::warn!(
            "Expected {} bytes in response but received {}",
            expected.len(),
            response.len()
        );
    }
    if !response.is_empty() {
        tracing::warn!("Expected {:?} response but got {:?}", expected, actual);
    }

    Err(ProtocolError::UnexpectedResponse {
        expected: expected.to_string(),
        actual,
    })
}

/// Send a query and copy the answer into `buffer`.
///
/// At most `buffer.len() - 1` bytes are read; the byte after the response is
/// set to zero so the buffer can be handed to C-string consumers. Returns the
/// number of response bytes, or `KnownErrorResponse` if the answer starts with
/// the platform's error token.
pub fn get_request<T: Transport + ?Sized>(
    transport: &mut T,
    profile: &PlatformProfile,
    builder: &CommandBuilder,
    policy: &RetryPolicy,
    command: &AtCommand,
    buffer: &mut [u8],
) -> Result<usize, ProtocolError> {
    if buffer.is_empty() {
        return Err(ProtocolError::BufferTooSmall);
    }

    send_request(transport, profile, builder, command, None)?;

    let capacity = buffer.len() - 1;
    let response = read_response(transport, capacity, policy.max_retries, policy.retry_delay_ms)?;
    let length = response.len();
    buffer[..length].copy_from_slice(&response);
    buffer[length] = 0;

    if let Some(error) = command.error_response {
        if response.starts_with(error.as_bytes()) {
            tracing::warn!(
                "Device answered {:?} with error {:?}",
                command.request_format,
                error
            );
            return Err(ProtocolError::KnownErrorResponse(error.to_string()));
        }
    }

    Ok(length)
}
