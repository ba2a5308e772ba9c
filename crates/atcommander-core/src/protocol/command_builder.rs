//! Command Builder
//!
//! Builds request bytes from AT command templates.
//!
//! Format string placeholders:
//! - %d : signed decimal integer
//! - %s : text
//! - %% : literal percent sign
//!
//! A template may contain at most one placeholder, and text arguments may
//! not carry control characters. Output is bounded: the transport has no
//! framing, so an over-long request is rejected rather than truncated.

use super::{ProtocolError, MAX_REQUEST_LENGTH};

/// Value substituted into a template slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg<'a> {
    Int(i64),
    Text(&'a str),
}

/// Build a request from an AT command template
#[derive(Debug, Clone, Copy)]
pub struct CommandBuilder {
    /// Hard cap on the formatted request length in bytes
    max_length: usize,
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new(MAX_REQUEST_LENGTH)
    }
}

impl CommandBuilder {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Maximum request length this builder accepts
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Format `template` with an optional argument
    /// e.g., "SU,%d\r" with Int(11) gives "SU,11\r"
    pub fn build(
        &self,
        template: &str,
        arg: Option<FormatArg<'_>>,
    ) -> Result<Vec<u8>, ProtocolError> {
        let mut result = Vec::with_capacity(template.len() + 8);
        let mut arg = arg;
        let mut slots = 0;
        let bytes = template.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'%' {
                let spec = bytes.get(i + 1).copied();
                match spec {
                    Some(b'%') => {
                        result.push(b'%');
                    }
                    Some(b'd') | Some(b's') => {
                        slots += 1;
                        if slots > 1 {
                            return Err(ProtocolError::InvalidFormat(format!(
                                "template {:?} has more than one placeholder",
                                template
                            )));
                        }
                        match (spec, arg.take()) {
                            (Some(b'd'), Some(FormatArg::Int(value))) => {
                                result.extend_from_slice(value.to_string().as_bytes());
                            }
                            (Some(b's'), Some(FormatArg::Text(text))) => {
                                // A CR or LF here would end the request early
                                // and start a second command on the device
                                if text.bytes().any(|b| b.is_ascii_control()) {
                                    return Err(ProtocolError::InvalidFormat(format!(
                                        "argument {:?} contains control characters",
                                        text
                                    )));
                                }
                                result.extend_from_slice(text.as_bytes());
                            }
                            (_, None) => {
                                return Err(ProtocolError::InvalidFormat(format!(
                                    "template {:?} needs an argument",
                                    template
                                )));
                            }
                            (_, Some(other)) => {
                                return Err(ProtocolError::InvalidFormat(format!(
                                    "argument {:?} does not match placeholder in {:?}",
                                    other, template
                                )));
                            }
                        }
                    }
                    _ => {
                        return Err(ProtocolError::InvalidFormat(format!(
                            "unsupported placeholder in template {:?}",
                            template
                        )));
                    }
                }
                i += 2;
                continue;
            }

            result.push(bytes[i]);
            i += 1;
        }

        if let Some(extra) = arg {
            return Err(ProtocolError::InvalidFormat(format!(
                "template {:?} has no placeholder for {:?}",
                template, extra
            )));
        }

        if result.len() > self.max_length {
            return Err(ProtocolError::RequestTooLarge {
                length: result.len(),
                max: self.max_length,
            });
        }

        Ok(result)
    }
}
