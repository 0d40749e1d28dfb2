//! Response line parsing
//!
//! Every line the server sends is one of: the greeting (`OK MPD x.y.z`),
//! a `key: value` pair, `list_OK`, `OK`, or an `ACK [code@index] {command}
//! message` error. Binary payloads are framed by a `binary: <len>` pair and
//! read by the connection, not by this parser.

use std::fmt;

use rmpdc_core::error::{AckCode, Result, RmpdcError, ServerError};
use winnow::ascii::{digit1, space0};
use winnow::combinator::{opt, preceded};
use winnow::prelude::*;
use winnow::token::{rest, take_till, take_while};

const GREETING_PREFIX: &str = "OK MPD ";

/// Protocol version announced in the greeting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ProtocolVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    pub fn at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        *self >= Self::new(major, minor, patch)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One parsed response line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Ok,
    ListOk,
    Ack(ServerError),
    Pair(&'a str, &'a str),
}

pub fn parse_greeting(line: &str) -> Result<ProtocolVersion> {
    greeting
        .parse(line)
        .map_err(|_| RmpdcError::Protocol(format!("unexpected greeting: {:?}", line)))
}

pub fn parse_line(line: &str) -> Result<Line<'_>> {
    match line {
        "OK" => Ok(Line::Ok),
        "list_OK" => Ok(Line::ListOk),
        _ if line.starts_with("ACK ") => ack_line
            .parse(line)
            .map(Line::Ack)
            .map_err(|_| RmpdcError::Protocol(format!("malformed error line: {:?}", line))),
        _ => pair
            .parse(line)
            .map(|(key, value)| Line::Pair(key, value))
            .map_err(|_| RmpdcError::Protocol(format!("malformed response line: {:?}", line))),
    }
}

fn greeting(input: &mut &str) -> ModalResult<ProtocolVersion> {
    let _ = GREETING_PREFIX.parse_next(input)?;
    let major = parse_u32.parse_next(input)?;
    let _ = '.'.parse_next(input)?;
    let minor = parse_u32.parse_next(input)?;
    let patch = opt(preceded('.', parse_u32)).parse_next(input)?;
    let _ = space0.parse_next(input)?;
    Ok(ProtocolVersion::new(major, minor, patch.unwrap_or(0)))
}

fn ack_line(input: &mut &str) -> ModalResult<ServerError> {
    let _ = "ACK [".parse_next(input)?;
    let code = parse_u32.parse_next(input)?;
    let _ = '@'.parse_next(input)?;
    let command_list_index = parse_u32.parse_next(input)?;
    let _ = "] {".parse_next(input)?;
    let command = take_till(0.., '}').parse_next(input)?;
    let _ = '}'.parse_next(input)?;
    let _ = space0.parse_next(input)?;
    let message = rest.parse_next(input)?;

    Ok(ServerError {
        code: AckCode::from(code),
        command_list_index,
        command: command.to_string(),
        message: message.to_string(),
    })
}

fn pair<'a>(input: &mut &'a str) -> ModalResult<(&'a str, &'a str)> {
    let key = take_while(1.., |c: char| c != ':' && !c.is_whitespace()).parse_next(input)?;
    let _ = ':'.parse_next(input)?;
    let _ = opt(' ').parse_next(input)?;
    let value = rest.parse_next(input)?;
    Ok((key, value))
}

fn parse_u32(input: &mut &str) -> ModalResult<u32> {
    digit1.parse_to().parse_next(input)
}
