use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::frame::RenderedFrame;

/// `ErrorCode` of successful responses.
pub const STATUS_OK: u16 = 200;
/// `ErrorCode` of error responses.
pub const STATUS_ERROR: u16 = 500;

/// Type tag of the frame count query.
pub const GET_FRAME_COUNT: &str = "GETFRAMECOUNT";
/// Type tag of the range query.
pub const GET_DATA: &str = "GETDATA";

/// Raw request envelope. Both capitalized and lower-case keys are accepted.
#[derive(Debug, serde::Deserialize)]
struct Envelope {
    #[serde(rename = "Type", alias = "type")]
    kind: String,
    #[serde(rename = "Args", alias = "args", default)]
    args: Option<Value>,
}

/// A decoded, strongly typed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Report the number of cached frames.
    GetFrameCount,
    /// Stream frames `[from, to)`. Bounds are checked against the store at dispatch.
    GetData {
        /// Inclusive start.
        from: i64,
        /// Exclusive end.
        to: i64,
    },
}

/// A request the session answers with a single error response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Not JSON, or not a `{Type, Args}` object.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// Known command with missing or mistyped arguments.
    #[error("invalid arguments for {command}: {reason}")]
    InvalidArgs {
        /// Type tag of the offending request.
        command: String,
        /// What was wrong.
        reason: String,
    },

    /// Type tag nobody handles.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Range outside `0 <= from < to <= frame_count`.
    #[error("frame range [{from}, {to}) is out of bounds for {frame_count} frames")]
    OutOfRange {
        /// Requested start.
        from: i64,
        /// Requested end.
        to: i64,
        /// Frames in the store.
        frame_count: u64,
    },
}

impl RequestError {
    /// Type tag echoed in the error response. Empty when the request had no readable tag.
    pub fn response_type(&self) -> &str {
        match self {
            Self::Malformed(_) => "",
            Self::InvalidArgs { command, .. } => command,
            Self::UnknownCommand(tag) => tag,
            Self::OutOfRange { .. } => GET_DATA,
        }
    }
}

/// Decode one request message.
///
/// `Args` is only read for commands that take arguments, so a stray value on
/// `GETFRAMECOUNT` is ignored.
pub fn decode_request(text: &str) -> Result<Command, RequestError> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| RequestError::Malformed(e.to_string()))?;
    match envelope.kind.as_str() {
        GET_FRAME_COUNT => Ok(Command::GetFrameCount),
        GET_DATA => {
            let args = match envelope.args {
                None | Some(Value::Null) => Map::new(),
                Some(Value::Object(map)) => map,
                Some(other) => {
                    return Err(RequestError::InvalidArgs {
                        command: GET_DATA.to_owned(),
                        reason: format!("'Args' must be an object, got {other}"),
                    });
                }
            };
            let from = int_arg(&args, GET_DATA, "from")?;
            let to = int_arg(&args, GET_DATA, "to")?;
            Ok(Command::GetData { from, to })
        }
        _ => Err(RequestError::UnknownCommand(envelope.kind)),
    }
}

fn int_arg(args: &Map<String, Value>, command: &str, name: &str) -> Result<i64, RequestError> {
    let invalid = |reason: String| RequestError::InvalidArgs {
        command: command.to_owned(),
        reason,
    };
    match args.get(name) {
        None | Some(Value::Null) => Err(invalid(format!("missing '{name}'"))),
        Some(v) => v
            .as_i64()
            .ok_or_else(|| invalid(format!("'{name}' must be an integer, got {v}"))),
    }
}

/// Wire response: `{"ErrorCode": .., "Type": .., "Data": {..}}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Response {
    /// 200 on success, 500 on failure.
    #[serde(rename = "ErrorCode")]
    pub error_code: u16,
    /// Type tag of the request being answered.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Result fields.
    #[serde(rename = "Data")]
    pub data: ResponseData,
}

/// Result fields of a [`Response`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Answer to `GETFRAMECOUNT`.
    FrameCount {
        /// Frames in the store.
        #[serde(rename = "FrameCount")]
        frame_count: u64,
    },
    /// One frame of a `GETDATA` stream.
    Frame {
        /// Base64 of the stored payload bytes.
        #[serde(rename = "Frame")]
        frame: String,
    },
    /// Failure description.
    Error {
        /// Human-readable message.
        #[serde(rename = "Err")]
        err: String,
    },
}

impl Response {
    /// `{200, "GETFRAMECOUNT", {"FrameCount": n}}`.
    pub fn frame_count(frame_count: u64) -> Self {
        Self {
            error_code: STATUS_OK,
            kind: GET_FRAME_COUNT.to_owned(),
            data: ResponseData::FrameCount { frame_count },
        }
    }

    /// `{200, "GETDATA", {"Frame": base64}}`.
    pub fn frame(frame: &RenderedFrame) -> Self {
        Self {
            error_code: STATUS_OK,
            kind: GET_DATA.to_owned(),
            data: ResponseData::Frame {
                frame: STANDARD.encode(frame.as_bytes()),
            },
        }
    }

    /// `{500, <type>, {"Err": message}}`.
    pub fn error(err: &RequestError) -> Self {
        Self {
            error_code: STATUS_ERROR,
            kind: err.response_type().to_owned(),
            data: ResponseData::Error {
                err: err.to_string(),
            },
        }
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> ReelResult<String> {
        serde_json::to_string(self).map_err(|e| ReelError::serde(e.to_string()))
    }

    /// Decode the payload of a frame response.
    pub fn frame_bytes(&self) -> Option<Vec<u8>> {
        match &self.data {
            ResponseData::Frame { frame } => STANDARD.decode(frame).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/server/protocol.rs"]
mod tests;
