//! Line-delimited JSON messages exchanged between client and server.
//!
//! Every message is one JSON object on its own line, tagged by `type`.

use std::io::{BufRead, Read, Write};

use dpf_file::MeshDef;
use dpf_results::{EvalRequest, FieldsContainer, ResultInfo, TimeFreqSupport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{ServerError, ServerResult};

/// Opaque identifier of a file opened on the server.
pub type Handle = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Hello { client_version: String },
    Open { path: String },
    ResultInfo { handle: Handle },
    Mesh { handle: Handle },
    TimeFreqSupport { handle: Handle },
    Evaluate { handle: Handle, request: EvalRequest },
    Close { handle: Handle },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Hello { server_version: String },
    Opened { handle: Handle },
    ResultInfo { info: ResultInfo },
    Mesh { mesh: MeshDef },
    TimeFreqSupport { support: TimeFreqSupport },
    Fields { container: FieldsContainer },
    Ack,
    Error { kind: String, message: String },
}

impl Response {
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Response::Error {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Variant name, for logs and unexpected-response errors.
    pub fn name(&self) -> &'static str {
        match self {
            Response::Hello { .. } => "Hello",
            Response::Opened { .. } => "Opened",
            Response::ResultInfo { .. } => "ResultInfo",
            Response::Mesh { .. } => "Mesh",
            Response::TimeFreqSupport { .. } => "TimeFreqSupport",
            Response::Fields { .. } => "Fields",
            Response::Ack => "Ack",
            Response::Error { .. } => "Error",
        }
    }
}

/// Write one message followed by a newline.
pub fn write_message<T: Serialize>(writer: &mut impl Write, message: &T) -> ServerResult<()> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}

/// Longest line accepted by [`read_message`].
pub const MAX_MESSAGE_BYTES: u64 = 64 * 1024 * 1024;

/// Read one message; `None` at end of stream.
pub fn read_message<T: DeserializeOwned>(reader: &mut impl BufRead) -> ServerResult<Option<T>> {
    read_message_with_limit(reader, MAX_MESSAGE_BYTES)
}

/// Read one message of at most `limit` bytes, newline included.
pub fn read_message_with_limit<T: DeserializeOwned>(
    reader: &mut impl BufRead,
    limit: u64,
) -> ServerResult<Option<T>> {
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.by_ref().take(limit).read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if n as u64 == limit && !line.ends_with('\n') {
            return Err(ServerError::MessageTooLarge { limit });
        }
        if !line.trim().is_empty() {
            return Ok(Some(serde_json::from_str(line.trim_end())?));
        }
    }
}
