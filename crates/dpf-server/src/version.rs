//! Version strings of the client and the server.

use crate::{ServerError, ServerResult};

/// Version the server reports in its handshake.
pub const SERVER_VERSION: &str = "1.0.0";

/// Oldest server version this client can talk to.
pub const MIN_SERVER_VERSION: &str = "1.0";

/// Parse `major[.minor[.patch]]`; missing parts are 0, non-numeric parts read as 0.
pub fn version_tuple(version: &str) -> ServerResult<(u32, u32, u32)> {
    let parts: Vec<&str> = version.trim().split('.').collect();
    if parts.len() > 3 {
        return Err(ServerError::InvalidVersion(format!(
            "`{version}` has more than three parts"
        )));
    }
    let mut values = [0u32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part.parse().unwrap_or(0);
    }
    Ok((values[0], values[1], values[2]))
}

/// True when `version` is at least `meets`.
pub fn meets_version(version: &str, meets: &str) -> ServerResult<bool> {
    Ok(version_tuple(version)? >= version_tuple(meets)?)
}
