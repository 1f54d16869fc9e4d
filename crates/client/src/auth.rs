//! Basic authentication header construction.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::HeaderValue;

use crate::ClientError;

/// Builds `Authorization: Basic <base64(userinfo)>`.
///
/// The caller decides the user-info layout: GitHub accepts the bare token,
/// Azure DevOps expects an empty user name (`":" + token`). The returned value
/// is marked sensitive so it is omitted from debug output.
pub fn basic_authorization(userinfo: &str) -> Result<HeaderValue, ClientError> {
    let encoded = STANDARD.encode(userinfo.as_bytes());
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|_| ClientError::InvalidHeader { name: "authorization" })?;
    value.set_sensitive(true);
    Ok(value)
}
