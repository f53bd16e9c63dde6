//! Browser native-messaging host.
//!
//! Messages are UTF-8 JSON prefixed with their length as a native-endian
//! `u32`, in both directions.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use dotkit_core::{DotkitError, Result};

use crate::append::append_to_playlist;

/// Largest message accepted from the browser.
pub const MAX_MESSAGE_BYTES: u32 = 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct AddRequest {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AddReply {
    Added { added: bool },
    Error { error: String },
}

/// Read one framed message. `Ok(None)` on a clean EOF before any byte.
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    match read_frame(reader).await? {
        Some(body) => Ok(Some(serde_json::from_slice(&body)?)),
        None => Ok(None),
    }
}

/// Read the raw body of one framed message.
async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    let first = reader.read(&mut len_buf).await?;
    if first == 0 {
        return Ok(None);
    }
    reader.read_exact(&mut len_buf[first..]).await?;

    let len = u32::from_ne_bytes(len_buf);
    if len > MAX_MESSAGE_BYTES {
        return Err(DotkitError::InvalidInput(format!(
            "native message of {len} bytes exceeds {MAX_MESSAGE_BYTES}"
        )));
    }

    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    Ok(Some(body))
}

/// Write one framed message and flush.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(message)?;
    let len = u32::try_from(body.len())
        .map_err(|_| DotkitError::InvalidInput("native reply too large".into()))?;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(&body).await?;
    writer.flush().await?;
    Ok(())
}

/// Serve a single add request from the browser.
pub async fn serve_one<R, W>(reader: &mut R, writer: &mut W, playlist: &Path) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(body) = read_frame(reader).await? else {
        debug!("no native message received");
        return Ok(());
    };
    let request: AddRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed native message");
            let e = DotkitError::from(e);
            write_message(writer, &AddReply::Error { error: e.to_string() }).await?;
            return Err(e);
        }
    };

    let title = request.title.as_deref().unwrap_or_default();
    match append_to_playlist(&request.url, title, playlist, false) {
        Ok(added) => write_message(writer, &AddReply::Added { added }).await,
        Err(e) => {
            warn!(url = %request.url, error = %e, "native append failed");
            write_message(writer, &AddReply::Error { error: e.to_string() }).await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(json: &str) -> Vec<u8> {
        let mut out = (json.len() as u32).to_ne_bytes().to_vec();
        out.extend_from_slice(json.as_bytes());
        out
    }

    #[tokio::test]
    async fn test_read_message_eof_is_none() {
        let mut input: &[u8] = &[];
        let msg: Option<AddRequest> = read_message(&mut input).await.unwrap();
        assert!(msg.is_none());
    }

    #[tokio::test]
    async fn test_read_message_rejects_oversized() {
        let mut input: &[u8] = &(MAX_MESSAGE_BYTES + 1).to_ne_bytes();
        let err = read_message::<_, AddRequest>(&mut input).await.unwrap_err();
        assert!(matches!(err, DotkitError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_serve_one_appends_and_replies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.m3u");
        let framed = frame(r#"{"url":"https://youtu.be/abc","title":"Song"}"#);
        let mut reader: &[u8] = &framed;
        let mut out = Vec::new();

        serve_one(&mut reader, &mut out, &path).await.unwrap();

        let mut reply: &[u8] = &out;
        let value: serde_json::Value = read_message(&mut reply).await.unwrap().unwrap();
        assert_eq!(value, serde_json::json!({"added": true}));
        assert!(std::fs::read_to_string(&path).unwrap().contains("# Song\nhttps://youtu.be/abc\n"));

        // Same video again is reported as not added.
        let framed = frame(r#"{"url":"https://www.youtube.com/watch?v=abc"}"#);
        let mut reader: &[u8] = &framed;
        let mut out = Vec::new();
        serve_one(&mut reader, &mut out, &path).await.unwrap();
        let mut reply: &[u8] = &out;
        let value: serde_json::Value = read_message(&mut reply).await.unwrap().unwrap();
        assert_eq!(value, serde_json::json!({"added": false}));
    }

    #[tokio::test]
    async fn test_serve_one_replies_error_on_bad_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.m3u");

        for body in ["{not json", r#"{"title":"no url"}"#] {
            let framed = frame(body);
            let mut reader: &[u8] = &framed;
            let mut out = Vec::new();

            assert!(serve_one(&mut reader, &mut out, &path).await.is_err());

            let mut reply: &[u8] = &out;
            let value: serde_json::Value = read_message(&mut reply).await.unwrap().unwrap();
            assert!(value["error"].as_str().is_some_and(|e| !e.is_empty()), "body: {body}");
        }
        assert!(!path.exists());
    }
}
