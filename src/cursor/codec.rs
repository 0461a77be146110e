//! Cursor codec implementation

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use std::fmt;
use std::sync::Arc;

/// Function turning a raw token into its wire form
pub type EncodeFn = Arc<dyn Fn(&[u8]) -> Result<String> + Send + Sync>;

/// Function turning a wire token back into raw bytes
pub type DecodeFn = Arc<dyn Fn(&str) -> Result<Vec<u8>> + Send + Sync>;

/// Paired encoder/decoder for cursor tokens
///
/// Null and empty tokens never reach the encoder or decoder: they map to
/// `None` in both directions.
#[derive(Clone)]
pub struct CursorCodec {
    name: String,
    encoder: EncodeFn,
    decoder: DecodeFn,
}

impl fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorCodec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Default for CursorCodec {
    fn default() -> Self {
        Self::base64url()
    }
}

impl CursorCodec {
    /// URL-safe base64 codec (the default)
    pub fn base64url() -> Self {
        Self {
            name: "base64url".to_string(),
            encoder: Arc::new(|token| Ok(URL_SAFE.encode(token))),
            decoder: Arc::new(|value| {
                URL_SAFE
                    .decode(value.as_bytes())
                    .map_err(|e| Error::invalid_cursor(e.to_string()))
            }),
        }
    }

    /// Build a codec from custom functions
    pub fn new<E, D>(name: impl Into<String>, encoder: E, decoder: D) -> Self
    where
        E: Fn(&[u8]) -> Result<String> + Send + Sync + 'static,
        D: Fn(&str) -> Result<Vec<u8>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            encoder: Arc::new(encoder),
            decoder: Arc::new(decoder),
        }
    }

    /// Replace the encoder, keeping the decoder
    #[must_use]
    pub fn with_encoder(mut self, encoder: EncodeFn) -> Self {
        self.encoder = encoder;
        self.name = format!("{}+custom-encoder", self.name);
        self
    }

    /// Replace the decoder, keeping the encoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: DecodeFn) -> Self {
        self.decoder = decoder;
        self.name = format!("{}+custom-decoder", self.name);
        self
    }

    /// Codec name, for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encode an optional raw token
    pub fn encode(&self, token: Option<&[u8]>) -> Result<Option<String>> {
        match token {
            Some(token) if !token.is_empty() => (self.encoder)(token).map(Some),
            _ => Ok(None),
        }
    }

    /// Decode an optional wire token
    pub fn decode(&self, value: Option<&str>) -> Result<Option<Vec<u8>>> {
        match value {
            Some(value) if !value.is_empty() => (self.decoder)(value).map(Some),
            _ => Ok(None),
        }
    }

    /// Encode a token for the wire, percent-quoting it when asked
    pub fn encode_wire(&self, token: Option<&[u8]>, quoted: bool) -> Result<Option<String>> {
        let encoded = self.encode(token)?;
        Ok(encoded.map(|value| {
            if quoted {
                urlencoding::encode(&value).into_owned()
            } else {
                value
            }
        }))
    }

    /// Decode a token received from the wire, unquoting it first when asked
    pub fn decode_wire(&self, value: Option<&str>, quoted: bool) -> Result<Option<Vec<u8>>> {
        match value {
            Some(value) if quoted => {
                let unquoted = urlencoding::decode(value)
                    .map_err(|e| Error::invalid_cursor(e.to_string()))?;
                self.decode(Some(&unquoted))
            }
            other => self.decode(other),
        }
    }
}
