//! Payload decoders.
//!
//! The reader never interprets payload bytes itself. It hands each payload to
//! a [`PayloadDecoder`], which may be one of the built-ins below, any closure
//! `Fn(Bytes) -> Result<T, PayloadError>`, or a caller-defined type.

use crate::error::{PayloadError, UnknownFormat};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Turns a payload into a record value.
pub trait PayloadDecoder {
    type Record;

    fn decode(&self, payload: Bytes) -> Result<Self::Record, PayloadError>;
}

impl<F, T> PayloadDecoder for F
where
    F: Fn(Bytes) -> Result<T, PayloadError>,
{
    type Record = T;

    fn decode(&self, payload: Bytes) -> Result<T, PayloadError> {
        self(payload)
    }
}

/// Yields the payload bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPayload;

impl PayloadDecoder for RawPayload {
    type Record = Bytes;

    fn decode(&self, payload: Bytes) -> Result<Bytes, PayloadError> {
        Ok(payload)
    }
}

/// Yields the payload as a UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Payload;

impl PayloadDecoder for Utf8Payload {
    type Record = String;

    fn decode(&self, payload: Bytes) -> Result<String, PayloadError> {
        Ok(std::str::from_utf8(&payload)?.to_owned())
    }
}

/// Deserializes the payload as JSON into `T`.
pub struct JsonPayload<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonPayload<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonPayload<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonPayload<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonPayload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonPayload")
    }
}

impl<T: DeserializeOwned> PayloadDecoder for JsonPayload<T> {
    type Record = T;

    fn decode(&self, payload: Bytes) -> Result<T, PayloadError> {
        Ok(serde_json::from_slice(&payload)?)
    }
}

/// Format tag selecting a built-in decoder at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    #[default]
    Raw,
    Utf8,
    Json,
}

impl PayloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadFormat::Raw => "raw",
            PayloadFormat::Utf8 => "utf8",
            PayloadFormat::Json => "json",
        }
    }
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "bytes" => Ok(PayloadFormat::Raw),
            "utf8" | "text" => Ok(PayloadFormat::Utf8),
            "json" => Ok(PayloadFormat::Json),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// A record decoded by a [`PayloadFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    Raw(Bytes),
    Text(String),
    Json(serde_json::Value),
}

impl PayloadDecoder for PayloadFormat {
    type Record = PayloadValue;

    fn decode(&self, payload: Bytes) -> Result<PayloadValue, PayloadError> {
        match self {
            PayloadFormat::Raw => RawPayload.decode(payload).map(PayloadValue::Raw),
            PayloadFormat::Utf8 => Utf8Payload.decode(payload).map(PayloadValue::Text),
            PayloadFormat::Json => JsonPayload::<serde_json::Value>::new()
                .decode(payload)
                .map(PayloadValue::Json),
        }
    }
}
