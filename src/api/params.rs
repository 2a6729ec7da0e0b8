//
//  graph-client
//  api/params.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Call Parameters
//!
//! [`Params`] is the ordered parameter mapping passed to every Graph call.
//! Keys are kept in a `BTreeMap`, so iteration and encoding are always in
//! lexicographic key order no matter how the map was built. That ordering is
//! what makes encoded request bodies (and batch envelopes) deterministic.
//!
//! ## Value Encoding
//!
//! | Value | Wire form |
//! |-------|-----------|
//! | [`ParamValue::Text`] | the string itself, URL-encoded |
//! | [`ParamValue::Json`] | its JSON text, URL-encoded |
//! | [`ParamValue::File`] | sent as a multipart part, never in the query string |
//!
//! ## Example
//!
//! ```rust
//! use graph_client::api::Params;
//! use serde_json::json;
//!
//! let params = Params::new()
//!     .with("message", "hello world")
//!     .with("limit", 25)
//!     .with("targeting", json!({"countries": ["US"]}));
//!
//! assert_eq!(
//!     params.encode(),
//!     "limit=25&message=hello+world&targeting=%7B%22countries%22%3A%5B%22US%22%5D%7D"
//! );
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use url::form_urlencoded;

/// Parameter key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// A file to send as part of a multipart upload.
///
/// # Example
///
/// ```rust
/// use graph_client::api::UploadFile;
///
/// let file = UploadFile::new("cat.jpg", vec![0xFF, 0xD8, 0xFF]);
/// assert_eq!(file.content_type, "image/jpeg");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Wraps in-memory bytes, guessing the content type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_type_for_file(Path::new(&file_name)).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Overrides the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Reads a file from disk.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

/// Get MIME type for an upload.
fn mime_type_for_file(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("3gp") => "video/3gpp",
        _ => "application/octet-stream",
    }
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Sent as-is.
    Text(String),
    /// Sent as its JSON text.
    Json(Value),
    /// Sent as a multipart file part.
    File(UploadFile),
}

impl ParamValue {
    /// The wire string for this value, or `None` for files.
    pub fn to_wire_string(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Json(Value::String(s)) => Some(s.clone()),
            Self::Json(v) => Some(v.to_string()),
            Self::File(_) => None,
        }
    }

    /// Returns the string value for text parameters.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for file parameters.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<Value> for ParamValue {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Json(Value::Bool(b))
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<u64> for ParamValue {
    fn from(n: u64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<UploadFile> for ParamValue {
    fn from(f: UploadFile) -> Self {
        Self::File(f)
    }
}

/// Ordered mapping of parameter names to values.
///
/// Keys iterate in lexicographic order. Inserting an existing key replaces
/// its value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Inserts a value only when the key is absent.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in encoding order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copies every entry of `other` into `self`, overwriting duplicates.
    pub fn merge(mut self, other: Params) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Returns `true` when any value is a file.
    pub fn has_files(&self) -> bool {
        self.0.values().any(ParamValue::is_file)
    }

    /// Splits file values out, leaving only wire-encodable values behind.
    pub fn take_files(&mut self) -> BTreeMap<String, UploadFile> {
        let keys: Vec<String> = self
            .0
            .iter()
            .filter(|(_, v)| v.is_file())
            .map(|(k, _)| k.clone())
            .collect();

        keys.into_iter()
            .filter_map(|k| match self.0.remove(&k) {
                Some(ParamValue::File(file)) => Some((k, file)),
                _ => None,
            })
            .collect()
    }

    /// Joins arrays of scalars into comma-separated strings.
    ///
    /// The service expects `ids=1,2,3` rather than a JSON array for list
    /// parameters. Arrays containing objects or nested arrays are left alone
    /// and will be sent as JSON.
    pub fn sanitize(mut self) -> Self {
        for value in self.0.values_mut() {
            if let ParamValue::Json(Value::Array(items)) = value {
                if items.iter().all(|item| !item.is_array() && !item.is_object()) {
                    let joined = items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(",");
                    *value = ParamValue::Text(joined);
                }
            }
        }
        self
    }

    /// Stringified wire values in key order, skipping files.
    pub fn to_wire(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.to_wire_string().map(|s| (k.clone(), s)))
            .collect()
    }

    /// The URL-encoded `key=value&...` form, keys sorted, files skipped.
    pub fn encode(&self) -> String {
        encode_wire(&self.to_wire())
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Encodes already-stringified parameters in key order.
pub fn encode_wire(params: &BTreeMap<String, String>) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish()
}
