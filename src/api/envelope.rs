use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::validation::FieldErrors;

/// Decoded body of a non-2xx response.
///
/// The backend is inconsistent about where it puts the reason: `detail`
/// (framework errors), `message`, `error` (hand-written views), an `errors`
/// map, or the serializer's bare field map, possibly nested. All of them
/// end up here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiErrorBody {
    pub detail: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub fields: FieldErrors,
    /// Non-JSON body text, kept so a proxy error page still says something.
    pub raw: Option<String>,
}

impl ApiErrorBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => {
                let mut body = ApiErrorBody::default();
                for (key, value) in map {
                    match (key.as_str(), value) {
                        ("detail", Value::String(s)) => body.detail = Some(s),
                        ("message", Value::String(s)) => body.message = Some(s),
                        ("error", Value::String(s)) => body.error = Some(s),
                        ("errors", Value::Object(nested)) => {
                            for (field, v) in nested {
                                collect_fields(&mut body.fields, &field, &v);
                            }
                        }
                        (_, v) => collect_fields(&mut body.fields, &key, &v),
                    }
                }
                body
            }
            Ok(Value::String(s)) => ApiErrorBody {
                raw: Some(s),
                ..Default::default()
            },
            Ok(Value::Array(items)) => {
                let mut fields = FieldErrors::default();
                collect_fields(&mut fields, "non_field_errors", &Value::Array(items));
                ApiErrorBody {
                    fields,
                    ..Default::default()
                }
            }
            _ => {
                let text = String::from_utf8_lossy(bytes).trim().to_string();
                ApiErrorBody {
                    raw: (!text.is_empty()).then_some(text),
                    ..Default::default()
                }
            }
        }
    }

    /// Best single-line explanation: detail, message, error, first field, raw text.
    pub fn summary(&self) -> Option<String> {
        self.detail
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
            .or_else(|| {
                self.fields.first().map(|(field, msg)| {
                    if field == "non_field_errors" {
                        msg.to_string()
                    } else {
                        format!("{}: {}", field, msg)
                    }
                })
            })
            .or_else(|| self.raw.clone())
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.summary() {
            Some(s) => f.write_str(&s),
            None => f.write_str("no details"),
        }
    }
}

/// Flatten `{"profile": {"user": {"email": ["..."]}}}` into `profile.user.email`.
fn collect_fields(fields: &mut FieldErrors, path: &str, value: &Value) {
    match value {
        Value::String(s) => fields.insert(path, s.clone()),
        Value::Array(items) => {
            for item in items {
                collect_fields(fields, path, item);
            }
        }
        Value::Object(map) => {
            for (key, v) in map {
                collect_fields(fields, &format!("{}.{}", path, key), v);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Number of pages for `count` items, at least one.
///
/// A missing or zero count means the server did not paginate, which the
/// screens render as a single page.
pub fn total_pages(count: Option<u64>, page_size: u32) -> u32 {
    match count {
        Some(count) if count > 0 && page_size > 0 => {
            let pages = count.div_ceil(u64::from(page_size));
            u32::try_from(pages).unwrap_or(u32::MAX)
        }
        _ => 1,
    }
}

/// A list response, paginated (`{ results, count }`) or a bare array.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: Option<u64>,
    pub has_next: Option<bool>,
}

impl<T> Page<T> {
    pub fn total_pages(&self, page_size: u32) -> u32 {
        total_pages(self.count, page_size)
    }

    pub fn is_paginated(&self) -> bool {
        self.count.is_some()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: None,
            has_next: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage<T> {
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        has_next: Option<bool>,
    },
    Bare(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPage::deserialize(deserializer)? {
            RawPage::Paginated {
                results,
                count,
                total,
                has_next,
            } => Page {
                items: results,
                count: count.or(total),
                has_next,
            },
            RawPage::Bare(items) => Page {
                items,
                count: None,
                has_next: None,
            },
        })
    }
}
