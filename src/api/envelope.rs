use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use crate::services::Page;

/// The JSON body every endpoint answers with.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Endpoint specific fields such as `counts` or `lastFetched`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> Envelope<T> {
    fn empty(success: bool) -> Self {
        Self {
            success,
            data: None,
            count: None,
            page: None,
            total_pages: None,
            message: None,
            error: None,
            extra: Map::new(),
        }
    }

    pub fn ok() -> Self {
        Self::empty(true)
    }

    pub fn data(data: T) -> Self {
        Self { data: Some(data), ..Self::empty(true) }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::empty(false) }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.extra.insert(key.to_string(), value);
        self
    }
}

impl<T> Envelope<Vec<T>> {
    /// A list with its length as `count`.
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self::data(items).count(count)
    }

    pub fn page(page: Page<T>) -> Self {
        Self {
            count: Some(page.count),
            page: Some(page.page),
            total_pages: Some(page.total_pages),
            ..Self::data(page.items)
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
