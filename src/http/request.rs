//! Inbound requests

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdminError;
use crate::models::User;

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "HEAD" => Ok(Method::Head),
            other => Err(AdminError::MethodNotAllowed(other.to_string())),
        }
    }
}

/// A request dispatched to the admin router
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path without the query string
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub user: User,
    /// Parsed request body, `Value::Null` when absent
    pub data: Value,
}

impl Request {
    /// Create a request; a `?key=value&...` suffix on `path` is parsed into
    /// the query map
    pub fn new(method: Method, path: impl AsRef<str>) -> Self {
        let (path, query) = split_query(path.as_ref());
        Self {
            method,
            path,
            query,
            user: User::anonymous(),
            data: Value::Null,
        }
    }

    pub fn get(path: impl AsRef<str>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl AsRef<str>, data: Value) -> Self {
        Self::new(Method::Post, path).with_data(data)
    }

    pub fn put(path: impl AsRef<str>, data: Value) -> Self {
        Self::new(Method::Put, path).with_data(data)
    }

    pub fn patch(path: impl AsRef<str>, data: Value) -> Self {
        Self::new(Method::Patch, path).with_data(data)
    }

    pub fn delete(path: impl AsRef<str>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn options(path: impl AsRef<str>) -> Self {
        Self::new(Method::Options, path)
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Split off and decode a `?key=value&...` query string
fn split_query(raw: &str) -> (String, BTreeMap<String, String>) {
    let Some((path, query)) = raw.split_once('?') else {
        return (raw.to_string(), BTreeMap::new());
    };

    let params = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    (path.to_string(), params)
}
