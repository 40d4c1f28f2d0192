use std::collections::BTreeMap;

use bytes::Bytes;
use url::Url;

use crate::http::parser::ParsedRequest;

pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const REQUEST_URI: &str = "REQUEST_URI";
pub const PATH_INFO: &str = "PATH_INFO";
pub const QUERY_STRING: &str = "QUERY_STRING";
pub const SERVER_PROTOCOL: &str = "SERVER_PROTOCOL";
pub const HTTP_VERSION: &str = "HTTP_VERSION";
pub const SERVER_NAME: &str = "SERVER_NAME";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const SERVER_SOFTWARE: &str = "SERVER_SOFTWARE";
pub const CONTENT_TYPE: &str = "CONTENT_TYPE";
pub const CONTENT_LENGTH: &str = "CONTENT_LENGTH";
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";
pub const HTTP_X_FORWARDED_FOR: &str = "HTTP_X_FORWARDED_FOR";

pub const SERVER: &str = concat!("tideway/", env!("CARGO_PKG_VERSION"));

/// The request environment handed to an application: CGI-style variables
/// plus the raw request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    vars: BTreeMap<String, String>,
    input: Bytes,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_request(request: &ParsedRequest) -> Self {
        let mut env = Env::new();

        env.insert(REQUEST_METHOD, request.method.as_str());
        env.insert(REQUEST_URI, &request.target);
        let (path, query) = split_target(&request.target);
        env.insert(PATH_INFO, path);
        env.insert(QUERY_STRING, query);
        env.insert(SERVER_PROTOCOL, &request.version);
        env.insert(HTTP_VERSION, &request.version);
        env.insert(SERVER_SOFTWARE, SERVER);

        let (name, port) = request
            .headers
            .get("Host")
            .map(split_host)
            .unwrap_or(("localhost", "80"));
        env.insert(SERVER_NAME, name);
        env.insert(SERVER_PORT, port);

        for (key, value) in request.headers.iter() {
            let var = if key.eq_ignore_ascii_case("Content-Type") {
                CONTENT_TYPE.to_string()
            } else if key.eq_ignore_ascii_case("Content-Length") {
                CONTENT_LENGTH.to_string()
            } else {
                format!("HTTP_{}", key.to_ascii_uppercase().replace('-', "_"))
            };

            // repeated fields are folded into one comma separated value
            match env.vars.get_mut(&var) {
                Some(existing) => {
                    existing.push_str(", ");
                    existing.push_str(value);
                }
                None => {
                    env.vars.insert(var, value.to_string());
                }
            }
        }

        env.input = request.body.clone();
        env
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The request body.
    pub fn input(&self) -> &Bytes {
        &self.input
    }

    pub fn method(&self) -> &str {
        self.get(REQUEST_METHOD).unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.get(PATH_INFO).unwrap_or_default()
    }

    pub fn query(&self) -> &str {
        self.get(QUERY_STRING).unwrap_or_default()
    }
}

/// Splits a request target into path and query as sent, without
/// normalizing dot segments or re-encoding.
fn split_target(target: &str) -> (String, String) {
    if target.starts_with('/') {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        return (path.to_string(), query.to_string());
    }

    match Url::parse(target) {
        Ok(url) => (
            url.path().to_string(),
            url.query().unwrap_or_default().to_string(),
        ),
        // e.g. the `*` of `OPTIONS *`
        Err(_) => (target.to_string(), String::new()),
    }
}

fn split_host(host: &str) -> (&str, &str) {
    // bracketed IPv6 literals carry colons of their own
    if let Some(rest) = host.strip_prefix('[') {
        if let Some((addr, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').unwrap_or("80");
            return (addr, port);
        }
    }

    match host.rsplit_once(':') {
        Some((name, port)) => (name, port),
        None => (host, "80"),
    }
}
