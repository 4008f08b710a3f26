//! Request handling, independent of any HTTP server.
//!
//! Every route is a pure function from application state (plus the request
//! argument, if any) to a [`Response`]. The device server in
//! [`server`](super::server) is a thin registration layer over these, which
//! is what lets the whole wire contract run under host tests.

use crate::app::service::Monitor;

/// Location of the web UI entry point on the flash filesystem.
pub const INDEX_PATH: &str = "/index.html";

/// A wire-agnostic response: status, content type, body, and an optional
/// redirect target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<&'static str>,
}

impl Response {
    fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
            location: None,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
            location: None,
        }
    }
}

/// `GET /` — redirect to the static index resource.
pub fn root() -> Response {
    Response {
        status: 302,
        content_type: "text/html",
        body: String::new(),
        location: Some(INDEX_PATH),
    }
}

/// Response served on every route once the system has halted.
pub fn halted(reason: Option<&str>) -> Response {
    Response::text(503, &format!("INACTIVE: {}", reason.unwrap_or("init failed")))
}

/// `GET /sensor` — the most recent reading.
pub fn sensor(monitor: &Monitor, uptime_secs: u64) -> Response {
    if !monitor.is_active() {
        return halted(monitor.halt_reason());
    }
    match serde_json::to_string(&monitor.current().to_wire(uptime_secs)) {
        Ok(body) => Response::json(body),
        Err(_) => Response::text(500, "SERIALIZE FAILED"),
    }
}

/// `GET /config` — the current runtime configuration.
pub fn config(monitor: &Monitor) -> Response {
    if !monitor.is_active() {
        return halted(monitor.halt_reason());
    }
    match serde_json::to_string(monitor.config()) {
        Ok(body) => Response::json(body),
        Err(_) => Response::text(500, "SERIALIZE FAILED"),
    }
}

/// `PUT /config` — validated configuration update.
///
/// Each failure cause maps to its own response so the client can tell a
/// missing body from bad JSON from out-of-range values.
pub fn update_config(monitor: &mut Monitor, arg: Option<&str>) -> Response {
    use crate::config::ConfigError;

    if !monitor.is_active() {
        return halted(monitor.halt_reason());
    }
    let Some(payload) = arg else {
        return Response::text(500, "MISSING ARGS");
    };
    match monitor.update_config(payload) {
        Ok(()) => Response::text(200, "SUCCESS"),
        Err(ConfigError::Malformed) => Response::text(500, "INVALID JSON"),
        Err(ConfigError::OutOfRange) => Response::text(500, "INVALID ARGS"),
    }
}

/// `GET /log` — the full history as one document.
pub fn log(monitor: &Monitor, uptime_secs: u64) -> Response {
    if !monitor.is_active() {
        return halted(monitor.halt_reason());
    }
    match monitor.log().render_document(uptime_secs) {
        Ok(body) => Response::json(body),
        Err(_) => Response::text(500, "SERIALIZE FAILED"),
    }
}

/// Diagnostic body for paths that match neither a route nor a stored asset.
pub fn not_found(path: &str, method: &str, args: &[(&str, &str)]) -> Response {
    let mut body = String::from("File Not Detected\n\n");
    body.push_str(&format!("URI: {path}\n"));
    body.push_str(&format!("Method: {method}\n"));
    body.push_str(&format!("Arguments: {}\n", args.len()));
    for (name, value) in args {
        body.push_str(&format!(" NAME:{name}\n VALUE:{value}\n"));
    }
    Response {
        status: 404,
        content_type: "text/plain",
        body,
        location: None,
    }
}

/// Split a request URI into its path and decoded query arguments.
pub fn split_query(uri: &str) -> (&str, Vec<(String, String)>) {
    let Some((path, query)) = uri.split_once('?') else {
        return (uri, Vec::new());
    };
    let args = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (name.to_string(), value.replace('+', " "))
        })
        .collect();
    (path, args)
}

// ───────────────────────────────────────────────────────────────
// Static asset resolution
// ───────────────────────────────────────────────────────────────

/// Normalise a request path to a stored asset path: a trailing `/` serves
/// the directory index, a `.src` suffix is stripped.
pub fn resolve_asset_path(path: &str) -> String {
    if path.ends_with('/') {
        return format!("{path}index.html");
    }
    if let Some(stem) = path.strip_suffix(".src") {
        return stem.to_string();
    }
    path.to_string()
}

/// Content type inferred from the asset's file extension. `download`
/// forces a byte-stream response regardless of extension.
pub fn content_type_for(path: &str, download: bool) -> &'static str {
    if download {
        return "application/octet-stream";
    }
    let ext = path.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    match ext {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "png" => "image/png",
        "gif" => "image/gif",
        "jpg" => "image/jpeg",
        "ico" => "image/x-icon",
        "xml" => "text/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        _ => "text/plain",
    }
}
