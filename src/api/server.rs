//! ESP-IDF HTTP server adapter.
//!
//! Thin registration layer: each handler locks the shared [`Monitor`],
//! delegates to the pure functions in [`routes`](super::routes), and writes
//! the resulting response. Requests observe only fully completed
//! acquisition ticks because the monitor is mutated exclusively under the
//! same lock.

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use embedded_svc::http::{Headers, Method};
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::server::{Configuration as HttpConfiguration, EspHttpConnection, EspHttpServer, Request};

use crate::adapters::clock::SystemClock;
use crate::adapters::flashfs::FlashFs;
use crate::app::ports::ClockPort;
use crate::app::service::Monitor;

use super::routes::{self, Response};

const MAX_HTTP_BODY: usize = 1024;

/// Register every route and start the server.
pub fn create_http_server(
    monitor: Arc<Mutex<Monitor>>,
    assets: FlashFs,
) -> anyhow::Result<EspHttpServer<'static>> {
    let conf = HttpConfiguration {
        stack_size: 10 * 1024,
        uri_match_wildcard: true,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&conf)?;

    server.fn_handler::<anyhow::Error, _>("/", Method::Get, move |req| {
        respond(req, &routes::root())
    })?;

    {
        let monitor = monitor.clone();
        server.fn_handler::<anyhow::Error, _>("/sensor", Method::Get, move |req| {
            let clock = SystemClock::new();
            let m = monitor.lock().unwrap();
            respond(req, &routes::sensor(&m, clock.uptime_ms() / 1000))
        })?;
    }

    {
        let monitor = monitor.clone();
        server.fn_handler::<anyhow::Error, _>("/config", Method::Get, move |req| {
            let m = monitor.lock().unwrap();
            respond(req, &routes::config(&m))
        })?;
    }

    {
        let monitor = monitor.clone();
        server.fn_handler::<anyhow::Error, _>("/config", Method::Put, move |mut req| {
            let body = read_request_body(&mut req)?;
            let arg = if body.is_empty() {
                None
            } else {
                Some(core::str::from_utf8(&body).unwrap_or(""))
            };
            let mut m = monitor.lock().unwrap();
            let response = routes::update_config(&mut m, arg);
            drop(m);
            respond(req, &response)
        })?;
    }

    {
        let monitor = monitor.clone();
        server.fn_handler::<anyhow::Error, _>("/log", Method::Get, move |req| {
            let clock = SystemClock::new();
            let m = monitor.lock().unwrap();
            respond(req, &routes::log(&m, clock.uptime_ms() / 1000))
        })?;
    }

    // Everything else resolves against the flash filesystem.
    for method in [Method::Get, Method::Post] {
        let monitor = monitor.clone();
        let assets = assets.clone();
        let label = if method == Method::Get { "GET" } else { "POST" };
        server.fn_handler::<anyhow::Error, _>("/*", method, move |req| {
            let uri = req.uri().to_string();
            let (path, args) = routes::split_query(&uri);

            {
                let m = monitor.lock().unwrap();
                if !m.is_active() {
                    return respond(req, &routes::halted(m.halt_reason()));
                }
            }

            let resolved = routes::resolve_asset_path(path);
            if let Some(bytes) = assets.read_asset(&resolved) {
                let download = args.iter().any(|(name, _)| name == "download");
                let content_type = routes::content_type_for(&resolved, download);
                req.into_response(200, None, &[("Content-Type", content_type)])?
                    .write_all(&bytes)?;
                return Ok(());
            }

            let borrowed: Vec<(&str, &str)> = args
                .iter()
                .map(|(n, v)| (n.as_str(), v.as_str()))
                .collect();
            respond(req, &routes::not_found(path, label, &borrowed))
        })?;
    }

    Ok(server)
}

fn read_request_body(
    req: &mut Request<&mut EspHttpConnection<'_>>,
) -> anyhow::Result<Vec<u8>> {
    let len = req.content_len().unwrap_or(0) as usize;
    if len > MAX_HTTP_BODY {
        return Err(anyhow!("request body too large"));
    }

    let mut body = vec![0_u8; len];
    if len > 0 {
        req.read_exact(&mut body)?;
    }
    Ok(body)
}

fn respond(
    req: Request<&mut EspHttpConnection<'_>>,
    response: &Response,
) -> anyhow::Result<()> {
    let mut headers: Vec<(&str, &str)> = vec![("Content-Type", response.content_type)];
    if let Some(location) = response.location {
        headers.push(("Location", location));
    }
    req.into_response(response.status, None, &headers)?
        .write_all(response.body.as_bytes())?;
    Ok(())
}
