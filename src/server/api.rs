//! HTTP routes on top of [`RenderPipeline`].
//!
//! Handlers are plain functions from a decoded body to an [`ApiReply`], so they can be exercised
//! without a socket. [`ApiServer`] only adapts them to `rouille`.

use std::time::Instant;

use rouille::{Request, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::foundation::error::FadeError;
use crate::scene::request::{AnimationRequest, SnapshotRequest};
use crate::session::RenderPipeline;

/// Summary returned in the `error` field of 500 responses.
pub const INTERNAL_ERROR_SUMMARY: &str = "processing failed";

/// Status code plus JSON body.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiReply {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl ApiReply {
    fn ok(body: impl Serialize) -> Self {
        Self {
            status: 200,
            body: serde_json::to_value(body).unwrap_or(Value::Null),
        }
    }

    fn error(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": error.into() }),
        }
    }

    /// Map a pipeline error: client mistakes keep their message, everything else gets the
    /// generic summary plus the error's display string.
    pub fn from_error(err: &FadeError) -> Self {
        match err.http_status() {
            400 => match err {
                FadeError::Validation(msg) => Self::error(400, msg.clone()),
                other => Self::error(400, other.to_string()),
            },
            status => Self {
                status,
                body: json!({ "error": INTERNAL_ERROR_SUMMARY, "details": err.to_string() }),
            },
        }
    }

    fn into_response(self) -> Response {
        Response::json(&self.body).with_status_code(self.status)
    }
}

#[derive(Serialize)]
struct Transparency<'a> {
    pixel_format: &'a str,
    has_alpha: bool,
}

#[derive(Serialize)]
struct TitleReply<'a> {
    message: &'static str,
    webm_url: &'a str,
    webm_transparency: Transparency<'a>,
}

#[derive(Serialize)]
struct SnapshotReply<'a> {
    message: &'static str,
    png_url: &'a str,
}

#[derive(Serialize)]
struct HealthReply<'a> {
    status: &'static str,
    bucket: &'a str,
    #[serde(rename = "storageInitialized")]
    storage_initialized: bool,
}

fn require_object(body: &Value) -> Result<(), ApiReply> {
    if body.is_object() {
        Ok(())
    } else {
        Err(ApiReply::error(400, "request body must be a JSON object"))
    }
}

/// `POST /text/title`.
pub fn handle_title(pipeline: &RenderPipeline, body: &Value) -> ApiReply {
    if let Err(reply) = require_object(body) {
        return reply;
    }
    let req = match AnimationRequest::from_json(body) {
        Ok(req) => req,
        Err(e) => return ApiReply::from_error(&e),
    };
    match pipeline.render_title(&req) {
        Ok(out) => ApiReply::ok(TitleReply {
            message: "Success",
            webm_url: &out.webm_url,
            webm_transparency: Transparency {
                pixel_format: &out.pixel_format,
                has_alpha: out.has_alpha,
            },
        }),
        Err(e) => ApiReply::from_error(&e),
    }
}

/// `POST /text/png`.
pub fn handle_snapshot(pipeline: &RenderPipeline, body: &Value) -> ApiReply {
    if let Err(reply) = require_object(body) {
        return reply;
    }
    let req = match SnapshotRequest::from_json(body) {
        Ok(req) => req,
        Err(e) => return ApiReply::from_error(&e),
    };
    match pipeline.render_snapshot(&req) {
        Ok(out) => ApiReply::ok(SnapshotReply {
            message: "Success",
            png_url: &out.png_url,
        }),
        Err(e) => ApiReply::from_error(&e),
    }
}

/// `GET /health`.
pub fn handle_health(pipeline: &RenderPipeline) -> ApiReply {
    let store = pipeline.store();
    ApiReply::ok(HealthReply {
        status: "OK",
        bucket: store.bucket(),
        storage_initialized: store.is_initialized(),
    })
}

/// HTTP front end of the render service.
pub struct ApiServer {
    pipeline: RenderPipeline,
}

impl ApiServer {
    /// Serve `pipeline`.
    pub fn new(pipeline: RenderPipeline) -> Self {
        Self { pipeline }
    }

    /// Listen on `0.0.0.0:port` forever, one thread per connection.
    pub fn run(self, port: u16) -> ! {
        let addr = format!("0.0.0.0:{port}");
        tracing::info!("server listening on http://{addr}");
        rouille::start_server(addr, move |request| self.handle_request(request))
    }

    /// Route one request.
    pub fn handle_request(&self, request: &Request) -> Response {
        let started = Instant::now();
        let reply = self.route(request);
        tracing::info!(
            method = request.method(),
            url = %request.url(),
            status = reply.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request"
        );
        reply.into_response()
    }

    fn route(&self, request: &Request) -> ApiReply {
        rouille::router!(request,
            (POST) ["/text/title"] => {
                match read_json(request) {
                    Ok(body) => handle_title(&self.pipeline, &body),
                    Err(reply) => reply,
                }
            },
            (POST) ["/text/png"] => {
                match read_json(request) {
                    Ok(body) => handle_snapshot(&self.pipeline, &body),
                    Err(reply) => reply,
                }
            },
            (GET) ["/health"] => {
                handle_health(&self.pipeline)
            },
            _ => {
                ApiReply::error(404, "Not found")
            }
        )
    }
}

fn read_json(request: &Request) -> Result<Value, ApiReply> {
    rouille::input::json_input::<Value>(request)
        .map_err(|e| ApiReply::error(400, format!("invalid JSON body: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/server/api.rs"]
mod tests;
