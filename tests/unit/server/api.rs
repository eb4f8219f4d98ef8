use std::path::Path;
use std::sync::Arc;

use super::*;
use crate::encode::ffmpeg::{FrameSequence, TransparencyVerifier, VideoEncoder};
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::FadeResult;
use crate::render::backend::{FrameRGBA, RenderSurface, SurfaceFactory};
use crate::render::style::TextStyle;
use crate::storage::InMemoryStore;

struct SolidSurface {
    letters: usize,
}

impl RenderSurface for SolidSurface {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: 32,
            height: 16,
        }
    }

    fn letters_count(&self) -> usize {
        self.letters
    }

    fn text_bounds(&self) -> Rect {
        Rect::new(8.0, 4.0, 24.0, 12.0)
    }

    fn render_frame(&mut self, _opacities: &[f32]) -> FadeResult<FrameRGBA> {
        Ok(FrameRGBA::transparent(32, 16))
    }

    fn close(&mut self) -> FadeResult<()> {
        Ok(())
    }
}

struct SolidFactory;

impl SurfaceFactory for SolidFactory {
    fn open(&self, text: &str, _style: &TextStyle) -> FadeResult<Box<dyn RenderSurface>> {
        Ok(Box::new(SolidSurface {
            letters: crate::scene::request::letters_count(text),
        }))
    }
}

struct FailingEncoder;

impl VideoEncoder for FailingEncoder {
    fn encode(&self, _seq: &FrameSequence, _out_path: &Path) -> FadeResult<()> {
        Err(FadeError::encode("ffmpeg exited with status 1"))
    }
}

struct NeverProbed;

impl TransparencyVerifier for NeverProbed {
    fn pixel_format(&self, _path: &Path) -> FadeResult<String> {
        Err(FadeError::encode("not expected"))
    }
}

fn pipeline(work: &Path) -> (RenderPipeline, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new("bucket-1"));
    let p = RenderPipeline::new(
        Arc::new(SolidFactory),
        Arc::new(FailingEncoder),
        Arc::new(NeverProbed),
        store.clone(),
        work,
    );
    (p, store)
}

fn title_body() -> Value {
    json!({
        "text": "Hi",
        "initial_delay": 0,
        "fade_in_duration": 0.1,
        "fade_out_start": 0.1,
        "fade_out_duration": 0.1,
        "overlap_factor": 1,
        "output_file_name": "t.webm"
    })
}

#[test]
fn health_reports_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let (p, _) = pipeline(dir.path());
    let reply = handle_health(&p);
    assert_eq!(reply.status, 200);
    assert_eq!(
        reply.body,
        json!({ "status": "OK", "bucket": "bucket-1", "storageInitialized": true })
    );
}

#[test]
fn non_object_and_missing_fields_are_400() {
    let dir = tempfile::tempdir().unwrap();
    let (p, _) = pipeline(dir.path());

    let reply = handle_title(&p, &json!([1, 2]));
    assert_eq!(reply.status, 400);
    assert!(reply.body["error"].is_string());

    let reply = handle_title(&p, &json!({ "text": "Hi" }));
    assert_eq!(reply.status, 400);
    assert!(
        reply.body["error"]
            .as_str()
            .unwrap()
            .contains("output_file_name")
    );
    assert!(reply.body.get("details").is_none());

    let reply = handle_snapshot(&p, &json!({ "text": "Hi" }));
    assert_eq!(reply.status, 400);
}

#[test]
fn pipeline_failures_are_500_with_details() {
    let dir = tempfile::tempdir().unwrap();
    let (p, store) = pipeline(dir.path());

    let reply = handle_title(&p, &title_body());
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body["error"], INTERNAL_ERROR_SUMMARY);
    assert!(
        reply.body["details"]
            .as_str()
            .unwrap()
            .starts_with("encode error:")
    );
    assert!(store.object_names().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn routes_dispatch_by_method_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let (p, _) = pipeline(dir.path());
    let server = ApiServer::new(p);

    let health = Request::fake_http("GET", "/health", vec![], vec![]);
    assert_eq!(server.handle_request(&health).status_code, 200);

    let unknown = Request::fake_http("GET", "/nope", vec![], vec![]);
    assert_eq!(server.handle_request(&unknown).status_code, 404);

    let wrong_method = Request::fake_http("GET", "/text/title", vec![], vec![]);
    assert_eq!(server.handle_request(&wrong_method).status_code, 404);

    let bad_json = Request::fake_http(
        "POST",
        "/text/title",
        vec![("Content-Type".to_string(), "application/json".to_string())],
        b"{not json".to_vec(),
    );
    assert_eq!(server.handle_request(&bad_json).status_code, 400);

    let missing = Request::fake_http(
        "POST",
        "/text/png",
        vec![("Content-Type".to_string(), "application/json".to_string())],
        br#"{"text":"Hi"}"#.to_vec(),
    );
    assert_eq!(server.handle_request(&missing).status_code, 400);
}
