#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fadetitle::render::backend::{FrameRGBA, RenderSurface, SurfaceFactory};
use fadetitle::{
    Canvas, FadeError, FadeResult, FrameSequence, InMemoryStore, Rect, RenderPipeline, TextStyle,
    TransparencyVerifier, VideoEncoder,
};

pub const CANVAS: Canvas = Canvas {
    width: 64,
    height: 32,
};

/// Counters shared between a fake factory and the test body.
#[derive(Default)]
pub struct SurfaceLog {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub frames: AtomicUsize,
}

/// Paints an opaque block whose alpha follows the mean letter opacity.
pub struct FakeSurface {
    letters: usize,
    fail_at: Option<usize>,
    rendered: usize,
    log: Arc<SurfaceLog>,
}

impl RenderSurface for FakeSurface {
    fn canvas(&self) -> Canvas {
        CANVAS
    }

    fn letters_count(&self) -> usize {
        self.letters
    }

    fn text_bounds(&self) -> Rect {
        Rect::new(10.0, 8.0, 40.0, 20.0)
    }

    fn render_frame(&mut self, opacities: &[f32]) -> FadeResult<FrameRGBA> {
        if self.fail_at == Some(self.rendered) {
            return Err(FadeError::render(format!(
                "rasterization failed on frame {}",
                self.rendered
            )));
        }
        self.rendered += 1;
        self.log.frames.fetch_add(1, Ordering::SeqCst);

        let mean = opacities.iter().sum::<f32>() / opacities.len().max(1) as f32;
        let a = (mean * 255.0).round() as u8;
        let mut frame = FrameRGBA::transparent(CANVAS.width, CANVAS.height);
        for y in 8..20u32 {
            for x in 10..40u32 {
                let i = ((y * CANVAS.width + x) * 4) as usize;
                frame.data[i..i + 4].copy_from_slice(&[a, 0, 0, a]);
            }
        }
        Ok(frame)
    }

    fn close(&mut self) -> FadeResult<()> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakeFactory {
    pub fail_at: Option<usize>,
    /// Letter count override, to simulate a layout disagreeing with the request.
    pub letters: Option<usize>,
    pub log: Arc<SurfaceLog>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            fail_at: None,
            letters: None,
            log: Arc::default(),
        }
    }
}

impl SurfaceFactory for FakeFactory {
    fn open(&self, text: &str, _style: &TextStyle) -> FadeResult<Box<dyn RenderSurface>> {
        self.log.opened.fetch_add(1, Ordering::SeqCst);
        let letters = self
            .letters
            .unwrap_or_else(|| text.chars().filter(|c| *c != '\n' && *c != '\r').count());
        Ok(Box::new(FakeSurface {
            letters,
            fail_at: self.fail_at,
            rendered: 0,
            log: Arc::clone(&self.log),
        }))
    }
}

/// Writes a stub container and remembers what it was asked to encode.
#[derive(Default)]
pub struct FakeEncoder {
    pub fail: bool,
    pub calls: Mutex<Vec<(FrameSequence, PathBuf, usize)>>,
}

impl VideoEncoder for FakeEncoder {
    fn encode(&self, seq: &FrameSequence, out_path: &Path) -> FadeResult<()> {
        let frame_files = seq
            .pattern
            .parent()
            .and_then(|d| std::fs::read_dir(d).ok())
            .map(|d| d.count())
            .unwrap_or(0);
        std::fs::write(out_path, b"partial container").map_err(|e| FadeError::encode(e.to_string()))?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((seq.clone(), out_path.to_path_buf(), frame_files));
        }
        if self.fail {
            return Err(FadeError::encode("ffmpeg exited with status 1: boom"));
        }
        Ok(())
    }
}

pub struct FakeVerifier(pub &'static str);

impl TransparencyVerifier for FakeVerifier {
    fn pixel_format(&self, path: &Path) -> FadeResult<String> {
        if !path.is_file() {
            return Err(FadeError::encode("nothing to probe"));
        }
        Ok(self.0.to_string())
    }
}

pub struct Harness {
    pub work: tempfile::TempDir,
    pub factory: Arc<FakeFactory>,
    pub encoder: Arc<FakeEncoder>,
    pub store: Arc<InMemoryStore>,
    pub pipeline: RenderPipeline,
}

pub fn harness(factory: FakeFactory, encoder: FakeEncoder, pix_fmt: &'static str) -> Harness {
    let work = tempfile::tempdir().expect("tempdir");
    let factory = Arc::new(factory);
    let encoder = Arc::new(encoder);
    let store = Arc::new(InMemoryStore::new("test-bucket"));
    let pipeline = RenderPipeline::new(
        factory.clone(),
        encoder.clone(),
        Arc::new(FakeVerifier(pix_fmt)),
        store.clone(),
        work.path(),
    );
    Harness {
        work,
        factory,
        encoder,
        store,
        pipeline,
    }
}

impl Harness {
    /// Entries left in the work directory.
    pub fn leftovers(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.work.path())
            .map(|d| d.filter_map(|e| e.ok().map(|e| e.path())).collect())
            .unwrap_or_default()
    }
}

pub fn test_font_path() -> Option<PathBuf> {
    [
        std::env::var("FADETITLE_FONT").unwrap_or_default(),
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
        "/usr/share/fonts/TTF/DejaVuSans.ttf".to_string(),
    ]
    .into_iter()
    .filter(|p| !p.is_empty())
    .map(PathBuf::from)
    .find(|p| p.is_file())
}
