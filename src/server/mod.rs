//! HTTP surface of the render service.
//!
//! | Method | Path          | Description                         |
//! |--------|---------------|-------------------------------------|
//! | POST   | `/text/title` | Render and upload a fading WebM     |
//! | POST   | `/text/png`   | Render and upload a cropped PNG     |
//! | GET    | `/health`     | Bucket name and storage readiness   |

mod api;

pub use api::{
    ApiReply, ApiServer, INTERNAL_ERROR_SUMMARY, handle_health, handle_snapshot, handle_title,
};
