use super::*;

#[test]
fn title_fps_frame_times_divide_by_thirty() {
    let fps = Fps::TITLE;
    assert_eq!(fps.frame_time_secs(FrameIndex(0)), 0.0);
    assert_eq!(fps.frame_time_secs(FrameIndex(15)), 0.5);
    assert_eq!(fps.frame_time_secs(FrameIndex(7)), 7.0 / 30.0);
}

#[test]
fn secs_to_frames_ceil_matches_formula() {
    let fps = Fps::TITLE;
    assert_eq!(fps.secs_to_frames_ceil(3.0), 90);
    assert_eq!(fps.secs_to_frames_ceil(2.5), 75);
    assert_eq!(fps.secs_to_frames_ceil(1.01), (1.01f64 * 30.0).ceil() as u64);
}

#[test]
fn ffmpeg_rate_is_integral_or_rational() {
    assert_eq!(Fps::TITLE.to_ffmpeg_rate(), "30");
    let ntsc = Fps {
        num: 30000,
        den: 1001,
    };
    assert_eq!(ntsc.to_ffmpeg_rate(), "30000/1001");
}

#[test]
fn viewport_rect_covers_full_hd() {
    let r = Canvas::VIEWPORT.rect();
    assert_eq!(r.width(), 1920.0);
    assert_eq!(r.height(), 1080.0);
}
