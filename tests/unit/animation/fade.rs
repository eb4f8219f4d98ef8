use super::*;
use proptest::prelude::*;

fn params(overlap_factor: f64) -> FadeParams {
    FadeParams {
        initial_delay: 0.0,
        fade_in_duration: 1.0,
        fade_out_start: 2.0,
        fade_out_duration: 1.0,
        overlap_factor,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn two_letters_without_overlap_fade_back_to_back() {
    let tl = FadeTimeline::new(params(1.0), 2).unwrap();
    assert!(approx(tl.fade_in_per_letter(), 0.5));
    assert!(approx(tl.letter_fade_window(), 0.5));

    assert_eq!(tl.opacity(0.0, 0), 0.0);
    assert!(approx(tl.opacity(0.25, 0), 0.5));
    assert!(approx(tl.opacity(0.5, 0), 1.0));

    assert_eq!(tl.opacity(0.5, 1), 0.0);
    assert!(approx(tl.opacity(0.75, 1), 0.5));
    assert!(approx(tl.opacity(1.0, 1), 1.0));

    assert_eq!(tl.total_frames(Fps::TITLE), 90);
}

#[test]
fn overlap_decouples_stagger_spacing_from_fade_speed() {
    let tl = FadeTimeline::new(params(2.0), 2).unwrap();
    assert!(approx(tl.fade_in_per_letter(), 1.0));
    assert!(approx(tl.letter_fade_window(), 0.5));
    assert!(approx(tl.letter_start(1), 1.0));

    assert!(approx(tl.opacity(0.5, 0), 1.0));
    assert_eq!(tl.opacity(1.0, 1), 0.0);
    assert!(approx(tl.opacity(1.25, 1), 0.5));
    assert!(approx(tl.opacity(1.5, 1), 1.0));
}

#[test]
fn fade_out_is_clamped_past_the_window() {
    let tl = FadeTimeline::new(params(1.0), 2).unwrap();
    assert!(approx(tl.fade_out(1.99), 1.0));
    assert!(approx(tl.fade_out(2.0), 1.0));
    assert!(approx(tl.fade_out(2.5), 0.5));
    assert_eq!(tl.fade_out(3.0), 0.0);
    assert_eq!(tl.fade_out(10.0), 0.0);
    assert_eq!(tl.opacity(10.0, 0), 0.0);
}

#[test]
fn zero_letters_are_rejected() {
    let err = FadeTimeline::new(params(1.0), 0).unwrap_err();
    assert!(matches!(err, FadeError::Validation(_)));
}

#[test]
fn invalid_params_are_rejected() {
    let mut p = params(1.0);
    p.overlap_factor = 0.0;
    assert!(FadeTimeline::new(p, 3).is_err());

    let mut p = params(1.0);
    p.fade_out_duration = 0.0;
    assert!(FadeTimeline::new(p, 3).is_err());

    let mut p = params(1.0);
    p.fade_out_start = -0.1;
    assert!(FadeTimeline::new(p, 3).is_err());

    let mut p = params(1.0);
    p.initial_delay = f64::NAN;
    assert!(FadeTimeline::new(p, 3).is_err());
}

#[test]
fn overlong_animations_are_rejected() {
    let mut p = params(1.0);
    p.fade_out_start = 1e300;
    let err = FadeTimeline::new(p, 3).unwrap_err();
    assert!(matches!(err, FadeError::Validation(_)));

    let mut p = params(1.0);
    p.fade_out_start = MAX_ANIMATION_SECS - 1.0;
    let tl = FadeTimeline::new(p, 3).unwrap();
    assert_eq!(tl.total_frames(Fps::TITLE), 18_000);

    p.fade_out_duration = 1.5;
    assert!(FadeTimeline::new(p, 3).is_err());
}

#[test]
fn slots_follow_letter_start() {
    let tl = FadeTimeline::new(params(2.0), 2).unwrap();
    let slots: Vec<LetterSlot> = tl.slots().collect();
    assert_eq!(
        slots,
        vec![
            LetterSlot { index: 0, start_time: 0.0 },
            LetterSlot { index: 1, start_time: 1.0 },
        ]
    );
}

#[test]
fn zero_fade_in_snaps_after_start() {
    let mut p = params(1.0);
    p.fade_in_duration = 0.0;
    let tl = FadeTimeline::new(p, 4).unwrap();
    assert_eq!(tl.opacity(0.0, 3), 0.0);
    assert_eq!(tl.opacity(1.0 / 30.0, 3), 1.0);
}

#[test]
fn fill_opacities_aligns_with_letter_index() {
    let tl = FadeTimeline::new(params(1.0), 3).unwrap();
    let mut out = vec![9.0; 7];
    tl.fill_opacities(0.5, &mut out);
    assert_eq!(out.len(), 3);
    for (i, v) in out.iter().enumerate() {
        assert_eq!(*v, tl.opacity(0.5, i) as f32);
    }
}

#[test]
fn free_function_matches_timeline() {
    let p = params(1.5);
    let tl = FadeTimeline::new(p, 5).unwrap();
    assert_eq!(letter_opacity(&p, 5, 2, 0.9).unwrap(), tl.opacity(0.9, 2));
    assert!(letter_opacity(&p, 0, 0, 0.9).is_err());
}

fn valid_params() -> impl Strategy<Value = FadeParams> {
    (
        -2.0f64..5.0,
        0.0f64..5.0,
        0.0f64..10.0,
        0.001f64..5.0,
        0.01f64..10.0,
    )
        .prop_map(
            |(initial_delay, fade_in_duration, fade_out_start, fade_out_duration, overlap_factor)| {
                FadeParams {
                    initial_delay,
                    fade_in_duration,
                    fade_out_start,
                    fade_out_duration,
                    overlap_factor,
                }
            },
        )
}

proptest! {
    #[test]
    fn opacity_is_always_within_unit_range(
        p in valid_params(),
        letters in 1usize..64,
        t in 0.0f64..20.0,
        pick in 0usize..64,
    ) {
        let tl = FadeTimeline::new(p, letters).unwrap();
        let v = tl.opacity(t, pick % letters);
        prop_assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn fade_in_is_zero_until_letter_start(
        p in valid_params(),
        letters in 1usize..64,
        pick in 0usize..64,
        before in 0.0f64..3.0,
    ) {
        let tl = FadeTimeline::new(p, letters).unwrap();
        let index = pick % letters;
        let t = tl.letter_start(index) - before;
        prop_assert_eq!(tl.fade_in(t, index), 0.0);
    }

    #[test]
    fn total_frames_follows_ceil_formula(p in valid_params()) {
        let tl = FadeTimeline::new(p, 1).unwrap();
        let expected = ((p.fade_out_start + p.fade_out_duration) * 30.0).ceil() as u64;
        prop_assert_eq!(tl.total_frames(Fps::TITLE), expected);
    }
}
