//! Host-level tests for the render loop, driven by simulated revolutions.

mod common;

use common::{MockLed, MockRtc};
use platter_pov::{
    animation::AnimationClock,
    clock::ClockReading,
    config::DisplayConfig,
    interrupt::RotationSnapshot,
    pattern::{half, Advance, Pattern, PatternSelector},
    render::{Frame, Renderer},
    rotation::{Position, Sector},
};

const CONFIG: DisplayConfig = DisplayConfig::DEFAULT;
const PERIOD: u32 = 1_000;

static HALF: Pattern = Pattern::Half;
static CLOCK_FACE: Pattern = Pattern::ClockFace;

fn measured(ticks: u32) -> Option<RotationSnapshot> {
    Some(RotationSnapshot {
        ticks,
        average: PERIOD,
    })
}

#[test]
fn nothing_rendered_before_first_revolution() {
    let mut renderer = Renderer::new(CONFIG, PatternSelector::fixed(&HALF));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::default();
    let mut led = MockLed::default();

    assert_eq!(renderer.step(None, &animation, &mut rtc, &mut led), Frame::Suspended);
    let unmeasured = Some(RotationSnapshot {
        ticks: 700,
        average: 0,
    });
    assert_eq!(renderer.step(unmeasured, &animation, &mut rtc, &mut led), Frame::Suspended);
    assert_eq!(led.writes, 0);
    assert_eq!(rtc.reads, 0);
    assert_eq!(renderer.sector(), None);
}

#[test]
fn visible_sector_draws_pattern() {
    let mut renderer = Renderer::new(CONFIG, PatternSelector::fixed(&HALF));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::default();
    let mut led = MockLed::default();

    let mut visible = 0;
    for ticks in 0..PERIOD {
        match renderer.step(measured(ticks), &animation, &mut rtc, &mut led) {
            Frame::Visible {
                position,
                pattern,
                lit,
            } => {
                visible += 1;
                assert_eq!(pattern, Pattern::Half);
                assert!(position.get() < CONFIG.visible_span);
                assert_eq!(lit, half(position));
                assert_eq!(led.lit, Some(lit));
            }
            Frame::Hidden { position, .. } => {
                assert!(position.get() >= CONFIG.visible_span);
                assert_eq!(led.lit, Some(false));
            }
            Frame::Suspended => panic!("revolution was measured"),
        }
    }
    // Roughly three quarters of the revolution is visible
    assert!((700..800).contains(&visible), "{visible} visible iterations");
}

#[test]
fn half_revolution_is_visible_and_lit() {
    let mut renderer = Renderer::new(CONFIG, PatternSelector::fixed(&HALF));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::default();
    let mut led = MockLed::default();

    assert_eq!(
        renderer.step(measured(500), &animation, &mut rtc, &mut led),
        Frame::Visible {
            position: Position::new(97),
            pattern: Pattern::Half,
            lit: true
        }
    );
    assert_eq!(renderer.sector(), Some(Sector::Visible));
}

#[test]
fn clock_refresh_once_per_hidden_entry() {
    let mut renderer = Renderer::new(CONFIG, PatternSelector::fixed(&HALF));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::at(12, 0, 0, 0);
    let mut led = MockLed::default();

    let mut entries = 0;
    let mut was_hidden = false;
    for _revolution in 0..5 {
        for ticks in (0..PERIOD).step_by(3) {
            let frame = renderer.step(measured(ticks), &animation, &mut rtc, &mut led);
            let hidden = matches!(frame, Frame::Hidden { .. });
            if let Frame::Hidden { refreshed, .. } = frame {
                assert_eq!(refreshed, !was_hidden, "refresh only on entry");
            }
            if hidden && !was_hidden {
                entries += 1;
            }
            was_hidden = hidden;
        }
    }
    // Starts hidden, then one hidden stretch per revolution straddling the index pulse
    assert_eq!(entries, 6);
    assert_eq!(rtc.reads, entries);
}

#[test]
fn clock_face_uses_time_fetched_while_hidden() {
    let mut renderer = Renderer::new(CONFIG, PatternSelector::fixed(&CLOCK_FACE));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::at(3, 30, 30, 0);
    let mut led = MockLed::default();

    // Tick 0 is hidden: fetch the time
    assert_eq!(
        renderer.step(measured(0), &animation, &mut rtc, &mut led),
        Frame::Hidden {
            position: Position::new(224),
            refreshed: true
        }
    );
    assert_eq!(renderer.clock().reading(), ClockReading::new(3, 30, 30, 0).unwrap());

    let mut seen = (false, false);
    for ticks in 200..880 {
        if let Frame::Visible { position, lit, .. } =
            renderer.step(measured(ticks), &animation, &mut rtc, &mut led)
        {
            // Minute and second hands overlap at 96 and cancel
            if position == Position::new(96) {
                assert!(!lit);
                seen.0 = true;
            }
            // Inside the hour band
            if position == Position::new(20) {
                assert!(lit);
                seen.1 = true;
            }
        }
    }
    assert_eq!(seen, (true, true));
    assert_eq!(renderer.clock().recompute_count(), 1);
}

#[test]
fn bus_failure_keeps_drawing_previous_time() {
    let mut renderer = Renderer::new(CONFIG, PatternSelector::fixed(&CLOCK_FACE));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::at(4, 0, 0, 0);
    let mut led = MockLed::default();

    renderer.step(measured(0), &animation, &mut rtc, &mut led);
    renderer.step(measured(500), &animation, &mut rtc, &mut led);

    rtc.fail = true;
    assert_eq!(
        renderer.step(measured(0), &animation, &mut rtc, &mut led),
        Frame::Hidden {
            position: Position::new(224),
            refreshed: false
        }
    );
    assert_eq!(renderer.clock().reading(), ClockReading::new(4, 0, 0, 0).unwrap());
    assert_eq!(led.lit, Some(false));
}

#[test]
fn playlist_advances_with_animation() {
    static PLAYLIST: [Pattern; 2] = [Pattern::Half, Pattern::EveryOther];
    let mut renderer = Renderer::new(CONFIG, PatternSelector::new(&PLAYLIST, Advance::OnPhaseWrap));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::default();
    let mut led = MockLed::default();

    for _ in 0..255 {
        animation.tick();
    }
    renderer.step(measured(500), &animation, &mut rtc, &mut led);
    assert_eq!(renderer.pattern(), Pattern::Half);

    animation.tick();
    assert_eq!(animation.phase(), 0);
    let frame = renderer.step(measured(500), &animation, &mut rtc, &mut led);
    assert_eq!(
        frame,
        Frame::Visible {
            position: Position::new(97),
            pattern: Pattern::EveryOther,
            lit: true
        }
    );
}

#[test]
fn radar_sweeps_back_before_handing_over() {
    static PLAYLIST: [Pattern; 2] = [Pattern::Radar, Pattern::Half];
    let mut renderer = Renderer::new(CONFIG, PatternSelector::new(&PLAYLIST, Advance::OnPhaseWrap));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::default();
    let mut led = MockLed::default();
    // Tick 173 puts the LED at position 180, near the far end of the sweep
    let near_end = measured(173);

    for _ in 0..177 {
        animation.tick();
    }
    // Forward leg ends: the window now runs 175..191 on its way back
    assert_eq!(
        renderer.step(near_end, &animation, &mut rtc, &mut led),
        Frame::Visible {
            position: Position::new(180),
            pattern: Pattern::Radar,
            lit: true
        }
    );
    assert_eq!(animation.phase(), 1);
    assert_eq!(renderer.pattern(), Pattern::Radar);

    let mut reversed_lit = 1;
    for _ in 1..177 {
        animation.tick();
        match renderer.step(near_end, &animation, &mut rtc, &mut led) {
            Frame::Visible { pattern, lit, .. } => {
                assert_eq!(pattern, Pattern::Radar);
                reversed_lit += usize::from(lit);
            }
            frame => panic!("unexpected {frame:?}"),
        }
    }
    // Window covers 180 for phases 1..=11 of the reverse leg, then the return turns it round
    assert_eq!(reversed_lit, 11);
    assert_eq!(renderer.pattern(), Pattern::Half);
    assert_eq!(animation.phase(), 1);

    assert_eq!(
        renderer.step(near_end, &animation, &mut rtc, &mut led),
        Frame::Visible {
            position: Position::new(180),
            pattern: Pattern::Half,
            lit: false
        }
    );
}

#[test]
fn precalculated_clock_face() {
    static PRECALCULATED: Pattern = Pattern::Precalculated;
    let mut renderer = Renderer::new(CONFIG, PatternSelector::fixed(&PRECALCULATED));
    let animation = AnimationClock::new();
    let mut rtc = MockRtc::default();
    let mut led = MockLed::default();

    renderer.clock().replace_reading(ClockReading::new(3, 0, 0, 0).unwrap());
    renderer.precalculate(Pattern::ClockFace, &animation);

    // Position 97 is past the 3 o'clock hour band
    assert_eq!(
        renderer.step(measured(500), &animation, &mut rtc, &mut led),
        Frame::Visible {
            position: Position::new(97),
            pattern: Pattern::Precalculated,
            lit: false
        }
    );
    assert_eq!(renderer.config().visible_span, 192);
}
