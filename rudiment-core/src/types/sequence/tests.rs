//! Tests for the sequencing protocol.

use super::{normalize_name, Exercise, Pattern};
use crate::error::RudimentError;
use crate::types::voice::{Voice, Voices};

/// A pattern whose right hand plays one hit on beat `bar` in bar `bar`
fn numbered(name: &str, num_bars: usize, num_loops: usize) -> Pattern {
    let bars: Vec<Vec<f64>> = (0..num_bars).map(|b| vec![b as f64]).collect();
    Pattern::new(name, Voices::new().right_hand(bars), num_loops).unwrap()
}

#[test]
fn test_pattern_loops_bars_in_order() {
    let mut p = numbered("p", 2, 3);
    assert_eq!(p.max_len(), 6);
    let order: Vec<usize> = (0..6).map(|_| p.advance().unwrap().bar_index).collect();
    assert_eq!(order, vec![0, 1, 0, 1, 0, 1]);
    assert!(p.advance().is_none());
    // Exhaustion is sticky
    assert!(p.advance().is_none());
    assert_eq!(p.cursor(), 6);
}

#[test]
fn test_loop_index_counts_passes() {
    let mut p = numbered("p", 2, 2);
    let loops: Vec<usize> = p.by_ref().map(|f| f.loop_index).collect();
    assert_eq!(loops, vec![0, 0, 1, 1]);
}

#[test]
fn test_at_ignores_cursor_and_loops() {
    let mut p = numbered("p", 3, 1);
    p.advance();
    assert_eq!(p.at(0).bar_index, 0);
    assert_eq!(p.at(4).bar_index, 1);
    assert_eq!(p.at(100).rh(), &[1.0]);
    assert_eq!(p.cursor(), 1);
}

#[test]
fn test_frame_carries_pattern_name() {
    let p = numbered("Warmup", 1, 1);
    let frame = p.at(0);
    assert_eq!(frame.name, "Warmup");
    assert_eq!(frame.rh(), &[0.0]);
    assert!(frame.lh().is_empty());
    assert!(frame.rf().is_empty());
    assert!(frame.lf().is_empty());
}

#[test]
fn test_from_notation_round_trip() {
    let p = Pattern::from_notation(
        "t",
        Voices::new().left_foot(vec!["xxx,---,xxx,---"]),
        1,
    )
    .unwrap();
    assert_eq!(p.at(0).lf(), &[0.0, 0.33, 0.67, 2.0, 2.33, 2.67]);
    assert_eq!(p.num_bars(), 1);
}

#[test]
fn test_from_notation_rejects_bad_marks() {
    let result = Pattern::from_notation("t", Voices::new().right_hand(vec!["x-o-"]), 1);
    match result {
        Err(RudimentError::Parse { message, .. }) => {
            assert!(message.contains("pattern 't' Right Hand"), "{}", message)
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_zero_loops_rejected() {
    let result = Pattern::new("p", Voices::new().right_hand(vec![vec![0.0]]), 0);
    assert!(matches!(result, Err(RudimentError::Validation(_))));
}

#[test]
fn test_pattern_is_last_beat_does_not_move_cursor() {
    let mut p = numbered("p", 2, 1);
    assert!(!p.is_last_beat());
    assert!(!p.is_last_beat());
    assert_eq!(p.cursor(), 0);
    assert_eq!(p.advance().unwrap().bar_index, 0);
    assert!(p.is_last_beat());
    assert!(p.is_last_beat());
    assert_eq!(p.advance().unwrap().bar_index, 1);
    assert!(p.is_last_beat());
    assert!(p.advance().is_none());
}

#[test]
fn test_pattern_preview_and_reset() {
    let mut p = numbered("p", 2, 1);
    assert_eq!(p.preview_next().unwrap().bar_index, 0);
    p.advance();
    assert_eq!(p.preview_next().unwrap().bar_index, 1);
    p.advance();
    assert!(p.preview_next().is_none());
    p.reset();
    p.reset();
    assert_eq!(p.cursor(), 0);
    assert_eq!(p.advance().unwrap().bar_index, 0);
}

#[test]
fn test_pattern_seek_is_clamped() {
    let mut p = numbered("p", 2, 2);
    p.seek(3);
    assert_eq!(p.advance().unwrap().bar_index, 1);
    p.seek(99);
    assert_eq!(p.cursor(), 4);
    assert!(p.advance().is_none());
}

#[test]
fn test_exercise_chains_patterns() {
    let mut ex = Exercise::new(
        "Chain",
        vec![numbered("intro", 1, 1), numbered("groove", 2, 3)],
    );
    assert_eq!(ex.total_len(), 7);
    let names: Vec<String> = ex.by_ref().map(|f| f.name).collect();
    assert_eq!(names.len(), 7);
    assert_eq!(names[0], "intro");
    assert!(names[1..].iter().all(|n| n == "groove"));
    assert!(ex.advance().is_none());
    assert!(ex.is_exhausted());
}

#[test]
fn test_exercise_is_last_beat_across_patterns() {
    let mut ex = Exercise::new("Two", vec![numbered("a", 1, 1), numbered("b", 1, 1)]);
    assert!(!ex.is_last_beat());
    ex.advance();
    // "a" is drained but "b" still has its bar
    assert!(ex.is_last_beat());
    assert_eq!(ex.pattern_idx(), 0);
    assert_eq!(ex.advance().unwrap().name, "b");
    assert!(ex.is_last_beat());
    assert!(ex.advance().is_none());
}

#[test]
fn test_exercise_is_last_beat_is_pure() {
    let mut probed = Exercise::new("x", vec![numbered("a", 2, 1), numbered("b", 1, 2)]);
    let mut plain = probed.clone();
    loop {
        for _ in 0..3 {
            probed.is_last_beat();
        }
        let a = probed.advance();
        let b = plain.advance();
        assert_eq!(a, b);
        if a.is_none() {
            break;
        }
    }
}

#[test]
fn test_exercise_skips_patterns_already_drained() {
    let mut drained = numbered("b", 2, 1);
    drained.seek(2);
    let mut ex = Exercise::new(
        "Skip",
        vec![numbered("a", 1, 1), drained, numbered("c", 1, 1)],
    );
    assert_eq!(ex.remaining(), 2);
    assert_eq!(ex.advance().unwrap().name, "a");
    assert_eq!(ex.preview_next().unwrap().name, "c");
    assert_eq!(ex.advance().unwrap().name, "c");
    assert!(ex.advance().is_none());
}

#[test]
fn test_next_pattern_continues_from_its_own_cursor() {
    let mut second = numbered("b", 3, 1);
    second.seek(1);
    let mut ex = Exercise::new("Resume", vec![numbered("a", 1, 1), second]);
    ex.advance();
    assert_eq!(ex.advance().unwrap().bar_index, 1);
}

#[test]
fn test_exercise_reset_rewinds_everything() {
    let mut ex = Exercise::new("R", vec![numbered("a", 1, 1), numbered("b", 2, 1)]);
    while ex.advance().is_some() {}
    ex.reset();
    assert_eq!(ex.pattern_idx(), 0);
    assert!(ex.patterns().iter().all(|p| p.cursor() == 0));
    assert_eq!(ex.remaining(), 3);
    assert_eq!(ex.advance().unwrap().name, "a");
}

#[test]
fn test_exercise_preview_and_upcoming() {
    let mut ex = Exercise::new("P", vec![numbered("a", 1, 1), numbered("b", 2, 1)]);
    assert_eq!(ex.preview_next().unwrap().name, "a");
    ex.advance();
    let upcoming = ex.upcoming(5);
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0].name, "b");
    assert_eq!(upcoming[1].bar_index, 1);
    assert_eq!(ex.remaining(), 2);
    assert_eq!(ex.preview_next().unwrap().bar_index, 0);
}

#[test]
fn test_empty_exercise_is_exhausted() {
    let mut ex = Exercise::new("Empty", Vec::new());
    assert!(ex.is_exhausted());
    assert!(ex.is_last_beat());
    assert!(ex.preview_next().is_none());
    assert!(ex.advance().is_none());
}

#[test]
fn test_normalize_name() {
    assert_eq!(normalize_name("Basic Rock Beat"), "basicrockbeat");
    let ex = Exercise::new("Four On The Floor", Vec::new());
    assert_eq!(ex.normalized_name(), "fouronthefloor");
}

#[test]
fn test_voices_stay_aligned() {
    let p = Pattern::new(
        "aligned",
        Voices::new()
            .right_hand(vec![vec![0.0], vec![1.0]])
            .with(Voice::LeftFoot, vec![vec![], vec![0.5]]),
        1,
    )
    .unwrap();
    for voice in Voice::ALL {
        assert_eq!(p.bars().lane(voice).len(), 2);
    }
}

#[test]
fn test_pattern_too_long_to_count_is_rejected() {
    let bars = vec![vec![0.0], vec![1.0]];
    assert!(matches!(
        Pattern::new("huge", Voices::new().right_hand(bars), usize::MAX),
        Err(RudimentError::Validation(_))
    ));
}

#[test]
fn test_exercise_length_saturates() {
    let mut ex = Exercise::new(
        "Endless",
        vec![numbered("a", 1, usize::MAX), numbered("b", 1, 2)],
    );
    assert_eq!(ex.total_len(), usize::MAX);
    assert_eq!(ex.remaining(), usize::MAX);
    assert!(!ex.is_last_beat());
    assert_eq!(ex.size_hint(), (usize::MAX, None));
    assert_eq!(ex.advance().unwrap().name, "a");
    // usize::MAX - 1 + 2 still does not fit
    assert_eq!(ex.size_hint(), (usize::MAX, None));
    assert_eq!(ex.patterns()[0].remaining(), usize::MAX - 1);
}
