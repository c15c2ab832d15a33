use ballcube_controller::{self as controller, query, Controller};
use ballcube_core::{Command, Coordinate, Event, Palette, PaletteColor, PaletteError};

fn coord(text: &str) -> Coordinate {
    text.parse().expect("valid coordinate")
}

#[test]
fn abc_first_step_recolours_one_ball() {
    let mut controller = Controller::new("abc", Palette::with_size(3));
    assert_eq!(controller.max_color_index(), 2);

    let initial = controller.current_state();
    assert_eq!(initial.iteration, 0);
    assert!(initial.sequence_prefix.is_empty());
    assert_eq!(initial.last_selected, None);
    assert!(initial.ball_states.iter().all(|(_, index)| index == 0));

    assert!(controller.step_forward());
    let current = controller.current_state();
    assert_eq!(current.iteration, 1);
    assert_eq!(current.last_selected, Some(coord("1,3,2")));
    assert_eq!(current.sequence_prefix, vec![coord("1,3,2")]);
    assert_eq!(
        current.ball_states.iter().filter(|&(_, index)| index == 1).count(),
        1
    );
    assert_eq!(
        current.ball_states.iter().filter(|&(_, index)| index == 0).count(),
        25
    );
    assert!(!current.finished);
}

#[test]
fn reinitializing_replays_the_same_prefix() {
    let mut controller = Controller::new("abc", Palette::with_size(3));
    let mut first = Vec::new();
    for _ in 0..3 {
        assert!(controller.step_forward());
    }
    first.extend(controller.current_state().sequence_prefix);

    controller.initialize("abc", Palette::with_size(3));
    assert_eq!(controller.iteration(), 0);
    for _ in 0..3 {
        assert!(controller.step_forward());
    }
    assert_eq!(controller.current_state().sequence_prefix, first);
    assert_eq!(first, vec![coord("1,3,2"), coord("2,2,1"), coord("3,2,3")]);
}

#[test]
fn forward_then_backward_restores_state() {
    let mut controller = Controller::new("round trip", Palette::default());
    for _ in 0..7 {
        assert!(controller.step_forward());
    }

    let before = controller.state_at(controller.iteration()).expect("in range");
    let before_current = controller.current_state().ball_states;
    assert!(controller.step_forward());
    assert!(controller.step_backward());
    let after = controller.state_at(controller.iteration()).expect("in range");

    assert_eq!(before.ball_states, after.ball_states);
    assert_eq!(before.progression_levels, after.progression_levels);
    assert_eq!(before_current, controller.current_state().ball_states);
}

#[test]
fn degenerate_palette_is_finished_immediately() {
    let mut controller = Controller::new("abc", Palette::with_size(1));
    assert_eq!(controller.max_color_index(), 0);
    assert_eq!(query::sequence_len(&controller), 0);
    assert!(controller.is_finished());
    assert!(controller.current_state().finished);
    assert!(!controller.step_forward());
    assert!(!controller.step_backward());
    assert_eq!(controller.iteration(), 0);
}

#[test]
fn empty_seed_text_does_not_fail() {
    let mut controller = Controller::new("", Palette::default());
    assert_eq!(controller.engine().base_seed(), 0);
    assert!(controller.step_forward());
}

#[test]
fn backward_at_start_is_rejected() {
    let mut controller = Controller::new("abc", Palette::with_size(3));
    assert!(!controller.step_backward());
    assert_eq!(controller.iteration(), 0);
}

#[test]
fn walking_to_the_end_marks_finished() {
    let mut controller = Controller::new("abc", Palette::with_size(3));
    let mut steps = 0;
    while controller.step_forward() {
        steps += 1;
    }
    assert_eq!(steps, 11);
    assert!(controller.is_finished());
    assert_eq!(controller.current_state().last_selected, Some(coord("1,1,1")));
    assert_eq!(query::color_counts(&controller).get(&2), Some(&1));
}

#[test]
fn state_at_is_absent_outside_the_run() {
    let controller = Controller::new("abc", Palette::with_size(3));
    assert!(controller.state_at(11).is_some());
    assert!(controller.state_at(12).is_none());
}

#[test]
fn commands_report_events() {
    let mut controller = Controller::default();
    let mut events = Vec::new();

    controller::apply(
        &mut controller,
        Command::Initialize {
            seed_text: "abc".to_owned(),
            palette: Palette::with_size(3),
        },
        &mut events,
    );
    controller::apply(&mut controller, Command::StepBackward, &mut events);
    controller::apply(&mut controller, Command::StepForward, &mut events);
    controller::apply(&mut controller, Command::StepBackward, &mut events);

    assert_eq!(
        events,
        vec![
            Event::Initialized {
                base_seed: 96_354,
                sequence_len: 11,
                max_color_index: 2,
            },
            Event::BackwardRejected,
            Event::SteppedForward {
                iteration: 1,
                selected: coord("1,3,2"),
            },
            Event::SteppedBackward { iteration: 0 },
        ]
    );
}

#[test]
fn stepping_past_the_end_reports_finished() {
    let mut controller = Controller::new("abc", Palette::with_size(2));
    let mut events = Vec::new();
    controller::apply(&mut controller, Command::StepForward, &mut events);
    controller::apply(&mut controller, Command::StepForward, &mut events);
    assert_eq!(
        events.last(),
        Some(&Event::SequenceFinished { iteration: 1 })
    );
}

#[test]
fn palette_commands_update_the_cap_without_recomputing() {
    let mut controller = Controller::new("abc", Palette::with_size(3));
    let mut events = Vec::new();
    let color = PaletteColor::from_rgb(0x12, 0x34, 0x56);

    controller::apply(&mut controller, Command::AddPaletteColor { color }, &mut events);
    controller::apply(
        &mut controller,
        Command::SetPaletteColor { index: 1, color },
        &mut events,
    );
    controller::apply(
        &mut controller,
        Command::RemovePaletteColor { index: 0 },
        &mut events,
    );
    controller::apply(
        &mut controller,
        Command::RemovePaletteColor { index: 3 },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::PaletteChanged { max_color_index: 3 },
            Event::PaletteChanged { max_color_index: 3 },
            Event::PaletteEditRejected {
                reason: PaletteError::ReservedIndex,
            },
            Event::PaletteChanged { max_color_index: 2 },
        ]
    );
    assert_eq!(controller.palette().get(1), Some(color));
    assert_eq!(query::sequence_len(&controller), 11);

    events.clear();
    controller::apply(&mut controller, Command::Reset, &mut events);
    assert_eq!(
        events,
        vec![Event::Initialized {
            base_seed: 96_354,
            sequence_len: 11,
            max_color_index: 2,
        }]
    );
}
