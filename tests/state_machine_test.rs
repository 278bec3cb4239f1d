use adaptive_signal_core::intersection::Direction;
use adaptive_signal_core::signals::{
    PhaseRing, PhaseStep, SignalMachine, VehicleSignal,
};
use adaptive_signal_core::timing::TimingConstraints;

const TICK_S: f64 = 0.1;

fn standard_machine() -> (SignalMachine, TimingConstraints) {
    let timing = TimingConstraints::default();
    let ring = PhaseRing::standard_4way(&timing);
    (SignalMachine::new(ring, 0.0), timing)
}

fn assert_no_conflicts(machine: &SignalMachine) {
    let granting = machine.granting_directions();
    for (i, d1) in granting.iter().enumerate() {
        for d2 in granting.iter().skip(i + 1) {
            assert!(
                !d1.conflicts_with(*d2),
                "CONFLICT: {} and {} both green! Phase={}, Step={}",
                d1,
                d2,
                machine.current_phase().id,
                machine.current_step()
            );
        }
    }
}

#[test]
fn test_no_conflicts_during_normal_cycling() {
    // 5000 ticks at 10 Hz = ~500 seconds of operation
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;
    for _ in 0..5000 {
        now += TICK_S;
        machine.tick(now);
        assert_no_conflicts(&machine);
    }
    assert!(machine.get_cycle_count() > 0, "never completed a cycle");
}

#[test]
fn test_no_conflicts_during_preemption() {
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;

    // Run for a bit, then preempt
    for _ in 0..100 {
        now += TICK_S;
        machine.tick(now);
    }

    machine.request_preemption(Direction::East, now);

    for _ in 0..200 {
        now += TICK_S;
        machine.tick(now);
        assert_no_conflicts(&machine);
    }

    machine.clear_preemption(now);

    for _ in 0..200 {
        now += TICK_S;
        machine.tick(now);
        assert_no_conflicts(&machine);
    }
}

#[test]
fn test_yellow_always_follows_green() {
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;
    let mut saw_yellow = false;
    let mut prev_step = machine.current_step();

    for _ in 0..2000 {
        now += TICK_S;
        machine.tick(now);

        let curr = machine.current_step();
        if prev_step == PhaseStep::Green && curr != PhaseStep::Green {
            assert_eq!(
                curr,
                PhaseStep::Yellow,
                "Expected yellow after green, got {}",
                curr
            );
            saw_yellow = true;
        }
        prev_step = curr;
    }

    assert!(saw_yellow, "Never saw a green → yellow transition");
}

#[test]
fn test_all_red_always_follows_yellow() {
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;
    let mut saw_all_red = false;
    let mut prev_step = machine.current_step();

    for _ in 0..2000 {
        now += TICK_S;
        machine.tick(now);

        let curr = machine.current_step();
        if prev_step == PhaseStep::Yellow && curr != PhaseStep::Yellow {
            assert_eq!(
                curr,
                PhaseStep::AllRed,
                "Expected all-red after yellow, got {}",
                curr
            );
            saw_all_red = true;
        }
        prev_step = curr;
    }

    assert!(saw_all_red, "Never saw a yellow → all-red transition");
}

#[test]
fn test_direction_clearance_between_green_periods() {
    // For every direction: between two vehicle-green periods the head
    // must pass through yellow, and an interval with nothing granted
    // (all-red) must occur before the next green.
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;

    let mut was_green = [false; 4];
    let mut saw_yellow_since_green = [true; 4];
    let mut saw_all_red_since_green = [true; 4];

    for _ in 0..6000 {
        now += TICK_S;
        machine.tick(now);

        let all_quiet = machine.granting_directions().is_empty();
        for (i, direction) in Direction::ALL.iter().enumerate() {
            match machine.head(*direction).vehicle {
                VehicleSignal::Green => {
                    if !was_green[i] {
                        assert!(
                            saw_yellow_since_green[i],
                            "{} went green again without a yellow in between",
                            direction
                        );
                        assert!(
                            saw_all_red_since_green[i],
                            "{} went green again without an all-red in between",
                            direction
                        );
                        was_green[i] = true;
                        saw_yellow_since_green[i] = false;
                        saw_all_red_since_green[i] = false;
                    }
                }
                VehicleSignal::Yellow => {
                    if was_green[i] {
                        was_green[i] = false;
                        saw_yellow_since_green[i] = true;
                    }
                }
                VehicleSignal::Red => {
                    // Green must never drop straight to red
                    assert!(
                        !was_green[i],
                        "{} went green → red without yellow",
                        direction
                    );
                    if all_quiet {
                        saw_all_red_since_green[i] = true;
                    }
                }
            }
        }
    }
}

#[test]
fn test_minimum_green_honored() {
    let (mut machine, timing) = standard_machine();
    let mut now = 0.0;
    let mut green_start: Option<(f64, bool)> = None;
    let mut prev_step = machine.current_step();

    for _ in 0..6000 {
        now += TICK_S;
        machine.tick(now);
        let curr = machine.current_step();

        if prev_step != PhaseStep::Green && curr == PhaseStep::Green {
            green_start = Some((now, machine.current_phase().is_left_turn()));
        }
        if prev_step == PhaseStep::Green && curr != PhaseStep::Green {
            if let Some((start, is_left_turn)) = green_start.take() {
                let duration = now - start;
                let min_expected = if is_left_turn {
                    timing.min_protected_left_green_s
                } else {
                    timing.min_green_s
                };
                assert!(
                    duration >= min_expected - TICK_S,
                    "Green was only {:.1}s (min={:.1}s)",
                    duration,
                    min_expected
                );
            }
        }
        prev_step = curr;
    }
}

#[test]
fn test_maximum_green_honored() {
    let (mut machine, timing) = standard_machine();
    let mut now = 0.0;
    let mut green_start: Option<(f64, bool)> = None;
    let mut prev_step = machine.current_step();

    for _ in 0..6000 {
        now += TICK_S;
        machine.tick(now);
        let curr = machine.current_step();

        if prev_step != PhaseStep::Green && curr == PhaseStep::Green {
            green_start = Some((now, machine.current_phase().is_left_turn()));
        }
        if prev_step == PhaseStep::Green && curr != PhaseStep::Green {
            if let Some((start, is_left_turn)) = green_start.take() {
                let duration = now - start;
                let max_expected = if is_left_turn {
                    timing.max_protected_left_green_s
                } else {
                    timing.max_green_s
                };
                assert!(
                    duration <= max_expected + TICK_S,
                    "Green ran {:.1}s (max={:.1}s)",
                    duration,
                    max_expected
                );
            }
        }
        prev_step = curr;
    }
}

#[test]
fn test_preemption_gives_green_to_requested_direction() {
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;

    // Advance well into normal cycling first
    for _ in 0..200 {
        now += TICK_S;
        machine.tick(now);
    }

    machine.request_preemption(Direction::North, now);

    let mut saw_yellow = false;
    let mut saw_all_red = false;
    for _ in 0..300 {
        now += TICK_S;
        machine.tick(now);
        match machine.current_step() {
            PhaseStep::Yellow => saw_yellow = true,
            PhaseStep::AllRed => saw_all_red = true,
            _ => {}
        }
        if machine.head(Direction::North).vehicle == VehicleSignal::Green {
            assert!(saw_yellow, "preemption green granted without yellow clearance");
            assert!(saw_all_red, "preemption green granted without all-red clearance");
            // Only the preempted direction is served
            for other in [Direction::South, Direction::East, Direction::West] {
                assert_eq!(machine.head(other).vehicle, VehicleSignal::Red);
            }
            return;
        }
    }
    panic!("Preemption never gave green to N");
}

#[test]
fn test_preemption_from_all_red_waits_for_boundary() {
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;

    // Walk the machine into an all-red step
    while machine.current_step() != PhaseStep::AllRed {
        now += TICK_S;
        machine.tick(now);
    }

    machine.request_preemption(Direction::West, now);
    // Still in all-red; the hold starts at the normal boundary
    assert_eq!(machine.current_step(), PhaseStep::AllRed);

    for _ in 0..100 {
        now += TICK_S;
        machine.tick(now);
        if machine.head(Direction::West).vehicle == VehicleSignal::Green {
            return;
        }
    }
    panic!("Preemption hold never started from all-red entry");
}

#[test]
fn test_preemption_clear_resumes_cycling() {
    let (mut machine, _) = standard_machine();
    let mut now = 0.0;

    machine.request_preemption(Direction::East, now);
    for _ in 0..200 {
        now += TICK_S;
        machine.tick(now);
    }
    assert!(machine.is_preempted());

    machine.clear_preemption(now);
    assert!(!machine.is_preempted());

    // Cycling resumes and completes cycles again
    let start_cycles = machine.get_cycle_count();
    for _ in 0..2000 {
        now += TICK_S;
        machine.tick(now);
        assert_no_conflicts(&machine);
    }
    assert!(machine.get_cycle_count() > start_cycles);
}
