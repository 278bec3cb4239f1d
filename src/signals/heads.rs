use crate::intersection::direction::Direction;
use std::fmt;

/// Display state of the vehicle (through) channel of a signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleSignal {
    Red,
    Green,
    Yellow,
}

impl fmt::Display for VehicleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VehicleSignal::Red => "red",
            VehicleSignal::Green => "green",
            VehicleSignal::Yellow => "yellow",
        };
        write!(f, "{}", s)
    }
}

/// Display state of the left-turn channel of a signal head.
///
/// `FlashingYellow` is the permissive mode: turn allowed after yielding
/// to oncoming traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeftTurnSignal {
    Red,
    GreenArrow,
    YellowArrow,
    FlashingYellow,
}

impl fmt::Display for LeftTurnSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LeftTurnSignal::Red => "red",
            LeftTurnSignal::GreenArrow => "green_arrow",
            LeftTurnSignal::YellowArrow => "yellow_arrow",
            LeftTurnSignal::FlashingYellow => "flashing_yellow",
        };
        write!(f, "{}", s)
    }
}

/// Display state of the pedestrian channel of a signal head.
///
/// `PedClearance` is the flashing DON'T WALK interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PedestrianSignal {
    DontWalk,
    Walk,
    PedClearance,
}

impl fmt::Display for PedestrianSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PedestrianSignal::DontWalk => "dont_walk",
            PedestrianSignal::Walk => "walk",
            PedestrianSignal::PedClearance => "ped_clearance",
        };
        write!(f, "{}", s)
    }
}

/// Current display state for one direction's signal head.
///
/// Three independent channels: vehicle, left-turn and pedestrian.
/// All channels start red / don't-walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalHead {
    pub direction: Direction,
    pub vehicle: VehicleSignal,
    pub left_turn: LeftTurnSignal,
    pub pedestrian: PedestrianSignal,
}

impl SignalHead {
    pub fn new(direction: Direction) -> Self {
        SignalHead {
            direction,
            vehicle: VehicleSignal::Red,
            left_turn: LeftTurnSignal::Red,
            pedestrian: PedestrianSignal::DontWalk,
        }
    }

    /// Resets all channels to red / don't-walk.
    pub fn set_all_red(&mut self) {
        self.vehicle = VehicleSignal::Red;
        self.left_turn = LeftTurnSignal::Red;
        self.pedestrian = PedestrianSignal::DontWalk;
    }

    /// Whether this head grants (or is still clearing) right of way to
    /// its direction. Yellow counts: traffic may legally be inside the
    /// intersection during the yellow interval.
    pub fn grants_movement(&self) -> bool {
        matches!(self.vehicle, VehicleSignal::Green | VehicleSignal::Yellow)
            || self.left_turn == LeftTurnSignal::GreenArrow
    }
}
