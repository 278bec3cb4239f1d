use std::collections::HashMap;
use std::fmt;
use lazy_static::lazy_static;

/// Custom error types for `Direction`.
#[derive(Debug, Clone)]
pub enum DirectionError {
    /// Indicates that the provided direction string is invalid.
    InvalidDirection(String),
}

impl fmt::Display for DirectionError {
    /// Formats the error message for `DirectionError`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionError::InvalidDirection(value) => {
                write!(f, "Invalid direction: '{}'", value)
            }
        }
    }
}

impl std::error::Error for DirectionError {}

lazy_static! {
    static ref DIRECTION_CONVERTER: HashMap<&'static str, Direction> = {
        let mut m = HashMap::new();
        m.insert("N", Direction::North);
        m.insert("S", Direction::South);
        m.insert("E", Direction::East);
        m.insert("W", Direction::West);
        m
    };
}

/// Cardinal directions for the four approaches of the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

/// Axis of travel an approach belongs to. Opposing directions share an
/// axis and may be served together; crossing axes may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Direction {
    /// All four directions in canonical N, S, E, W order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a string representation to a `Direction`.
    ///
    /// # Arguments
    /// * `direction_str` - Single-letter code ("N", "S", "E", "W").
    ///
    /// # Returns
    /// A `Result` containing the corresponding `Direction` or an error if the string is invalid.
    ///
    /// # Example
    /// ```
    /// use adaptive_signal_core::intersection::Direction;
    /// let d = Direction::from_str("N");
    /// ```
    pub fn from_str(direction_str: &str) -> Result<Self, DirectionError> {
        DIRECTION_CONVERTER
            .get(direction_str)
            .copied()
            .ok_or(DirectionError::InvalidDirection(direction_str.to_string()))
    }

    /// Axis this direction travels along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }

    /// Whether two directions may never be served green at the same time.
    ///
    /// N∥S and E∥W are non-conflicting; every cross-axis pair conflicts.
    pub fn conflicts_with(self, other: Direction) -> bool {
        self.axis() != other.axis()
    }
}

impl fmt::Display for Direction {
    /// Formats the direction for display.
    ///
    /// Returns the single-letter code used in logs, status snapshots
    /// and user interfaces.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use adaptive_signal_core::intersection::Direction;
    ///
    /// assert_eq!(format!("{}", Direction::North), "N");
    /// assert_eq!(format!("{}", Direction::South), "S");
    /// assert_eq!(format!("{}", Direction::East), "E");
    /// assert_eq!(format!("{}", Direction::West), "W");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction_str = match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        };
        write!(f, "{}", direction_str)
    }
}
