use crate::errors::{BaleenError, ErrorKind};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn is_up(&self) -> bool {
        matches!(self, Direction::Up)
    }

    pub fn is_down(&self) -> bool {
        matches!(self, Direction::Down)
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = BaleenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(BaleenError::new(
                &format!("Unknown direction '{}', expected 'up' or 'down'", other),
                ErrorKind::InvalidArgument,
            )),
        }
    }
}

/// Value of a custom run option.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// Immutable options of a run.
///
/// # Fields
/// * `direction` - Whether versions are migrated up or down
/// * `forced` - Run versions even if they already match the direction
/// * `dry_run` - Go through the motions without invoking migration bodies
/// * `exception_on_skip` - Treat a skipped version as a `RefuseToRun` error
/// * `custom` - Free-form options passed to options-aware migrations
///
/// Every `with_*` method returns a new instance; equality is structural.
///
/// # Example
/// ```rust
/// use baleen::runner::{Direction, RunOptions};
///
/// let options = RunOptions::up().with_forced(true).with_custom("batch_size", 500i64);
/// assert_eq!(options.direction(), Direction::Up);
/// assert_ne!(options, RunOptions::up());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunOptions {
    direction: Direction,
    forced: bool,
    dry_run: bool,
    exception_on_skip: bool,
    custom: BTreeMap<String, OptionValue>,
}

impl RunOptions {
    pub fn new(direction: Direction) -> Self {
        RunOptions {
            direction,
            forced: false,
            dry_run: false,
            exception_on_skip: true,
            custom: BTreeMap::new(),
        }
    }

    pub fn up() -> Self {
        Self::new(Direction::Up)
    }

    pub fn down() -> Self {
        Self::new(Direction::Down)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn is_exception_on_skip(&self) -> bool {
        self.exception_on_skip
    }

    pub fn custom(&self) -> &BTreeMap<String, OptionValue> {
        &self.custom
    }

    pub fn custom_value(&self, key: &str) -> Option<&OptionValue> {
        self.custom.get(key)
    }

    pub fn with_direction(&self, direction: Direction) -> Self {
        RunOptions {
            direction,
            ..self.clone()
        }
    }

    pub fn with_forced(&self, forced: bool) -> Self {
        RunOptions {
            forced,
            ..self.clone()
        }
    }

    pub fn with_dry_run(&self, dry_run: bool) -> Self {
        RunOptions {
            dry_run,
            ..self.clone()
        }
    }

    pub fn with_exception_on_skip(&self, exception_on_skip: bool) -> Self {
        RunOptions {
            exception_on_skip,
            ..self.clone()
        }
    }

    /// Returns a copy with one custom option set.
    pub fn with_custom(&self, key: &str, value: impl Into<OptionValue>) -> Self {
        let mut custom = self.custom.clone();
        custom.insert(key.to_string(), value.into());
        RunOptions {
            custom,
            ..self.clone()
        }
    }

    /// Returns a copy whose custom options are replaced by `custom`.
    pub fn with_custom_map(&self, custom: BTreeMap<String, OptionValue>) -> Self {
        RunOptions {
            custom,
            ..self.clone()
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::default();
        assert_eq!(options.direction(), Direction::Up);
        assert!(!options.is_forced());
        assert!(!options.is_dry_run());
        assert!(options.is_exception_on_skip());
        assert!(options.custom().is_empty());
    }

    #[test]
    fn test_with_methods_return_new_instances() {
        let original = RunOptions::up();
        let forced = original.with_forced(true);
        assert!(!original.is_forced());
        assert!(forced.is_forced());

        let down = original.with_direction(Direction::Down);
        assert_eq!(original.direction(), Direction::Up);
        assert_eq!(down.direction(), Direction::Down);

        assert!(original.with_dry_run(true).is_dry_run());
        assert!(!original.with_exception_on_skip(false).is_exception_on_skip());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(RunOptions::up().with_forced(true), RunOptions::up().with_forced(true));
        assert_ne!(RunOptions::up(), RunOptions::down());
        assert_eq!(
            RunOptions::up().with_custom("env", "prod"),
            RunOptions::up().with_custom("env", "prod")
        );
        assert_ne!(
            RunOptions::up().with_custom("env", "prod"),
            RunOptions::up().with_custom("env", "dev")
        );
    }

    #[test]
    fn test_custom_values() {
        let options = RunOptions::up()
            .with_custom("batch", 10i64)
            .with_custom("verbose", true)
            .with_custom("ratio", 0.5);
        assert_eq!(options.custom_value("batch"), Some(&OptionValue::Int(10)));
        assert_eq!(options.custom_value("verbose"), Some(&OptionValue::Bool(true)));
        assert_eq!(options.custom_value("ratio"), Some(&OptionValue::Float(0.5)));
        assert_eq!(options.custom_value("missing"), None);

        let replaced = options.with_custom_map(BTreeMap::new());
        assert!(replaced.custom().is_empty());
        assert_eq!(options.custom().len(), 3);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        let err = "sideways".parse::<Direction>().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert!(Direction::Down.is_down());
    }
}
