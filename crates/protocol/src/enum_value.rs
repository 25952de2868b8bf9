//! Enum conversion used by the enum reads and writes
//!
//! Enums travel either as their underlying integer or as their symbolic name,
//! depending on the [`EnumIoMode`](netgore_core::EnumIoMode) of the reader or
//! writer.

/// An enum that can be written by value or by name
pub trait EnumValue: Copy + Sized + 'static {
    /// Underlying integer value
    fn to_value(self) -> i32;

    /// Look up a variant by its underlying value
    fn from_value(value: i32) -> Option<Self>;

    /// Symbolic name of the variant
    fn name(self) -> &'static str;

    /// Look up a variant by its symbolic name
    fn from_name(name: &str) -> Option<Self>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Enum used by the reader and writer tests
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Facing {
        North = 0,
        East = 1,
        South = 2,
        West = -1,
    }

    impl EnumValue for Facing {
        fn to_value(self) -> i32 {
            self as i32
        }

        fn from_value(value: i32) -> Option<Self> {
            match value {
                0 => Some(Self::North),
                1 => Some(Self::East),
                2 => Some(Self::South),
                -1 => Some(Self::West),
                _ => None,
            }
        }

        fn name(self) -> &'static str {
            match self {
                Self::North => "North",
                Self::East => "East",
                Self::South => "South",
                Self::West => "West",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            match name {
                "North" => Some(Self::North),
                "East" => Some(Self::East),
                "South" => Some(Self::South),
                "West" => Some(Self::West),
                _ => None,
            }
        }
    }

    #[test]
    fn test_value_and_name_agree() {
        for facing in [Facing::North, Facing::East, Facing::South, Facing::West] {
            assert_eq!(Facing::from_value(facing.to_value()), Some(facing));
            assert_eq!(Facing::from_name(facing.name()), Some(facing));
        }
        assert_eq!(Facing::from_value(9), None);
        assert_eq!(Facing::from_name("north"), None);
    }
}
