//! # Typed Value Synchronizers
//!
//! One [`ValueSync`] implementation per value type the property sync knows
//! how to move. A synchronizer only adapts a value to the matching
//! [`ValueWriter`]/[`ValueReader`] call; it holds no state of its own.
//!
//! | Synchronizer      | Value type              |
//! |-------------------|-------------------------|
//! | [`BoolSync`]      | `bool`                  |
//! | [`ByteSync`]      | `u8`                    |
//! | [`SByteSync`]     | `i8`                    |
//! | [`ShortSync`]     | `i16`                   |
//! | [`UShortSync`]    | `u16`                   |
//! | [`IntSync`]       | `i32`                   |
//! | [`UIntSync`]      | `u32`                   |
//! | [`LongSync`]      | `i64`                   |
//! | [`ULongSync`]     | `u64`                   |
//! | [`FloatSync`]     | `f32`                   |
//! | [`DoubleSync`]    | `f64`                   |
//! | [`StringSync`]    | `String`                |
//! | [`Vector2Sync`]   | [`Vector2`]             |
//! | [`ColorSync`]     | [`Color`]               |
//! | [`GrhIndexSync`]  | [`GrhIndex`]            |
//! | [`MapIndexSync`]  | [`MapIndex`]            |
//! | [`EnumSync<E>`]   | any [`EnumValue`] enum  |

use std::fmt;
use std::marker::PhantomData;

use netgore_core::{Color, GrhIndex, MapIndex, Vector2};
use netgore_protocol::{EnumValue, Result, ValueReader, ValueWriter};

/// Reads and writes one value type through the node reader/writer
pub trait ValueSync: Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn read(&self, name: &str, reader: &mut ValueReader) -> Result<Self::Value>;

    fn write(&self, name: &str, writer: &mut ValueWriter, value: &Self::Value) -> Result<()>;

    /// Whether two values would go out on the wire the same. Decides if a
    /// property is dirty.
    fn same(&self, a: &Self::Value, b: &Self::Value) -> bool {
        a == b
    }
}

macro_rules! copy_value_sync {
    ($(#[$attr:meta])* $sync:ident, $value:ty, $read:ident, $write:ident) => {
        copy_value_sync!($(#[$attr])* $sync, $value, $read, $write, |a: &$value, b: &$value| a == b);
    };
    ($(#[$attr:meta])* $sync:ident, $value:ty, $read:ident, $write:ident, $same:expr) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $sync;

        impl ValueSync for $sync {
            type Value = $value;

            fn read(&self, name: &str, reader: &mut ValueReader) -> Result<$value> {
                reader.$read(name)
            }

            fn write(&self, name: &str, writer: &mut ValueWriter, value: &$value) -> Result<()> {
                writer.$write(name, *value)
            }

            fn same(&self, a: &$value, b: &$value) -> bool {
                ($same)(a, b)
            }
        }
    };
}

copy_value_sync!(BoolSync, bool, read_bool, write_bool);
copy_value_sync!(
    /// Unsigned 8-bit values
    ByteSync,
    u8,
    read_u8,
    write_u8
);
copy_value_sync!(
    /// Signed 8-bit values
    SByteSync,
    i8,
    read_i8,
    write_i8
);
copy_value_sync!(ShortSync, i16, read_i16, write_i16);
copy_value_sync!(UShortSync, u16, read_u16, write_u16);
copy_value_sync!(IntSync, i32, read_i32, write_i32);
copy_value_sync!(UIntSync, u32, read_u32, write_u32);
copy_value_sync!(LongSync, i64, read_i64, write_i64);
copy_value_sync!(ULongSync, u64, read_u64, write_u64);
copy_value_sync!(
    /// Single precision floats, written and compared as their raw bits
    FloatSync,
    f32,
    read_f32,
    write_f32,
    |a: &f32, b: &f32| a.to_bits() == b.to_bits()
);
copy_value_sync!(
    DoubleSync,
    f64,
    read_f64,
    write_f64,
    |a: &f64, b: &f64| a.to_bits() == b.to_bits()
);
copy_value_sync!(
    Vector2Sync,
    Vector2,
    read_vector2,
    write_vector2,
    |a: &Vector2, b: &Vector2| a.x.to_bits() == b.x.to_bits() && a.y.to_bits() == b.y.to_bits()
);
copy_value_sync!(ColorSync, Color, read_color, write_color);
copy_value_sync!(GrhIndexSync, GrhIndex, read_grh_index, write_grh_index);
copy_value_sync!(MapIndexSync, MapIndex, read_map_index, write_map_index);

/// UTF-8 strings of at most 65535 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSync;

impl ValueSync for StringSync {
    type Value = String;

    fn read(&self, name: &str, reader: &mut ValueReader) -> Result<String> {
        reader.read_string(name)
    }

    fn write(&self, name: &str, writer: &mut ValueWriter, value: &String) -> Result<()> {
        writer.write_string(name, value)
    }
}

/// Enums, written by value or by name depending on the reader/writer mode
pub struct EnumSync<E> {
    _enum: PhantomData<fn() -> E>,
}

impl<E> EnumSync<E> {
    pub fn new() -> Self {
        Self { _enum: PhantomData }
    }
}

impl<E> Default for EnumSync<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EnumSync<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumSync<{}>", std::any::type_name::<E>())
    }
}

impl<E> ValueSync for EnumSync<E>
where
    E: EnumValue + PartialEq + Send + Sync,
{
    type Value = E;

    fn read(&self, name: &str, reader: &mut ValueReader) -> Result<E> {
        reader.read_enum(name)
    }

    fn write(&self, name: &str, writer: &mut ValueWriter, value: &E) -> Result<()> {
        writer.write_enum(name, *value)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use netgore_core::EnumIoMode;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Stance {
        Standing = 0,
        Crouching = 1,
        Prone = 7,
    }

    impl EnumValue for Stance {
        fn to_value(self) -> i32 {
            self as i32
        }

        fn from_value(value: i32) -> Option<Self> {
            match value {
                0 => Some(Self::Standing),
                1 => Some(Self::Crouching),
                7 => Some(Self::Prone),
                _ => None,
            }
        }

        fn name(self) -> &'static str {
            match self {
                Self::Standing => "Standing",
                Self::Crouching => "Crouching",
                Self::Prone => "Prone",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            match name {
                "Standing" => Some(Self::Standing),
                "Crouching" => Some(Self::Crouching),
                "Prone" => Some(Self::Prone),
                _ => None,
            }
        }
    }

    fn round_trip<S: ValueSync>(sync: S, value: S::Value, mode: EnumIoMode) -> S::Value {
        let mut writer = ValueWriter::new(mode);
        sync.write("Value", &mut writer, &value).unwrap();
        let bytes = writer.finish().unwrap();
        let mut reader = ValueReader::from_bytes(&bytes, mode);
        sync.read("Value", &mut reader).unwrap()
    }

    #[test]
    fn test_primitive_syncs() {
        let mode = EnumIoMode::Value;
        assert!(round_trip(BoolSync, true, mode));
        assert_eq!(round_trip(ByteSync, u8::MAX, mode), u8::MAX);
        assert_eq!(round_trip(SByteSync, i8::MIN, mode), i8::MIN);
        assert_eq!(round_trip(ShortSync, -1, mode), -1);
        assert_eq!(round_trip(UShortSync, u16::MAX, mode), u16::MAX);
        assert_eq!(round_trip(IntSync, i32::MIN, mode), i32::MIN);
        assert_eq!(round_trip(UIntSync, 0, mode), 0);
        assert_eq!(round_trip(LongSync, i64::MAX, mode), i64::MAX);
        assert_eq!(round_trip(ULongSync, u64::MAX, mode), u64::MAX);
        assert_eq!(round_trip(FloatSync, -0.5, mode), -0.5);
        assert_eq!(round_trip(DoubleSync, 1e300, mode), 1e300);
        assert_eq!(
            round_trip(StringSync, "héllo".to_string(), mode),
            "héllo"
        );
    }

    #[test]
    fn test_domain_value_syncs() {
        let mode = EnumIoMode::Value;
        let position = Vector2::new(12.5, -3.0);
        assert_eq!(round_trip(Vector2Sync, position, mode), position);
        let color = Color::new(10, 20, 30, 40);
        assert_eq!(round_trip(ColorSync, color, mode), color);
        assert_eq!(
            round_trip(GrhIndexSync, GrhIndex::INVALID, mode),
            GrhIndex::INVALID
        );
        assert_eq!(round_trip(MapIndexSync, MapIndex(9), mode), MapIndex(9));
    }

    #[test]
    fn test_enum_sync_follows_mode() {
        for mode in [EnumIoMode::Value, EnumIoMode::Name] {
            assert_eq!(
                round_trip(EnumSync::<Stance>::new(), Stance::Prone, mode),
                Stance::Prone
            );
        }

        // By name the string "Prone" is written instead of the i32
        let mut writer = ValueWriter::new(EnumIoMode::Name);
        EnumSync::<Stance>::new()
            .write("Stance", &mut writer, &Stance::Prone)
            .unwrap();
        assert_eq!(writer.position(), 16 + 5 * 8);
    }

    #[test]
    fn test_float_sameness_is_bitwise() {
        assert!(FloatSync.same(&f32::NAN, &f32::NAN));
        assert!(!FloatSync.same(&0.0, &-0.0));
        assert!(DoubleSync.same(&f64::NAN, &f64::NAN));
        assert!(!DoubleSync.same(&1.0, &2.0));

        let nan = Vector2::new(f32::NAN, 1.0);
        assert!(Vector2Sync.same(&nan, &nan));
        assert!(!Vector2Sync.same(&nan, &Vector2::new(f32::NAN, 2.0)));

        assert!(IntSync.same(&3, &3));
        assert!(!StringSync.same(&"a".to_string(), &"b".to_string()));
    }
}
