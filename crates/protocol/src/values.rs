//! Reads and writes for the engine's small value types

use crate::error::Result;
use crate::reader::ValueReader;
use crate::writer::ValueWriter;
use netgore_core::{Color, GrhIndex, MapIndex, Vector2};

impl ValueWriter {
    /// Vectors are written as two floats, X then Y
    pub fn write_vector2(&mut self, _name: &str, value: Vector2) -> Result<()> {
        self.write_f32("X", value.x)?;
        self.write_f32("Y", value.y)
    }

    /// Colors are written as four bytes, R G B A
    pub fn write_color(&mut self, _name: &str, value: Color) -> Result<()> {
        self.write_u8("R", value.r)?;
        self.write_u8("G", value.g)?;
        self.write_u8("B", value.b)?;
        self.write_u8("A", value.a)
    }

    pub fn write_grh_index(&mut self, name: &str, value: GrhIndex) -> Result<()> {
        self.write_u32(name, value.get())
    }

    pub fn write_map_index(&mut self, name: &str, value: MapIndex) -> Result<()> {
        self.write_u16(name, value.get())
    }
}

impl ValueReader {
    pub fn read_vector2(&mut self, _name: &str) -> Result<Vector2> {
        let x = self.read_f32("X")?;
        let y = self.read_f32("Y")?;
        Ok(Vector2::new(x, y))
    }

    pub fn read_color(&mut self, _name: &str) -> Result<Color> {
        let r = self.read_u8("R")?;
        let g = self.read_u8("G")?;
        let b = self.read_u8("B")?;
        let a = self.read_u8("A")?;
        Ok(Color::new(r, g, b, a))
    }

    pub fn read_grh_index(&mut self, name: &str) -> Result<GrhIndex> {
        Ok(GrhIndex::new(self.read_u32(name)?))
    }

    pub fn read_map_index(&mut self, name: &str) -> Result<MapIndex> {
        Ok(MapIndex::new(self.read_u16(name)?))
    }
}
