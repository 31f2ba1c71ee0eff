//! Typed, element-strided vertex attribute storage.
//!
//! A [`BufferAttribute`] owns a flat array of components of a single numeric
//! type and groups them into elements of `item_size` components. Component
//! access goes through `f64` so every source type round-trips exactly.

use crate::math::Mat4;

/// Flat component storage, one variant per supported component type.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeArray {
    /// Signed 8-bit integers.
    I8(Vec<i8>),
    /// Unsigned 8-bit integers.
    U8(Vec<u8>),
    /// Signed 16-bit integers.
    I16(Vec<i16>),
    /// Unsigned 16-bit integers.
    U16(Vec<u16>),
    /// Unsigned 32-bit integers.
    U32(Vec<u32>),
    /// 32-bit floats.
    F32(Vec<f32>),
}

macro_rules! each_array {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            AttributeArray::I8($v) => $body,
            AttributeArray::U8($v) => $body,
            AttributeArray::I16($v) => $body,
            AttributeArray::U16($v) => $body,
            AttributeArray::U32($v) => $body,
            AttributeArray::F32($v) => $body,
        }
    };
}

impl AttributeArray {
    /// Number of components stored.
    pub fn len(&self) -> usize {
        each_array!(self, v => v.len())
    }

    /// Whether no components are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw native-endian bytes of the stored components.
    pub fn as_bytes(&self) -> &[u8] {
        each_array!(self, v => bytemuck::cast_slice(v.as_slice()))
    }

    /// Component at flat position `i` as `f64`, or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<f64> {
        each_array!(self, v => v.get(i).map(|c| *c as f64))
    }

    /// Write `value` at flat position `i`, saturating to the component type.
    ///
    /// Returns `false` if `i` is out of range.
    pub fn set(&mut self, i: usize, value: f64) -> bool {
        each_array!(self, v => match v.get_mut(i) {
            Some(slot) => {
                // `as` from f64 saturates for integer targets
                *slot = value as _;
                true
            }
            None => false,
        })
    }

    /// Component at flat position `i`, mapped to `[0, 1]` / `[-1, 1]` for
    /// integer types. Floats are returned unchanged.
    pub fn get_normalized(&self, i: usize) -> Option<f32> {
        Some(match self {
            Self::I8(v) => (*v.get(i)? as f32 / 127.0).max(-1.0),
            Self::U8(v) => *v.get(i)? as f32 / 255.0,
            Self::I16(v) => (*v.get(i)? as f32 / 32767.0).max(-1.0),
            Self::U16(v) => *v.get(i)? as f32 / 65535.0,
            Self::U32(v) => (*v.get(i)? as f64 / u32::MAX as f64) as f32,
            Self::F32(v) => *v.get(i)?,
        })
    }
}

/// A typed array grouped into fixed-size elements.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferAttribute {
    array: AttributeArray,
    item_size: usize,
    normalized: bool,
}

impl BufferAttribute {
    /// Wrap `array` as elements of `item_size` components.
    ///
    /// Trailing components that do not fill a whole element are not counted.
    pub fn new(array: AttributeArray, item_size: usize, normalized: bool) -> Self {
        debug_assert!(item_size > 0);
        Self {
            array,
            item_size,
            normalized,
        }
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.array.len() / self.item_size.max(1)
    }

    /// Components per element.
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Whether integer components are meant to be read normalized.
    pub fn normalized(&self) -> bool {
        self.normalized
    }

    /// Underlying component storage.
    pub fn array(&self) -> &AttributeArray {
        &self.array
    }

    /// Component `component` of element `index`.
    pub fn get(&self, index: usize, component: usize) -> Option<f64> {
        if component >= self.item_size || index >= self.count() {
            return None;
        }
        self.array.get(index * self.item_size + component)
    }

    /// Write component `component` of element `index`.
    pub fn set(&mut self, index: usize, component: usize, value: f64) -> bool {
        if component >= self.item_size || index >= self.count() {
            return false;
        }
        self.array.set(index * self.item_size + component, value)
    }

    pub fn get_x(&self, index: usize) -> Option<f64> {
        self.get(index, 0)
    }

    pub fn get_y(&self, index: usize) -> Option<f64> {
        self.get(index, 1)
    }

    pub fn get_z(&self, index: usize) -> Option<f64> {
        self.get(index, 2)
    }

    pub fn get_w(&self, index: usize) -> Option<f64> {
        self.get(index, 3)
    }

    pub fn set_x(&mut self, index: usize, value: f64) -> bool {
        self.set(index, 0, value)
    }

    pub fn set_y(&mut self, index: usize, value: f64) -> bool {
        self.set(index, 1, value)
    }

    pub fn set_z(&mut self, index: usize, value: f64) -> bool {
        self.set(index, 2, value)
    }

    pub fn set_w(&mut self, index: usize, value: f64) -> bool {
        self.set(index, 3, value)
    }

    /// Component as f32, honoring the normalization flag.
    pub fn get_normalized(&self, index: usize, component: usize) -> Option<f32> {
        if component >= self.item_size || index >= self.count() {
            return None;
        }
        let flat = index * self.item_size + component;
        if self.normalized {
            self.array.get_normalized(flat)
        } else {
            self.array.get(flat).map(|v| v as f32)
        }
    }

    /// Element `index` of a 16-component attribute as a column-major matrix.
    pub fn matrix4(&self, index: usize) -> Option<Mat4> {
        if self.item_size != 16 {
            return None;
        }
        let mut cols = [0.0f32; 16];
        for (c, slot) in cols.iter_mut().enumerate() {
            *slot = self.get_normalized(index, c)?;
        }
        Some(Mat4::from_column_slice(&cols))
    }

    /// All components converted to f32, honoring the normalization flag.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        let len = self.count() * self.item_size;
        if let AttributeArray::F32(v) = &self.array {
            return v[..len].to_vec();
        }
        (0..len)
            .filter_map(|i| {
                if self.normalized {
                    self.array.get_normalized(i)
                } else {
                    self.array.get(i).map(|v| v as f32)
                }
            })
            .collect()
    }

    /// Raw bytes of the component storage.
    pub fn as_bytes(&self) -> &[u8] {
        self.array.as_bytes()
    }
}
