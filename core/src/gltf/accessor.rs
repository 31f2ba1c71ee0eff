//! Accessor decoding: raw buffer-view bytes to typed attributes.
//!
//! Component bytes are reinterpreted in place order, which matches glTF's
//! little-endian storage on every target this crate builds for.

use std::ops::Range;
use std::sync::Arc;

use bytemuck::Pod;

use crate::mesh::{AttributeArray, BufferAttribute};

use super::document::{AccessorDef, SparseDef};
use super::error::ResolveError;

/// Numeric type of one accessor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    U32,
    F32,
}

impl ComponentType {
    /// Map a glTF `componentType` code.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            5120 => Self::I8,
            5121 => Self::U8,
            5122 => Self::I16,
            5123 => Self::U16,
            5125 => Self::U32,
            5126 => Self::F32,
            _ => return None,
        })
    }

    pub fn code(&self) -> u32 {
        match self {
            Self::I8 => 5120,
            Self::U8 => 5121,
            Self::I16 => 5122,
            Self::U16 => 5123,
            Self::U32 => 5125,
            Self::F32 => 5126,
        }
    }

    /// Size of one component in bytes.
    pub fn byte_width(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }

    fn is_unsigned_int(&self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32)
    }
}

/// Element shape of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorShape {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorShape {
    /// Map a glTF accessor `type` string.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "SCALAR" => Self::Scalar,
            "VEC2" => Self::Vec2,
            "VEC3" => Self::Vec3,
            "VEC4" => Self::Vec4,
            "MAT2" => Self::Mat2,
            "MAT3" => Self::Mat3,
            "MAT4" => Self::Mat4,
            _ => return None,
        })
    }

    /// Components per element.
    pub fn item_size(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// A resolved buffer view: a bounded window into a shared buffer.
#[derive(Debug, Clone)]
pub struct BufferViewData {
    buffer: Arc<[u8]>,
    range: Range<usize>,
    /// Declared byte stride.
    pub stride: Option<usize>,
}

impl BufferViewData {
    /// Window `offset..offset + length` of `buffer`.
    pub fn new(
        buffer: Arc<[u8]>,
        offset: usize,
        length: usize,
        stride: Option<usize>,
    ) -> Result<Self, ResolveError> {
        let end = offset.checked_add(length).unwrap_or(usize::MAX);
        if end > buffer.len() {
            return Err(ResolveError::OutOfBounds {
                what: "buffer view".into(),
                offset,
                end,
                len: buffer.len(),
            });
        }
        Ok(Self {
            buffer,
            range: offset..end,
            stride,
        })
    }

    /// Bytes inside the window.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer[self.range.clone()]
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The whole underlying buffer.
    pub fn buffer(&self) -> &Arc<[u8]> {
        &self.buffer
    }
}

/// Resolved inputs of a sparse block.
#[derive(Debug, Clone, Copy)]
pub struct SparseViews<'a> {
    pub def: &'a SparseDef,
    pub indices: &'a BufferViewData,
    pub values: &'a BufferViewData,
}

fn cast_vec<T: Pod>(bytes: &[u8]) -> Vec<T> {
    match bytemuck::try_cast_slice::<u8, T>(bytes) {
        Ok(slice) => slice.to_vec(),
        // misaligned offset inside the buffer
        Err(_) => bytemuck::allocation::pod_collect_to_vec(bytes),
    }
}

fn read_array(ty: ComponentType, bytes: &[u8]) -> AttributeArray {
    match ty {
        ComponentType::I8 => AttributeArray::I8(cast_vec(bytes)),
        ComponentType::U8 => AttributeArray::U8(bytes.to_vec()),
        ComponentType::I16 => AttributeArray::I16(cast_vec(bytes)),
        ComponentType::U16 => AttributeArray::U16(cast_vec(bytes)),
        ComponentType::U32 => AttributeArray::U32(cast_vec(bytes)),
        ComponentType::F32 => AttributeArray::F32(cast_vec(bytes)),
    }
}

/// Zero-filled array for a sparse accessor without base view. The
/// allocation is fallible since `len` comes straight from the document.
fn zeroed_array(ty: ComponentType, len: usize) -> Option<AttributeArray> {
    fn zeros<T: Clone + Default>(len: usize) -> Option<Vec<T>> {
        let mut v = Vec::new();
        v.try_reserve_exact(len).ok()?;
        v.resize(len, T::default());
        Some(v)
    }
    Some(match ty {
        ComponentType::I8 => AttributeArray::I8(zeros(len)?),
        ComponentType::U8 => AttributeArray::U8(zeros(len)?),
        ComponentType::I16 => AttributeArray::I16(zeros(len)?),
        ComponentType::U16 => AttributeArray::U16(zeros(len)?),
        ComponentType::U32 => AttributeArray::U32(zeros(len)?),
        ComponentType::F32 => AttributeArray::F32(zeros(len)?),
    })
}

/// `count * element_size`, or [`ResolveError::TooLarge`] on overflow.
fn byte_len(
    what: impl FnOnce() -> String,
    count: usize,
    element_size: usize,
) -> Result<usize, ResolveError> {
    count
        .checked_mul(element_size)
        .ok_or_else(|| ResolveError::TooLarge {
            what: what(),
            count,
            element_size,
        })
}

fn slice_at<'a>(
    what: impl FnOnce() -> String,
    bytes: &'a [u8],
    offset: usize,
    len: usize,
) -> Result<&'a [u8], ResolveError> {
    let end = offset.checked_add(len).unwrap_or(usize::MAX);
    bytes.get(offset..end).ok_or_else(|| ResolveError::OutOfBounds {
        what: what(),
        offset,
        end,
        len: bytes.len(),
    })
}

/// Decode accessor `index`.
///
/// Returns `Ok(None)` for an accessor with neither buffer view nor sparse
/// block. `sparse` must carry the resolved views whenever `def.sparse` is set.
pub fn decode(
    index: usize,
    def: &AccessorDef,
    view: Option<&BufferViewData>,
    sparse: Option<SparseViews<'_>>,
) -> Result<Option<BufferAttribute>, ResolveError> {
    if def.buffer_view.is_none() && def.sparse.is_none() {
        log::trace!("Accessor {index} has no data");
        return Ok(None);
    }

    let ty = ComponentType::from_code(def.component_type).ok_or(
        ResolveError::InvalidComponentType {
            accessor: index,
            code: def.component_type,
        },
    )?;
    let shape = AccessorShape::from_name(&def.ty).ok_or_else(|| {
        ResolveError::InvalidAccessorType {
            accessor: index,
            name: def.ty.clone(),
        }
    })?;

    let item_size = shape.item_size();
    let element_size = ty.byte_width() * item_size;
    let too_large = || ResolveError::TooLarge {
        what: format!("accessor {index}"),
        count: def.count,
        element_size,
    };

    let mut array = match view {
        Some(view) => {
            if let Some(stride) = view.stride
                && stride != element_size
            {
                return Err(ResolveError::UnsupportedInterleaved {
                    accessor: index,
                    stride,
                    element_size,
                });
            }
            let bytes = slice_at(
                || format!("accessor {index}"),
                view.bytes(),
                def.byte_offset,
                def.count.checked_mul(element_size).ok_or_else(too_large)?,
            )?;
            read_array(ty, bytes)
        }
        None => {
            let len = def.count.checked_mul(item_size).ok_or_else(too_large)?;
            zeroed_array(ty, len).ok_or_else(too_large)?
        }
    };

    if let Some(sparse) = sparse {
        apply_sparse(index, ty, item_size, def.count, &mut array, sparse)?;
    }

    Ok(Some(BufferAttribute::new(array, item_size, def.normalized)))
}

fn apply_sparse(
    index: usize,
    ty: ComponentType,
    item_size: usize,
    count: usize,
    base: &mut AttributeArray,
    sparse: SparseViews<'_>,
) -> Result<(), ResolveError> {
    if item_size > 4 {
        return Err(ResolveError::UnsupportedSparseShape {
            accessor: index,
            components: item_size,
        });
    }
    let index_code = sparse.def.indices.component_type;
    let index_ty = ComponentType::from_code(index_code)
        .filter(ComponentType::is_unsigned_int)
        .ok_or(ResolveError::InvalidComponentType {
            accessor: index,
            code: index_code,
        })?;

    let patches = sparse.def.count;
    let index_bytes = slice_at(
        || format!("accessor {index} sparse indices"),
        sparse.indices.bytes(),
        sparse.def.indices.byte_offset,
        byte_len(
            || format!("accessor {index} sparse indices"),
            patches,
            index_ty.byte_width(),
        )?,
    )?;
    let value_bytes = slice_at(
        || format!("accessor {index} sparse values"),
        sparse.values.bytes(),
        sparse.def.values.byte_offset,
        byte_len(
            || format!("accessor {index} sparse values"),
            patches,
            ty.byte_width() * item_size,
        )?,
    )?;
    let targets = read_array(index_ty, index_bytes);
    let values = read_array(ty, value_bytes);

    for i in 0..patches {
        let target = targets.get(i).unwrap_or_default() as usize;
        if target >= count {
            return Err(ResolveError::OutOfBounds {
                what: format!("accessor {index} sparse index {i}"),
                offset: target,
                end: target + 1,
                len: count,
            });
        }
        // x always, then y/z/w as far as the shape reaches
        for component in 0..item_size {
            if let Some(v) = values.get(i * item_size + component) {
                base.set(target * item_size + component, v);
            }
        }
    }
    Ok(())
}
