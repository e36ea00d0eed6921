use std::sync::Arc;

use tracing::warn;

use th_fp16::{widen_buffer, HalfEncoding};

use crate::element::{Element, ElementType};
use crate::error::{Result, TensorError};
use crate::native::NativeBuffer;
use crate::shape::Shape;
use crate::value::{self, TensorValue};

/// A shaped, typed buffer of host memory with explicit ownership tracking.
///
/// A `TensorBuffer` either owns a freshly allocated block, released when the
/// tensor is closed or dropped, or references a caller-supplied
/// [`NativeBuffer`] that it never releases. String tensors hold their values
/// as managed text rather than a linear numeric buffer.
///
/// The engine handoff descriptor is the triple ([`buffer_ref`], [`shape`],
/// [`element_type`]); result tensors coming back from an engine are wrapped
/// with [`from_native`].
///
/// [`buffer_ref`]: Self::buffer_ref
/// [`shape`]: Self::shape
/// [`element_type`]: Self::element_type
/// [`from_native`]: Self::from_native
#[derive(Debug)]
pub struct TensorBuffer {
    storage: Storage,
    shape: Shape,
    element_type: ElementType,
    closed: bool,
}

/// Storage ownership tag. A tensor is never partially owned.
#[derive(Debug)]
enum Storage {
    /// Exclusively owned allocation, released on close.
    Owned(NativeBuffer),
    /// Caller-supplied allocation, never released here.
    Referenced(Arc<NativeBuffer>),
    /// String tensors store managed text.
    Strings(Vec<String>),
}

impl TensorBuffer {
    /// Wrap a single scalar value in a rank-0 owned tensor.
    ///
    /// # Errors
    /// Returns a type error if `value` is an array.
    pub fn from_scalar(value: impl Into<TensorValue>) -> Result<TensorBuffer> {
        let value = value.into();
        if value.is_array() {
            return Err(TensorError::CannotConvert(
                "an array to a scalar tensor".to_string(),
            ));
        }
        TensorBuffer::from_value(value)
    }

    /// Build an owned tensor from a scalar or arbitrarily nested array value.
    ///
    /// The value must be rectangular (every sibling sub-array at the same
    /// depth has the same length) and hold leaves of a single element type.
    /// The shape is the sequence of per-level lengths; the data is flattened
    /// row-major into a freshly allocated buffer. All validation happens
    /// before any storage is allocated.
    ///
    /// # Errors
    /// Returns a shape error for ragged input and a type error for mixed,
    /// missing, or depth-inconsistent leaf types.
    pub fn from_value(value: impl Into<TensorValue>) -> Result<TensorBuffer> {
        let value = value.into();
        let dims = value::infer_dims(&value);
        let shape = Shape::new(&dims)?;
        let element_type = value::validate(&value, &dims)?;

        let mut leaves = Vec::new();
        value::collect_leaves(&value, &mut leaves);

        let storage = match element_type {
            ElementType::String => Storage::Strings(
                leaves
                    .iter()
                    .map(|leaf| match leaf {
                        TensorValue::String(s) => s.clone(),
                        _ => unreachable!("validated string tensor holds only string leaves"),
                    })
                    .collect(),
            ),
            _ => Storage::Owned(flatten_numeric(&leaves, element_type)),
        };
        Ok(TensorBuffer {
            storage,
            shape,
            element_type,
            closed: false,
        })
    }

    /// Build an owned tensor by copying a typed slice.
    ///
    /// # Errors
    /// Returns a shape error if the element count implied by `dims` does not
    /// equal `values.len()` exactly.
    pub fn from_slice<T: Element>(values: &[T], dims: &[i64]) -> Result<TensorBuffer> {
        let shape = Shape::new(dims)?;
        if shape.numel() != values.len() {
            return Err(TensorError::ShapeMismatch {
                dims: dims.to_vec(),
                expected: shape.numel(),
                got: values.len(),
            });
        }
        Ok(TensorBuffer {
            storage: Storage::Owned(NativeBuffer::from_slice(values)),
            shape,
            element_type: T::ELEMENT_TYPE,
            closed: false,
        })
    }

    /// Build an owned tensor by copying raw little-endian bytes tagged with
    /// an explicit element type.
    ///
    /// # Errors
    /// Returns a type error for the string element type and a shape error if
    /// `bytes.len()` does not equal the implied element count times the
    /// element width exactly.
    pub fn from_bytes(
        bytes: &[u8],
        dims: &[i64],
        element_type: ElementType,
    ) -> Result<TensorBuffer> {
        let shape = Shape::new(dims)?;
        let width = fixed_width_of(element_type)?;
        if shape.numel() * width != bytes.len() {
            return Err(TensorError::ShapeMismatch {
                dims: dims.to_vec(),
                expected: shape.numel(),
                got: bytes.len() / width,
            });
        }
        Ok(TensorBuffer {
            storage: Storage::Owned(NativeBuffer::from_bytes(bytes)),
            shape,
            element_type,
            closed: false,
        })
    }

    /// Wrap caller-owned native memory without copying.
    ///
    /// The tensor references the allocation: it never releases it, and writes
    /// through the caller's handle, the tensor's [`buffer_ref`](Self::buffer_ref)
    /// view, or the engine are all mutually visible. The allocation must
    /// outlive the tensor's last use.
    ///
    /// # Errors
    /// Returns a type error for the string element type and a shape error if
    /// the buffer's byte length does not match the implied element count
    /// exactly.
    pub fn from_native(
        buffer: Arc<NativeBuffer>,
        dims: &[i64],
        element_type: ElementType,
    ) -> Result<TensorBuffer> {
        let shape = Shape::new(dims)?;
        let width = fixed_width_of(element_type)?;
        if shape.numel() * width != buffer.byte_len() {
            return Err(TensorError::ShapeMismatch {
                dims: dims.to_vec(),
                expected: shape.numel(),
                got: buffer.byte_len() / width,
            });
        }
        Ok(TensorBuffer {
            storage: Storage::Referenced(buffer),
            shape,
            element_type,
            closed: false,
        })
    }

    /// The tensor's element type.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// The tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    /// Storage size in bytes (0 for string tensors).
    pub fn byte_len(&self) -> usize {
        self.element_type
            .fixed_width()
            .map_or(0, |w| w * self.shape.numel())
    }

    /// True if the tensor owns its storage. Always true for tensors built
    /// from values, slices, or bytes; false for [`from_native`](Self::from_native)
    /// tensors.
    pub fn owns_buffer(&self) -> bool {
        !matches!(self.storage, Storage::Referenced(_))
    }

    /// True once the tensor has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The live view over the tensor's storage, owned or referenced.
    ///
    /// Writes through the returned buffer are visible to every subsequent
    /// [`value`](Self::value) read, regardless of ownership. Returns `None`
    /// for string tensors, which have no linear numeric buffer.
    ///
    /// # Errors
    /// Fails once the tensor is closed.
    pub fn buffer_ref(&self) -> Result<Option<&NativeBuffer>> {
        self.ensure_open()?;
        Ok(self.numeric_buffer())
    }

    /// Materialize the tensor as a nested value (or a scalar for rank 0).
    ///
    /// Reads the live buffer at call time and returns an independent copy:
    /// later writes to the tensor are seen by later `value` calls but never
    /// alter a previously returned value. 16-bit float elements widen to
    /// `Float32` leaves.
    ///
    /// # Errors
    /// Fails once the tensor is closed.
    pub fn value(&self) -> Result<TensorValue> {
        self.ensure_open()?;
        let flat: Vec<TensorValue> = match &self.storage {
            Storage::Strings(values) => {
                values.iter().cloned().map(TensorValue::String).collect()
            }
            Storage::Owned(buf) => materialize_numeric(buf, self.element_type),
            Storage::Referenced(buf) => materialize_numeric(buf, self.element_type),
        };
        Ok(value::nest(self.shape.dims(), &flat))
    }

    /// Read the tensor out as 32-bit floats.
    ///
    /// For `Float16`/`Bfloat16` tensors this is a freshly widened copy; for
    /// `Float32` tensors a plain copy. Either way the result is a read-only
    /// snapshot: writes to it never reach the tensor, and it does not change
    /// when the tensor is later mutated.
    ///
    /// # Errors
    /// Fails once the tensor is closed, and for non-float element types.
    pub fn float_vec(&self) -> Result<Vec<f32>> {
        self.ensure_open()?;
        let buf = match self.numeric_buffer() {
            Some(buf) if self.element_type == ElementType::Float32 => return Ok(buf.to_vec()),
            Some(buf) if self.element_type.is_half_float() => buf,
            _ => {
                return Err(TensorError::TypeMismatch {
                    expected: "a floating point element type".to_string(),
                    got: self.element_type.to_string(),
                })
            }
        };
        let encoding = match self.element_type {
            ElementType::Float16 => HalfEncoding::Binary16,
            _ => HalfEncoding::Bfloat16,
        };
        Ok(widen_buffer(&buf.to_vec::<u16>(), encoding))
    }

    /// Read the tensor out as typed values.
    ///
    /// `T` must match the tensor's element type exactly, except that `u16`
    /// may read the raw bit patterns of `Float16`/`Bfloat16` tensors.
    ///
    /// # Errors
    /// Fails once the tensor is closed, and on element type mismatch.
    pub fn typed_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.ensure_open()?;
        let matches_type = T::ELEMENT_TYPE == self.element_type
            || (T::ELEMENT_TYPE == ElementType::Uint16 && self.element_type.is_half_float());
        if !matches_type {
            return Err(TensorError::TypeMismatch {
                expected: self.element_type.to_string(),
                got: T::ELEMENT_TYPE.to_string(),
            });
        }
        match self.numeric_buffer() {
            Some(buf) => Ok(buf.to_vec()),
            None => unreachable!("string tensors never pass the element type check"),
        }
    }

    /// Release owned storage and mark the tensor closed.
    ///
    /// Referenced storage is detached, never released. A second close is a
    /// non-fatal no-op that logs a warning. `Drop` releases storage on paths
    /// that never reach an explicit close, so close is for early release.
    pub fn close(&mut self) {
        if self.closed {
            warn!("close called on an already closed tensor");
            return;
        }
        self.closed = true;
        self.storage = Storage::Owned(NativeBuffer::zeroed(0));
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(TensorError::Closed)
        } else {
            Ok(())
        }
    }

    fn numeric_buffer(&self) -> Option<&NativeBuffer> {
        match &self.storage {
            Storage::Owned(buf) => Some(buf),
            Storage::Referenced(buf) => Some(buf),
            Storage::Strings(_) => None,
        }
    }
}

fn fixed_width_of(element_type: ElementType) -> Result<usize> {
    element_type.fixed_width().ok_or_else(|| TensorError::TypeMismatch {
        expected: "a fixed-width numeric element type".to_string(),
        got: element_type.to_string(),
    })
}

/// Flatten validated numeric leaves row-major into a fresh allocation.
fn flatten_numeric(leaves: &[&TensorValue], element_type: ElementType) -> NativeBuffer {
    let width = element_type
        .fixed_width()
        .expect("numeric element types have a fixed width");
    let buf = NativeBuffer::zeroed(leaves.len() * width);
    for (i, leaf) in leaves.iter().enumerate() {
        match leaf {
            TensorValue::Bool(v) => buf.write(i, *v),
            TensorValue::Int8(v) => buf.write(i, *v),
            TensorValue::Uint8(v) => buf.write(i, *v),
            TensorValue::Int16(v) => buf.write(i, *v),
            TensorValue::Uint16(v) => buf.write(i, *v),
            TensorValue::Int32(v) => buf.write(i, *v),
            TensorValue::Int64(v) => buf.write(i, *v),
            TensorValue::Float32(v) => buf.write(i, *v),
            TensorValue::Float64(v) => buf.write(i, *v),
            TensorValue::String(_) | TensorValue::Array(_) => {
                unreachable!("validated numeric tensor holds only numeric leaves")
            }
        }
    }
    buf
}

/// Read a numeric buffer out as flat scalar values, widening 16-bit floats.
fn materialize_numeric(buf: &NativeBuffer, element_type: ElementType) -> Vec<TensorValue> {
    match element_type {
        ElementType::Bool => buf.to_vec::<bool>().into_iter().map(TensorValue::Bool).collect(),
        ElementType::Int8 => buf.to_vec::<i8>().into_iter().map(TensorValue::Int8).collect(),
        ElementType::Uint8 => buf.to_vec::<u8>().into_iter().map(TensorValue::Uint8).collect(),
        ElementType::Int16 => buf.to_vec::<i16>().into_iter().map(TensorValue::Int16).collect(),
        ElementType::Uint16 => buf.to_vec::<u16>().into_iter().map(TensorValue::Uint16).collect(),
        ElementType::Int32 => buf.to_vec::<i32>().into_iter().map(TensorValue::Int32).collect(),
        ElementType::Int64 => buf.to_vec::<i64>().into_iter().map(TensorValue::Int64).collect(),
        ElementType::Float32 => buf.to_vec::<f32>().into_iter().map(TensorValue::Float32).collect(),
        ElementType::Float64 => buf.to_vec::<f64>().into_iter().map(TensorValue::Float64).collect(),
        ElementType::Float16 => widen_buffer(&buf.to_vec::<u16>(), HalfEncoding::Binary16)
            .into_iter()
            .map(TensorValue::Float32)
            .collect(),
        ElementType::Bfloat16 => widen_buffer(&buf.to_vec::<u16>(), HalfEncoding::Bfloat16)
            .into_iter()
            .map(TensorValue::Float32)
            .collect(),
        ElementType::String => unreachable!("string tensors use managed storage"),
    }
}
