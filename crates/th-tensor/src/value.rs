use crate::element::ElementType;
use crate::error::{Result, TensorError};

/// A dynamically typed tensor value: a scalar or an arbitrarily nested array.
///
/// This is both the construction input for
/// [`TensorBuffer::from_value`](crate::TensorBuffer::from_value) and the
/// materialized output of [`TensorBuffer::value`](crate::TensorBuffer::value).
/// 16-bit float tensors materialize as `Float32` leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    Bool(bool),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    String(String),
    Array(Vec<TensorValue>),
}

impl TensorValue {
    /// Element type of a scalar leaf, or `None` for arrays.
    pub fn scalar_type(&self) -> Option<ElementType> {
        match self {
            TensorValue::Bool(_) => Some(ElementType::Bool),
            TensorValue::Int8(_) => Some(ElementType::Int8),
            TensorValue::Uint8(_) => Some(ElementType::Uint8),
            TensorValue::Int16(_) => Some(ElementType::Int16),
            TensorValue::Uint16(_) => Some(ElementType::Uint16),
            TensorValue::Int32(_) => Some(ElementType::Int32),
            TensorValue::Int64(_) => Some(ElementType::Int64),
            TensorValue::Float32(_) => Some(ElementType::Float32),
            TensorValue::Float64(_) => Some(ElementType::Float64),
            TensorValue::String(_) => Some(ElementType::String),
            TensorValue::Array(_) => None,
        }
    }

    /// Returns true for the `Array` variant.
    pub fn is_array(&self) -> bool {
        matches!(self, TensorValue::Array(_))
    }
}

macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for TensorValue {
            fn from(value: $ty) -> TensorValue {
                TensorValue::$variant(value)
            }
        }
    };
}

impl_from_scalar!(bool, Bool);
impl_from_scalar!(i8, Int8);
impl_from_scalar!(u8, Uint8);
impl_from_scalar!(i16, Int16);
impl_from_scalar!(u16, Uint16);
impl_from_scalar!(i32, Int32);
impl_from_scalar!(i64, Int64);
impl_from_scalar!(f32, Float32);
impl_from_scalar!(f64, Float64);
impl_from_scalar!(String, String);

impl From<&str> for TensorValue {
    fn from(value: &str) -> TensorValue {
        TensorValue::String(value.to_string())
    }
}

impl<T: Into<TensorValue>> From<Vec<T>> for TensorValue {
    fn from(values: Vec<T>) -> TensorValue {
        TensorValue::Array(values.into_iter().map(Into::into).collect())
    }
}

/// Infer the per-level lengths of a nested value by walking the first child
/// at each level. A scalar infers the empty (rank-0) shape.
pub(crate) fn infer_dims(value: &TensorValue) -> Vec<i64> {
    let mut dims = Vec::new();
    let mut cursor = value;
    while let TensorValue::Array(items) = cursor {
        dims.push(items.len() as i64);
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }
    dims
}

/// Validate that `value` is rectangular with the given per-level lengths and
/// holds leaves of a single element type; returns that type.
pub(crate) fn validate(value: &TensorValue, dims: &[i64]) -> Result<ElementType> {
    let mut leaf = None;
    validate_level(value, dims, 0, &mut leaf)?;
    leaf.ok_or_else(|| {
        TensorError::CannotConvert("an empty nested array with no element type".to_string())
    })
}

fn validate_level(
    value: &TensorValue,
    dims: &[i64],
    depth: usize,
    leaf: &mut Option<ElementType>,
) -> Result<()> {
    if depth == dims.len() {
        let ty = value.scalar_type().ok_or_else(|| {
            TensorError::CannotConvert(format!("a nested array deeper than rank {}", dims.len()))
        })?;
        match leaf {
            Some(existing) if *existing != ty => {
                return Err(TensorError::CannotConvert(format!(
                    "a nested array of mixed element types ({existing} and {ty})"
                )));
            }
            Some(_) => {}
            None => *leaf = Some(ty),
        }
        return Ok(());
    }
    match value {
        TensorValue::Array(items) => {
            let expected = dims[depth] as usize;
            if items.len() != expected {
                return Err(TensorError::RaggedArray {
                    depth,
                    expected,
                    got: items.len(),
                });
            }
            for item in items {
                validate_level(item, dims, depth + 1, leaf)?;
            }
            Ok(())
        }
        _ => Err(TensorError::CannotConvert(format!(
            "a scalar where a rank {} array was expected",
            dims.len() - depth
        ))),
    }
}

/// Append every leaf of `value` to `out` in row-major order.
pub(crate) fn collect_leaves<'a>(value: &'a TensorValue, out: &mut Vec<&'a TensorValue>) {
    match value {
        TensorValue::Array(items) => {
            for item in items {
                collect_leaves(item, out);
            }
        }
        leaf => out.push(leaf),
    }
}

/// Rebuild a nested value from row-major `flat` scalars and per-level
/// lengths. A rank-0 shape yields the single scalar itself.
pub(crate) fn nest(dims: &[i64], flat: &[TensorValue]) -> TensorValue {
    match dims.split_first() {
        None => flat[0].clone(),
        Some((&d, rest)) => {
            let stride: usize = rest.iter().map(|&r| r as usize).product();
            let mut items = Vec::with_capacity(d as usize);
            for i in 0..d as usize {
                items.push(nest(rest, &flat[i * stride..(i + 1) * stride]));
            }
            TensorValue::Array(items)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_impls() {
        assert_eq!(TensorValue::from(1.5f32), TensorValue::Float32(1.5));
        assert_eq!(TensorValue::from("hi"), TensorValue::String("hi".to_string()));
        assert_eq!(
            TensorValue::from(vec![1i32, 2]),
            TensorValue::Array(vec![TensorValue::Int32(1), TensorValue::Int32(2)])
        );
        assert_eq!(
            TensorValue::from(vec![vec![1i32], vec![2]]),
            TensorValue::Array(vec![
                TensorValue::Array(vec![TensorValue::Int32(1)]),
                TensorValue::Array(vec![TensorValue::Int32(2)]),
            ])
        );
    }

    #[test]
    fn test_infer_dims() {
        assert_eq!(infer_dims(&TensorValue::Int32(1)), Vec::<i64>::new());
        assert_eq!(infer_dims(&TensorValue::from(vec![1i32, 2, 3])), vec![3]);
        assert_eq!(
            infer_dims(&TensorValue::from(vec![vec![1i32, 2, 3], vec![4, 5, 6]])),
            vec![2, 3]
        );
        assert_eq!(infer_dims(&TensorValue::Array(vec![])), vec![0]);
    }

    #[test]
    fn test_validate_rectangular() {
        let value = TensorValue::from(vec![vec![1i32, 2], vec![3, 4]]);
        let dims = infer_dims(&value);
        assert_eq!(validate(&value, &dims).unwrap(), ElementType::Int32);
    }

    #[test]
    fn test_validate_ragged() {
        let value = TensorValue::from(vec![vec![1i32, 2], vec![3]]);
        let dims = infer_dims(&value);
        let err = validate(&value, &dims).unwrap_err();
        assert!(err.is_shape_error());
        assert!(err.to_string().contains("ragged"));
    }

    #[test]
    fn test_validate_mixed_types() {
        let value = TensorValue::Array(vec![TensorValue::Int32(1), TensorValue::Float32(2.0)]);
        let dims = infer_dims(&value);
        let err = validate(&value, &dims).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("cannot convert"));
    }

    #[test]
    fn test_validate_mixed_depths() {
        let value = TensorValue::Array(vec![
            TensorValue::from(vec![1i32, 2]),
            TensorValue::Int32(3),
        ]);
        let dims = infer_dims(&value);
        let err = validate(&value, &dims).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("cannot convert"));
    }

    #[test]
    fn test_nest_round_trip() {
        let value = TensorValue::from(vec![vec![1i32, 2, 3], vec![4, 5, 6]]);
        let dims = infer_dims(&value);
        let mut leaves = Vec::new();
        collect_leaves(&value, &mut leaves);
        let flat: Vec<TensorValue> = leaves.into_iter().cloned().collect();
        assert_eq!(nest(&dims, &flat), value);
    }

    #[test]
    fn test_nest_zero_dims() {
        let rebuilt = nest(&[4, 0], &[]);
        match rebuilt {
            TensorValue::Array(rows) => {
                assert_eq!(rows.len(), 4);
                for row in rows {
                    assert_eq!(row, TensorValue::Array(vec![]));
                }
            }
            other => panic!("expected an array, got {other:?}"),
        }
        assert_eq!(nest(&[0, 4], &[]), TensorValue::Array(vec![]));
    }
}
