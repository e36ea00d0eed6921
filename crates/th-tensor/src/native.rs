use std::cell::UnsafeCell;
use std::fmt;
use std::ptr;

use crate::element::Element;

/// A contiguous, natively addressable host allocation.
///
/// All access goes through `&self`: the buffer has interior mutability, so a
/// caller and any tensors referencing the same allocation through an `Arc`
/// observe each other's writes, the way engine-visible host memory behaves.
/// There is no internal locking; concurrent mutation from multiple threads
/// requires external synchronization.
pub struct NativeBuffer {
    data: Box<[UnsafeCell<u8>]>,
}

// Safety: all access is raw byte copies behind `&self`; callers must
// synchronize concurrent mutation externally.
unsafe impl Send for NativeBuffer {}
unsafe impl Sync for NativeBuffer {}

impl NativeBuffer {
    /// Allocate a zero-filled buffer of `byte_len` bytes.
    pub fn zeroed(byte_len: usize) -> NativeBuffer {
        NativeBuffer {
            data: (0..byte_len).map(|_| UnsafeCell::new(0)).collect(),
        }
    }

    /// Allocate a buffer holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> NativeBuffer {
        NativeBuffer {
            data: bytes.iter().map(|&b| UnsafeCell::new(b)).collect(),
        }
    }

    /// Allocate a buffer holding the little-endian encoding of `values`.
    pub fn from_slice<T: Element>(values: &[T]) -> NativeBuffer {
        let buf = NativeBuffer::zeroed(values.len() * T::WIDTH);
        for (i, &value) in values.iter().enumerate() {
            buf.write(i, value);
        }
        buf
    }

    /// Size of the allocation in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the allocation holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pointer to the start of the allocation, for zero-copy engine handoff.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr().cast()
    }

    /// Mutable pointer to the start of the allocation.
    pub fn as_mut_ptr(&self) -> *mut u8 {
        self.data.as_ptr() as *mut u8
    }

    /// Copy `dst.len()` bytes out of the buffer starting at byte `offset`.
    ///
    /// # Panics
    /// Panics if `offset + dst.len()` exceeds [`byte_len`](Self::byte_len).
    pub fn copy_to(&self, offset: usize, dst: &mut [u8]) {
        assert!(
            offset + dst.len() <= self.data.len(),
            "read of {} bytes at offset {} out of bounds for buffer of {} bytes",
            dst.len(),
            offset,
            self.data.len()
        );
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr().add(offset), dst.as_mut_ptr(), dst.len());
        }
    }

    /// Copy `src` into the buffer starting at byte `offset`.
    ///
    /// # Panics
    /// Panics if `offset + src.len()` exceeds [`byte_len`](Self::byte_len).
    pub fn copy_from(&self, offset: usize, src: &[u8]) {
        assert!(
            offset + src.len() <= self.data.len(),
            "write of {} bytes at offset {} out of bounds for buffer of {} bytes",
            src.len(),
            offset,
            self.data.len()
        );
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.as_mut_ptr().add(offset), src.len());
        }
    }

    /// Read the element at `index`, counted in units of `T::WIDTH` bytes.
    ///
    /// # Panics
    /// Panics if the element lies past the end of the buffer.
    pub fn read<T: Element>(&self, index: usize) -> T {
        let mut raw = [0u8; 8];
        let raw = &mut raw[..T::WIDTH];
        self.copy_to(index * T::WIDTH, raw);
        T::read_le(raw)
    }

    /// Write the element at `index`, counted in units of `T::WIDTH` bytes.
    ///
    /// # Panics
    /// Panics if the element lies past the end of the buffer.
    pub fn write<T: Element>(&self, index: usize, value: T) {
        let mut raw = [0u8; 8];
        let raw = &mut raw[..T::WIDTH];
        value.write_le(raw);
        self.copy_from(index * T::WIDTH, raw);
    }

    /// Copy the whole buffer out as typed values.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        (0..self.data.len() / T::WIDTH).map(|i| self.read(i)).collect()
    }

    /// Copy the whole buffer out as raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.data.len()];
        self.copy_to(0, &mut out);
        out
    }
}

impl fmt::Debug for NativeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBuffer")
            .field("byte_len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_zeroed() {
        let buf = NativeBuffer::zeroed(8);
        assert_eq!(buf.byte_len(), 8);
        assert!(!buf.is_empty());
        assert_eq!(buf.to_bytes(), vec![0; 8]);
    }

    #[test]
    fn test_from_bytes_round_trip() {
        let buf = NativeBuffer::from_bytes(&[1, 2, 3, 4]);
        assert_eq!(buf.to_bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_typed_read_write() {
        let buf = NativeBuffer::from_slice(&[0.0f32, 1.0, 2.0]);
        assert_eq!(buf.byte_len(), 12);
        assert_eq!(buf.read::<f32>(1), 1.0);

        buf.write(1, 42.0f32);
        assert_eq!(buf.read::<f32>(1), 42.0);
        assert_eq!(buf.to_vec::<f32>(), vec![0.0, 42.0, 2.0]);
    }

    #[test]
    fn test_shared_writes_are_visible() {
        let shared = Arc::new(NativeBuffer::from_slice(&[1i32, 2, 3]));
        let other = Arc::clone(&shared);

        shared.write(0, 10i32);
        assert_eq!(other.read::<i32>(0), 10);

        other.write(2, 30i32);
        assert_eq!(shared.to_vec::<i32>(), vec![10, 2, 30]);
    }

    #[test]
    fn test_empty_buffer() {
        let buf = NativeBuffer::zeroed(0);
        assert!(buf.is_empty());
        assert!(buf.to_vec::<f32>().is_empty());
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_read_panics() {
        let buf = NativeBuffer::zeroed(4);
        let _ = buf.read::<f64>(0);
    }
}
