// Copyright 2025 the Display List Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::NoUninit;

/// Append-only byte buffer holding the records of one display list.
///
/// Capacity grows by doubling, starting from one page, so appending `n`
/// bytes in total costs amortized O(n). Records never refer to absolute
/// offsets, so moving the storage when it grows is harmless.
#[derive(Clone, Default, Debug)]
pub struct EncodingBuffer {
    bytes: Vec<u8>,
}

impl EncodingBuffer {
    /// Smallest allocation made once anything is appended.
    pub const PAGE_SIZE: usize = 4096;

    /// Creates an empty buffer. No memory is allocated until the first append.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer with room for at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Appends `bytes` to the end of the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        self.grow_for(bytes.len());
        self.bytes.extend_from_slice(bytes);
    }

    /// Appends the in-memory representation of `value`.
    pub fn append_pod<T: NoUninit>(&mut self, value: &T) {
        self.append(bytemuck::bytes_of(value));
    }

    /// Appends zero bytes until the size is a multiple of `align`.
    pub fn pad_to(&mut self, align: usize) {
        let padding = self.bytes.len().next_multiple_of(align) - self.bytes.len();
        self.grow_for(padding);
        self.bytes.resize(self.bytes.len() + padding, 0);
    }

    /// Overwrites previously appended bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the current size.
    pub fn patch(&mut self, offset: usize, bytes: &[u8]) {
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Number of bytes appended so far.
    pub fn current_size(&self) -> usize {
        self.bytes.len()
    }

    /// Number of bytes that can be held before the next reallocation.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Read-only view of the appended bytes.
    pub fn data(&self) -> &[u8] {
        &self.bytes
    }

    /// Hands the storage over to the caller without copying.
    pub fn finalize(self) -> Vec<u8> {
        self.bytes
    }

    fn grow_for(&mut self, additional: usize) {
        let needed = self.bytes.len() + additional;
        let capacity = self.bytes.capacity();
        if needed > capacity {
            let target = needed.max(capacity * 2).max(Self::PAGE_SIZE);
            self.bytes.reserve_exact(target - self.bytes.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EncodingBuffer;

    #[test]
    fn growth_is_geometric() {
        let mut buffer = EncodingBuffer::new();
        buffer.append(&[1; 10]);
        assert_eq!(buffer.current_size(), 10);
        let first = buffer.capacity();
        assert!(first >= EncodingBuffer::PAGE_SIZE);

        let mut buffer = EncodingBuffer::new();
        let mut reallocations = 0;
        let mut capacity = 0;
        for _ in 0..100_000 {
            buffer.append(&[7; 3]);
            if buffer.capacity() != capacity {
                capacity = buffer.capacity();
                reallocations += 1;
            }
        }
        assert_eq!(buffer.current_size(), 300_000);
        // 4 KiB doubling up to ~300 KB.
        assert!(reallocations <= 10, "{reallocations} reallocations");
    }

    #[test]
    fn padding_and_patching() {
        let mut buffer = EncodingBuffer::new();
        buffer.append(&[1, 2, 3]);
        buffer.pad_to(4);
        assert_eq!(buffer.data(), &[1, 2, 3, 0]);
        buffer.pad_to(4);
        assert_eq!(buffer.current_size(), 4);
        buffer.patch(1, &[9, 9]);
        assert_eq!(buffer.finalize(), vec![1, 9, 9, 0]);
    }
}
