/// A fixed-width byte buffer meant for reading wire values.
///
/// All multi-byte reads use native byte order, matching how an in-process
/// host lays out property data.
///
/// ```
/// let bytes = 7u32.to_ne_bytes();
/// let mut bb = propdispatch_schema::ByteBuffer::new(&bytes);
/// assert_eq!(bb.read_u32(), Ok(7));
/// assert_eq!(bb.read_u32(), Err(()));
/// ```
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    index: usize,
}

macro_rules! read_ne {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty, ()> {
                let bytes = self.read_bytes(std::mem::size_of::<$ty>())?;
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_ne_bytes(raw))
            }
        )*
    };
}

impl<'a> ByteBuffer<'a> {
    /// Create a new ByteBuffer that wraps the provided byte slice. The lifetime
    /// of the returned ByteBuffer must not outlive the lifetime of the byte
    /// slice.
    pub fn new(data: &'a [u8]) -> ByteBuffer<'a> {
        ByteBuffer { data, index: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current index into the underlying byte slice.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Bytes left after the current index.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Try to read a byte starting at the current index.
    pub fn read_byte(&mut self) -> Result<u8, ()> {
        if self.index >= self.data.len() {
            Err(())
        } else {
            let value = self.data[self.index];
            self.index += 1;
            Ok(value)
        }
    }

    /// Try to read `len` bytes starting at the current index.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ()> {
        if self.index + len > self.data.len() {
            Err(())
        } else {
            let value = &self.data[self.index..self.index + len];
            self.index += len;
            Ok(value)
        }
    }

    read_ne! {
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }
}

/// A growable byte buffer meant for writing wire values.
pub struct ByteBufferMut {
    data: Vec<u8>,
}

impl Default for ByteBufferMut {
    fn default() -> Self {
        ByteBufferMut::new()
    }
}

impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Consumes this buffer and returns the underlying backing store.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn write_byte(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn write_bytes(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_ne_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_ne_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_ne_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.write_bytes(&value.to_ne_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_ne_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_ne_bytes());
    }
}

#[test]
fn read_byte() {
    let read = |bytes| ByteBuffer::new(bytes).read_byte();
    assert_eq!(read(&[]), Err(()));
    assert_eq!(read(&[0]), Ok(0));
    assert_eq!(read(&[254]), Ok(254));
}

#[test]
fn read_bytes() {
    let mut bb = ByteBuffer::new(&[1, 2, 3, 4, 5]);
    assert_eq!(bb.read_bytes(3), Ok([1, 2, 3].as_slice()));
    assert_eq!(bb.remaining(), 2);
    assert_eq!(bb.read_bytes(2), Ok([4, 5].as_slice()));
    assert_eq!(bb.read_bytes(1), Err(()));
}

#[test]
fn read_fixed_width() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0xdead_beefu32.to_ne_bytes());
    bytes.extend_from_slice(&(-2.5f64).to_ne_bytes());
    bytes.extend_from_slice(&[1, 2]);

    let mut bb = ByteBuffer::new(&bytes);
    assert_eq!(bb.read_u32(), Ok(0xdead_beef));
    assert_eq!(bb.read_f64(), Ok(-2.5));
    assert_eq!(bb.read_i32(), Err(()));
    assert_eq!(bb.index(), 12);
}

#[test]
fn write_fixed_width() {
    let mut bb = ByteBufferMut::new();
    bb.write_i32(-1);
    bb.write_f32(0.5);
    bb.write_byte(9);
    assert_eq!(bb.len(), 9);

    let data = bb.data();
    assert_eq!(&data[..4], &(-1i32).to_ne_bytes());
    assert_eq!(&data[4..8], &0.5f32.to_ne_bytes());
    assert_eq!(data[8], 9);
}
