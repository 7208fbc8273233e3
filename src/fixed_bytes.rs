//! Contains the trait keys and values must implement to be written by the binary codec.
//!
//! Every entry in a serialized table is the key bytes immediately followed by the value bytes with
//! no padding, so both must encode to a fixed number of bytes.  All numbers are little endian.

use crate::error::decode::DecodeError;
use std::fmt;
use std::str::Utf8Error;

/// Trait for types with a fixed width byte encoding.
pub trait FixedBytes: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Write the encoding into buffer, buffer is exactly SIZE bytes long.
    fn write_bytes(&self, buffer: &mut [u8]);

    /// Decode from buffer, buffer is exactly SIZE bytes long.
    fn read_bytes(buffer: &[u8]) -> Result<Self, DecodeError>;
}

macro_rules! le_bytes {
    ($($t:ty),*) => {
        $(
            impl FixedBytes for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn write_bytes(&self, buffer: &mut [u8]) {
                    buffer.copy_from_slice(&self.to_le_bytes());
                }

                fn read_bytes(buffer: &[u8]) -> Result<Self, DecodeError> {
                    let mut buf = [0_u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(buffer);
                    Ok(Self::from_le_bytes(buf))
                }
            }
        )*
    };
}

le_bytes!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

impl FixedBytes for bool {
    const SIZE: usize = 1;

    fn write_bytes(&self, buffer: &mut [u8]) {
        buffer[0] = *self as u8;
    }

    fn read_bytes(buffer: &[u8]) -> Result<Self, DecodeError> {
        match buffer[0] {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(DecodeError::new(format!("invalid bool byte {}", b), None)),
        }
    }
}

impl FixedBytes for char {
    const SIZE: usize = 4;

    fn write_bytes(&self, buffer: &mut [u8]) {
        buffer.copy_from_slice(&(*self as u32).to_le_bytes());
    }

    fn read_bytes(buffer: &[u8]) -> Result<Self, DecodeError> {
        let code = u32::read_bytes(buffer)?;
        char::from_u32(code)
            .ok_or_else(|| DecodeError::new(format!("invalid char code {:#x}", code), None))
    }
}

impl<T: FixedBytes, const N: usize> FixedBytes for [T; N] {
    const SIZE: usize = T::SIZE * N;

    // Indexed slices rather than chunks, T::SIZE may be 0.
    fn write_bytes(&self, buffer: &mut [u8]) {
        for (i, item) in self.iter().enumerate() {
            item.write_bytes(&mut buffer[i * T::SIZE..(i + 1) * T::SIZE]);
        }
    }

    fn read_bytes(buffer: &[u8]) -> Result<Self, DecodeError> {
        let items = (0..N)
            .map(|i| T::read_bytes(&buffer[i * T::SIZE..(i + 1) * T::SIZE]))
            .collect::<Result<Vec<T>, DecodeError>>()?;
        items
            .try_into()
            .map_err(|_| DecodeError::new(format!("expected {} array items", N), None))
    }
}

/// Fixed width text, stored NUL padded in N bytes.
/// Use this for string keys or values that need to go through the binary codec.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedStr<N> {
    /// The text bytes up to (not including) the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        let len = self.bytes.iter().position(|b| *b == 0).unwrap_or(N);
        &self.bytes[..len]
    }

    /// The text.
    pub fn as_str(&self) -> &str {
        // Construction only accepts valid UTF-8 that ends at a char boundary.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Length of the text in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Is the text empty?
    pub fn is_empty(&self) -> bool {
        self.bytes.first().map_or(true, |b| *b == 0)
    }

    fn check_bytes(bytes: &[u8; N]) -> Result<(), Utf8Error> {
        let len = bytes.iter().position(|b| *b == 0).unwrap_or(N);
        std::str::from_utf8(&bytes[..len]).map(|_| ())
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self { bytes: [0; N] }
    }
}

impl<const N: usize> TryFrom<&str> for FixedStr<N> {
    type Error = DecodeError;

    /// Fails if s is longer than N bytes or contains a NUL.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s.len() > N {
            return Err(DecodeError::new(
                format!("text of {} bytes does not fit in {}", s.len(), N),
                None,
            ));
        }
        if s.as_bytes().contains(&0) {
            return Err(DecodeError::new("text contains a NUL".to_string(), None));
        }
        let mut bytes = [0_u8; N];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(Self { bytes })
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> FixedBytes for FixedStr<N> {
    const SIZE: usize = N;

    fn write_bytes(&self, buffer: &mut [u8]) {
        buffer.copy_from_slice(&self.bytes);
    }

    fn read_bytes(buffer: &[u8]) -> Result<Self, DecodeError> {
        let mut bytes = [0_u8; N];
        bytes.copy_from_slice(buffer);
        // Anything after the first NUL is padding, keep it zeroed so equality is on the text.
        if let Some(len) = bytes.iter().position(|b| *b == 0) {
            bytes[len..].fill(0);
        }
        Self::check_bytes(&bytes).map_err(|e| {
            DecodeError::new("fixed string is not utf-8".to_string(), Some(Box::new(e)))
        })?;
        Ok(Self { bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<T: FixedBytes>(t: &T) -> Vec<u8> {
        let mut buffer = vec![0_u8; T::SIZE];
        t.write_bytes(&mut buffer);
        buffer
    }

    #[test]
    fn test_integers_little_endian() {
        assert_eq!(encode(&0x0102_0304_u32), vec![4, 3, 2, 1]);
        assert_eq!(encode(&-2_i16), vec![0xfe, 0xff]);
        assert_eq!(u64::read_bytes(&[1, 0, 0, 0, 0, 0, 0, 0]).unwrap(), 1);
        assert_eq!(<f64 as FixedBytes>::SIZE, 8);
        assert_eq!(f32::read_bytes(&encode(&1.5_f32)).unwrap(), 1.5);
    }

    #[test]
    fn test_bool_and_char() {
        assert_eq!(encode(&true), vec![1]);
        assert!(bool::read_bytes(&[2]).is_err());
        assert_eq!(char::read_bytes(&encode(&'é')).unwrap(), 'é');
        assert!(char::read_bytes(&0xd800_u32.to_le_bytes()).is_err());
    }

    #[test]
    fn test_arrays() {
        assert_eq!(<[u16; 3] as FixedBytes>::SIZE, 6);
        assert_eq!(encode(&[1_u16, 2, 3]), vec![1, 0, 2, 0, 3, 0]);
        assert_eq!(
            <[u16; 3]>::read_bytes(&[1, 0, 2, 0, 3, 0]).unwrap(),
            [1, 2, 3]
        );
        assert_eq!(<[u8; 4]>::read_bytes(b"abcd").unwrap(), *b"abcd");
    }

    #[test]
    fn test_zero_width_arrays() {
        assert_eq!(<[[u8; 0]; 2] as FixedBytes>::SIZE, 0);
        let empty: [[u8; 0]; 2] = [[], []];
        assert!(encode(&empty).is_empty());
        assert_eq!(<[[u8; 0]; 2]>::read_bytes(&[]).unwrap(), empty);
        assert_eq!(encode(&[[0_u8; 0]; 3]), Vec::<u8>::new());
    }

    #[test]
    fn test_fixed_str() {
        let s: FixedStr<8> = FixedStr::try_from("abc").unwrap();
        assert_eq!(s.as_str(), "abc");
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(encode(&s), b"abc\0\0\0\0\0".to_vec());
        assert_eq!(FixedStr::<8>::read_bytes(b"abc\0xyz\0").unwrap(), s);
        assert_eq!(format!("{:?}", s), "\"abc\"");
        assert_eq!(s.to_string(), "abc");

        let full: FixedStr<3> = FixedStr::try_from("abc").unwrap();
        assert_eq!(full.as_str(), "abc");
        assert!(FixedStr::<2>::try_from("abc").is_err());
        assert!(FixedStr::<4>::try_from("a\0b").is_err());
        assert!(FixedStr::<2>::read_bytes(&[0xff, 0xfe]).is_err());
        assert!(FixedStr::<4>::default().is_empty());
    }
}
