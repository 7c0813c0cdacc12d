//! Serde support for fixed arrays longer than 32 elements.
//!
//! Use as `#[serde(with = "emu_core::serde_array")]` on `[T; N]` fields.
//! Arrays are encoded as tuples, so the encoded size is fixed.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, Error, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeTuple, Serializer};

pub fn serialize<S, T, const N: usize>(array: &[T; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut tuple = serializer.serialize_tuple(N)?;
    for item in array {
        tuple.serialize_element(item)?;
    }
    tuple.end()
}

pub fn deserialize<'de, D, T, const N: usize>(deserializer: D) -> Result<[T; N], D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Copy + Default,
{
    deserializer.deserialize_tuple(N, ArrayVisitor::<T, N>(PhantomData))
}

struct ArrayVisitor<T, const N: usize>(PhantomData<T>);

impl<'de, T, const N: usize> Visitor<'de> for ArrayVisitor<T, N>
where
    T: Deserialize<'de> + Copy + Default,
{
    type Value = [T; N];

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an array of length {N}")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<[T; N], A::Error> {
        let mut array = [T::default(); N];
        for (i, slot) in array.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| Error::invalid_length(i, &self))?;
        }
        Ok(array)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        #[serde(with = "crate::serde_array")]
        pixels: [u8; 160],
    }

    #[test]
    fn long_array_survives_bincode() {
        let mut line = Line { pixels: [0; 160] };
        line.pixels[0] = 1;
        line.pixels[159] = 0x7F;
        let bytes = bincode::serialize(&line).expect("encode");
        assert_eq!(bytes.len(), 160);
        let back: Line = bincode::deserialize(&bytes).expect("decode");
        assert_eq!(back, line);
    }
}
