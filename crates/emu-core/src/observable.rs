//! Inspection of component state.
//!
//! Every chip exposes its internal state through dotted query paths. This
//! is the inspection surface a debugger uses after a fault. Queries never
//! affect emulation state.

use std::fmt;

/// A dynamically-typed value returned by a state query.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U64(u64),
    I8(i8),
    String(String),
    Array(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
            Value::U8(v) => write!(f, "{v:#04X}"),
            Value::U16(v) => write!(f, "{v:#06X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::I8(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A component whose state can be inspected.
pub trait Observable {
    /// Query a property by dotted path, e.g. `p0.pos` or `timer.underflow`.
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// All paths accepted by [`Observable::query`].
    fn query_paths(&self) -> &'static [&'static str];

    /// Render every known path as `path: value` lines.
    fn dump(&self) -> String {
        let mut out = String::new();
        for path in self.query_paths() {
            if let Some(value) = self.query(path) {
                out.push_str(path);
                out.push_str(": ");
                out.push_str(&value.to_string());
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch;

    impl Observable for Latch {
        fn query(&self, path: &str) -> Option<Value> {
            match path {
                "flag" => Some(true.into()),
                "byte" => Some(0x2Au8.into()),
                _ => None,
            }
        }

        fn query_paths(&self) -> &'static [&'static str] {
            &["flag", "byte", "missing"]
        }
    }

    #[test]
    fn dump_skips_unknown_paths() {
        assert_eq!(Latch.dump(), "flag: 1\nbyte: 0x2A\n");
    }

    #[test]
    fn array_display() {
        let v = Value::Array(vec![Value::U8(1), Value::Bool(false)]);
        assert_eq!(v.to_string(), "[0x01, 0]");
    }

    #[test]
    fn unsigned_values_display_in_hex() {
        assert_eq!(Value::U8(0x0A).to_string(), "0x0A");
        assert_eq!(Value::U16(0xF00A).to_string(), "0xF00A");
        assert_eq!(Value::U16(227).to_string(), "0x00E3");
        assert_eq!(Value::U64(19_912).to_string(), "19912");
    }
}
