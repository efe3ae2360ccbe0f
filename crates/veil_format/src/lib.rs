#![forbid(unsafe_code)]
//! The veil class-artifact format
//!
//! A `.vclass` artifact is the byte-level definition of one class: its
//! declared name, a pool of type references, its fields, and its methods.
//! The `veilc` compiler emits this format and the classveil runtime consumes
//! it byte-for-byte, so encoding and decoding live together in this crate.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic       b"VEIL"
//! version     u16
//! name        u16 length + UTF-8 bytes
//! type pool   u16 count, then per entry: tag u8
//!               0..=3  Unit / Int / Bool / Str
//!               4      Named: u16 length + UTF-8 bytes
//! fields      u16 count, then per field: name string + type-pool index u16
//! methods     u16 count, then per method: name string,
//!               u8 param count + type-pool index u16 per param,
//!               return type-pool index u16,
//!               body tag u8 (0 unit, 1 int + i64, 2 bool + u8, 3 str + string)
//! ```
//!
//! Decoding validates every type-pool index, so a decoded [`ClassImage`] never
//! contains a dangling reference. Semantic rules (duplicate names, body vs.
//! return-type agreement) are the runtime verifier's job, not the codec's.

use std::fmt;

use thiserror::Error;

/// Leading magic bytes of every artifact.
pub const MAGIC: [u8; 4] = *b"VEIL";

/// Current format version.
pub const VERSION: u16 = 1;

/// Conventional file extension for compiled artifacts.
pub const ARTIFACT_EXTENSION: &str = "vclass";

/// One entry in a class's type pool.
///
/// `Named` carries the referenced class's declared name exactly as it appears
/// in source; resolution against a namespace happens at link time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Unit,
    Int,
    Bool,
    Str,
    Named(String),
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Unit => write!(f, "Unit"),
            TypeRef::Int => write!(f, "Int"),
            TypeRef::Bool => write!(f, "Bool"),
            TypeRef::Str => write!(f, "Str"),
            TypeRef::Named(name) => write!(f, "{}", name),
        }
    }
}

/// A field declaration: name plus type-pool index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: u16,
}

/// The single statement a method body may contain.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBody {
    ReturnUnit,
    ReturnInt(i64),
    ReturnBool(bool),
    ReturnStr(String),
}

/// A method declaration: signature (type-pool indices) plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<u16>,
    pub ret: u16,
    pub body: MethodBody,
}

/// A decoded class artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassImage {
    pub name: String,
    pub types: Vec<TypeRef>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

/// Errors produced while encoding a [`ClassImage`].
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("too many {what} for the format ({count}, max {max})")]
    TooMany {
        what: &'static str,
        count: usize,
        max: usize,
    },
}

/// Errors produced while decoding artifact bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a veil class artifact (bad magic)")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("artifact is truncated")]
    Truncated,
    #[error("string data is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown type tag {0}")]
    BadTypeTag(u8),
    #[error("unknown method body tag {0}")]
    BadBodyTag(u8),
    #[error("type-pool index {index} out of range (pool has {pool_len} entries)")]
    TypeIndexOutOfRange { index: u16, pool_len: usize },
    #[error("{0} trailing bytes after class definition")]
    TrailingBytes(usize),
}

impl ClassImage {
    /// Encode the image into artifact bytes.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        write_string(&mut out, &self.name)?;

        out.extend_from_slice(&len16("type-pool entries", self.types.len())?.to_le_bytes());
        for ty in &self.types {
            match ty {
                TypeRef::Unit => out.push(0),
                TypeRef::Int => out.push(1),
                TypeRef::Bool => out.push(2),
                TypeRef::Str => out.push(3),
                TypeRef::Named(name) => {
                    out.push(4);
                    write_string(&mut out, name)?;
                }
            }
        }

        out.extend_from_slice(&len16("fields", self.fields.len())?.to_le_bytes());
        for field in &self.fields {
            write_string(&mut out, &field.name)?;
            out.extend_from_slice(&field.ty.to_le_bytes());
        }

        out.extend_from_slice(&len16("methods", self.methods.len())?.to_le_bytes());
        for method in &self.methods {
            write_string(&mut out, &method.name)?;
            let param_count = len16("parameters", method.params.len())?;
            if param_count > u16::from(u8::MAX) {
                return Err(EncodeError::TooMany {
                    what: "parameters",
                    count: method.params.len(),
                    max: u8::MAX as usize,
                });
            }
            out.push(param_count as u8);
            for param in &method.params {
                out.extend_from_slice(&param.to_le_bytes());
            }
            out.extend_from_slice(&method.ret.to_le_bytes());
            match &method.body {
                MethodBody::ReturnUnit => out.push(0),
                MethodBody::ReturnInt(value) => {
                    out.push(1);
                    out.extend_from_slice(&value.to_le_bytes());
                }
                MethodBody::ReturnBool(value) => {
                    out.push(2);
                    out.push(u8::from(*value));
                }
                MethodBody::ReturnStr(value) => {
                    out.push(3);
                    write_string(&mut out, value)?;
                }
            }
        }

        Ok(out)
    }

    /// Decode artifact bytes into an image.
    ///
    /// The full input must be consumed; leftover bytes are an error, so an
    /// artifact that was concatenated or padded is rejected rather than
    /// silently half-read.
    pub fn decode(bytes: &[u8]) -> Result<ClassImage, DecodeError> {
        let mut reader = Reader { bytes, pos: 0 };

        if reader.take(4)? != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        let version = reader.u16()?;
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let name = reader.string()?;

        let type_count = reader.u16()? as usize;
        let mut types = Vec::with_capacity(type_count);
        for _ in 0..type_count {
            let ty = match reader.u8()? {
                0 => TypeRef::Unit,
                1 => TypeRef::Int,
                2 => TypeRef::Bool,
                3 => TypeRef::Str,
                4 => TypeRef::Named(reader.string()?),
                tag => return Err(DecodeError::BadTypeTag(tag)),
            };
            types.push(ty);
        }

        let field_count = reader.u16()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            let name = reader.string()?;
            let ty = reader.type_index(types.len())?;
            fields.push(FieldDef { name, ty });
        }

        let method_count = reader.u16()? as usize;
        let mut methods = Vec::with_capacity(method_count);
        for _ in 0..method_count {
            let name = reader.string()?;
            let param_count = reader.u8()? as usize;
            let mut params = Vec::with_capacity(param_count);
            for _ in 0..param_count {
                params.push(reader.type_index(types.len())?);
            }
            let ret = reader.type_index(types.len())?;
            let body = match reader.u8()? {
                0 => MethodBody::ReturnUnit,
                1 => MethodBody::ReturnInt(reader.i64()?),
                2 => MethodBody::ReturnBool(reader.u8()? != 0),
                3 => MethodBody::ReturnStr(reader.string()?),
                tag => return Err(DecodeError::BadBodyTag(tag)),
            };
            methods.push(MethodDef {
                name,
                params,
                ret,
                body,
            });
        }

        if reader.pos != bytes.len() {
            return Err(DecodeError::TrailingBytes(bytes.len() - reader.pos));
        }

        Ok(ClassImage {
            name,
            types,
            fields,
            methods,
        })
    }

    /// Look up a type-pool entry. Indices in a decoded image are always in
    /// range; this is for callers assembling images by hand.
    pub fn type_ref(&self, index: u16) -> Option<&TypeRef> {
        self.types.get(index as usize)
    }
}

fn len16(what: &'static str, count: usize) -> Result<u16, EncodeError> {
    u16::try_from(count).map_err(|_| EncodeError::TooMany {
        what,
        count,
        max: u16::MAX as usize,
    })
}

fn write_string(out: &mut Vec<u8>, value: &str) -> Result<(), EncodeError> {
    let len = len16("string bytes", value.len())?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.checked_add(n).ok_or(DecodeError::Truncated)?;
        if end > self.bytes.len() {
            return Err(DecodeError::Truncated);
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(i64::from_le_bytes(buf))
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = self.u16()? as usize;
        let b = self.take(len)?;
        String::from_utf8(b.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    fn type_index(&mut self, pool_len: usize) -> Result<u16, DecodeError> {
        let index = self.u16()?;
        if (index as usize) >= pool_len {
            return Err(DecodeError::TypeIndexOutOfRange { index, pool_len });
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> ClassImage {
        ClassImage {
            name: "NonFindable".to_string(),
            types: vec![
                TypeRef::Int,
                TypeRef::Unit,
                TypeRef::Named("NonFindable".to_string()),
            ],
            fields: vec![
                FieldDef {
                    name: "counter".to_string(),
                    ty: 0,
                },
                FieldDef {
                    name: "next".to_string(),
                    ty: 2,
                },
            ],
            methods: vec![MethodDef {
                name: "test".to_string(),
                params: vec![],
                ret: 0,
                body: MethodBody::ReturnInt(42),
            }],
        }
    }

    #[test]
    fn round_trips_a_representative_class() {
        let image = sample_image();
        let bytes = image.encode().unwrap();
        let decoded = ClassImage::decode(&bytes).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = sample_image().encode().unwrap();
        bytes[0] = b'X';
        assert_eq!(ClassImage::decode(&bytes), Err(DecodeError::BadMagic));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut bytes = sample_image().encode().unwrap();
        bytes[4] = 0xFF;
        bytes[5] = 0xFF;
        assert_eq!(
            ClassImage::decode(&bytes),
            Err(DecodeError::UnsupportedVersion(0xFFFF))
        );
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = sample_image().encode().unwrap();
        for cut in [0, 3, 6, bytes.len() / 2, bytes.len() - 1] {
            let result = ClassImage::decode(&bytes[..cut]);
            assert!(result.is_err(), "cut at {} should fail", cut);
        }
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = sample_image().encode().unwrap();
        bytes.push(0);
        assert_eq!(ClassImage::decode(&bytes), Err(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn rejects_out_of_range_type_index() {
        let mut image = sample_image();
        image.fields[0].ty = 9;
        let bytes = image.encode().unwrap();
        assert_eq!(
            ClassImage::decode(&bytes),
            Err(DecodeError::TypeIndexOutOfRange { index: 9, pool_len: 3 })
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = sample_image().encode().unwrap();
        let b = sample_image().encode().unwrap();
        assert_eq!(a, b);
    }
}
