use core::time;
use std::{io, vec};

use byteorder::{BigEndian, ReadBytesExt};

use crate::errors::{AmfError, AmfResult};

use super::{Value, amf0_marker, amf3};

#[derive(Debug)]
struct Amf0Referenceable {
    objects: Vec<Value>,
}

#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    referenceable: Amf0Referenceable,
}
impl<R> Reader<R> {
    /// Unwraps this `Decoder`, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Get the reference to the underlying reader.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Get the mutable reference to the underlying reader.
    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}
impl<R> Reader<R>
where
    R: io::Read,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            referenceable: Amf0Referenceable {
                objects: Vec::new(),
            },
        }
    }
    pub fn read(&mut self) -> AmfResult<Option<Value>> {
        let marker = self.inner.read_u8();
        if marker.is_err() {
            return Ok(None);
        }
        let marker = marker.expect("this cannot be err");
        let value = match marker {
            amf0_marker::NUMBER => self.read_number(),
            amf0_marker::BOOLEAN => self.read_boolean(),
            amf0_marker::STRING => self.read_string(),
            amf0_marker::OBJECT => self.read_anonymous_object(),
            amf0_marker::MOVIECLIP => Err(AmfError::Unsupported { marker }),
            amf0_marker::NULL => Ok(Value::Null),
            amf0_marker::UNDEFINED => Ok(Value::Undefined),
            amf0_marker::REFERENCE => self.read_reference(),
            amf0_marker::ECMA_ARRAY => self.read_ecma_array(),
            amf0_marker::OBJECT_END => Ok(Value::ObjectEnd),
            amf0_marker::STRICT_ARRAY => self.read_strict_array(),
            amf0_marker::DATE => self.read_date(),
            amf0_marker::LONG_STRING => self.read_long_string(),
            amf0_marker::UNSUPPORTED => Err(AmfError::Unsupported { marker }),
            amf0_marker::RECORDSET => Err(AmfError::Unsupported { marker }),
            amf0_marker::XML_DOCUMENT => self.read_xml_document(),
            amf0_marker::TYPED_OBJECT => self.read_typed_object(),
            amf0_marker::AVMPLUS_OBJECT => self.read_avm_plus(),
            _ => Err(AmfError::Unknown { marker }),
        };
        match value {
            Ok(v) => Ok(Some(v)),
            Err(err) => Err(err),
        }
    }

    pub fn read_all(&mut self) -> AmfResult<Vec<Value>> {
        let mut result = Vec::new();
        while let Ok(Some(value)) = self.read() {
            result.push(value);
        }
        Ok(result)
    }

    pub fn read_number(&mut self) -> AmfResult<Value> {
        let number = self.inner.read_f64::<BigEndian>()?;
        Ok(Value::Number(number))
    }
    pub fn read_boolean(&mut self) -> AmfResult<Value> {
        let bool = self.inner.read_u8()?;
        Ok(Value::Boolean(bool != 0))
    }
    fn read_utf8_inner(&mut self, len: usize) -> AmfResult<String> {
        let mut buffer = vec![0; len];
        self.inner.read_exact(&mut buffer)?;
        let result = String::from_utf8(buffer)?;
        Ok(result)
    }
    pub fn read_string(&mut self) -> AmfResult<Value> {
        let len = self.inner.read_u16::<BigEndian>()?;
        self.read_utf8_inner(len as usize).map(Value::String)
    }
    pub fn read_long_string(&mut self) -> AmfResult<Value> {
        let len = self.inner.read_u32::<BigEndian>()?;
        self.read_utf8_inner(len as usize).map(Value::String)
    }
    fn read_key_value_pairs_inner(&mut self) -> AmfResult<Vec<(String, Value)>> {
        let mut result: Vec<(String, Value)> = Vec::new();
        loop {
            let len: u16 = self.inner.read_u16::<BigEndian>()?;
            let key = self.read_utf8_inner(len as usize)?;
            match self.read() {
                Ok(Some(Value::ObjectEnd)) if key.is_empty() => {
                    break;
                }
                Ok(None) => {
                    return Err(AmfError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "unexpected eof",
                    )));
                }
                Ok(Some(value)) => {
                    result.push((key, value));
                }
                Err(err) => {
                    return Err(err);
                }
            }
        }
        Ok(result)
    }
    pub fn read_anonymous_object(&mut self) -> AmfResult<Value> {
        self.read_and_record_referenceable_inner(|this| {
            let pairs = this.read_key_value_pairs_inner()?;
            Ok(Value::Object {
                name: None,
                entries: pairs,
            })
        })
    }
    pub fn read_reference(&mut self) -> AmfResult<Value> {
        let index = self.inner.read_u16::<BigEndian>()? as usize;
        self.referenceable
            .objects
            .get(index)
            .ok_or(AmfError::OutOfRangeReference { index })
            .and_then(|v| match *v {
                Value::Null => Err(AmfError::CircularReference { index }),
                _ => Ok(v.clone()),
            })
    }
    pub fn read_ecma_array(&mut self) -> AmfResult<Value> {
        self.read_and_record_referenceable_inner(|this| {
            // TODO - is this completely useless?
            let _len = this.inner.read_u32::<BigEndian>()? as usize;
            let pairs = this.read_key_value_pairs_inner()?;
            Ok(Value::ECMAArray(pairs))
        })
    }
    pub fn read_strict_array(&mut self) -> AmfResult<Value> {
        self.read_and_record_referenceable_inner(|this| {
            let len = this.inner.read_u32::<BigEndian>()? as usize;
            let values = (0..len)
                .map(|_| match this.read() {
                    Ok(None) => Err(AmfError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "expected eof",
                    ))),
                    Ok(Some(value)) => Ok(value),
                    Err(err) => Err(err),
                })
                .collect::<AmfResult<_>>()?;
            Ok(Value::StrictArray(values))
        })
    }
    pub fn read_date(&mut self) -> AmfResult<Value> {
        let timestamp = self.inner.read_f64::<BigEndian>()?;
        if !(timestamp.is_finite() && timestamp.is_sign_positive()) {
            return Err(AmfError::InvalidDate {
                milliseconds: timestamp,
            });
        }
        let time_zone = self.inner.read_i16::<BigEndian>()?;
        if time_zone != 0x0000 {
            return Err(AmfError::UnexpectedTimeZone { offset: time_zone });
        }
        Ok(Value::Date {
            time_zone,
            millis_timestamp: time::Duration::from_millis(timestamp as u64),
        })
    }
    pub fn read_xml_document(&mut self) -> AmfResult<Value> {
        let len = self.inner.read_u32::<BigEndian>()?;
        self.read_utf8_inner(len as usize).map(Value::XMLDocument)
    }
    pub fn read_typed_object(&mut self) -> AmfResult<Value> {
        self.read_and_record_referenceable_inner(|this| {
            let name_len = this.inner.read_u16::<BigEndian>()?;
            let name = this.read_utf8_inner(name_len as usize)?;
            let pairs = this.read_key_value_pairs_inner()?;
            Ok(Value::Object {
                name: Some(name),
                entries: pairs,
            })
        })
    }
    pub fn read_avm_plus(&mut self) -> AmfResult<Value> {
        let result = amf3::Reader::new(&mut self.inner).read()?;
        match result {
            Some(v) => Ok(Value::AVMPlus(v)),
            None => Err(AmfError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected eof",
            ))),
        }
    }
    fn read_and_record_referenceable_inner<F>(&mut self, f: F) -> AmfResult<Value>
    where
        F: FnOnce(&mut Self) -> AmfResult<Value>,
    {
        let len = self.referenceable.objects.len();
        self.referenceable.objects.push(Value::Null);
        let result = f(self)?;
        self.referenceable.objects[len] = result.clone();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use core::time;
    use std::io::{self};

    use crate::{
        amf0::{Value, amf0_marker},
        amf3,
        errors::AmfError,
    };

    use super::Reader;
    macro_rules! decode {
        ($bytes:expr) => {{
            let data: &[u8] = $bytes;
            Reader::new(&mut &data[..]).read()
        }};
    }

    macro_rules! assert_eof {
        ($bytes:expr) => {
            let err = decode!($bytes).unwrap_err();
            match err {
                AmfError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
                _ => assert!(false),
            }
        };
    }

    #[test]
    fn number() {
        assert_eq!(
            decode!(&[0x00, 0x40, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
                .unwrap()
                .unwrap(),
            Value::Number(3.5)
        );
        assert_ne!(
            decode!(&[0x00, 0x40, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
                .unwrap()
                .unwrap(),
            Value::Null
        );

        assert_eof!(&[0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn boolean() {
        assert_eq!(decode!(&[0x01, 0x01]).unwrap().unwrap(), Value::Boolean(true));
        assert_eq!(decode!(&[0x01, 0x00]).unwrap().unwrap(), Value::Boolean(false));

        assert_eof!(&[0x01]);
    }

    #[test]
    fn string() {
        let bytes = [
            0x02, 0x00, 0x13, 0x74, 0x68, 0x69, 0x73, 0x20, 0x69, 0x73, 0x20, 0x61, 0x20, 0xE3,
            0x83, 0x86, 0xE3, 0x82, 0xB9, 0xE3, 0x83, 0x88,
        ];
        assert_eq!(
            decode!(&bytes).unwrap().unwrap(),
            Value::String("this is a テスト".to_string())
        );
        assert_ne!(
            decode!(&bytes).unwrap().unwrap(),
            Value::String("random utf8 字".to_string())
        );

        assert_eof!(&[0x02, 0x00, 0x05, 0x61, 0x62]);
    }

    #[test]
    fn xml() {
        let xml = "<parent><child prop=\"test\" /></parent>";
        let mut bytes = vec![0x0F];
        bytes.extend_from_slice(&(xml.len() as u32).to_be_bytes());
        bytes.extend_from_slice(xml.as_bytes());
        assert_eq!(
            decode!(&bytes).unwrap().unwrap(),
            Value::XMLDocument(xml.to_string())
        );
    }

    #[test]
    fn object() {
        let bytes = [
            0x03, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x02, 0x00, 0x03, 0x62, 0x61, 0x72, 0x00, 0x03,
            0x62, 0x61, 0x7A, 0x05, 0x00, 0x00, 0x09,
        ];
        let pairs = vec![
            ("foo".to_string(), Value::String("bar".to_string())),
            ("baz".to_string(), Value::Null),
        ];
        assert_eq!(
            decode!(&bytes).unwrap().unwrap(),
            Value::Object {
                name: None,
                entries: pairs
            }
        );

        assert_eof!(&bytes[..bytes.len() - 3]);
    }

    #[test]
    fn movieclip() {
        let err = decode!(&[amf0_marker::MOVIECLIP]).unwrap_err();
        match err {
            AmfError::Unsupported { marker } => assert_eq!(marker, amf0_marker::MOVIECLIP),
            _ => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn null() {
        assert_eq!(decode!(&[0x05]).unwrap().unwrap(), Value::Null);
    }

    #[test]
    fn undefined() {
        assert_eq!(decode!(&[0x06]).unwrap().unwrap(), Value::Undefined);
    }

    #[test]
    fn reference() {
        let bytes = [
            0x03, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x02, 0x00, 0x03, 0x62, 0x61, 0x7A, 0x00, 0x00,
            0x09, 0x07, 0x00, 0x00,
        ];
        let object = Value::Object {
            name: None,
            entries: vec![("foo".to_string(), Value::String("baz".to_string()))],
        };
        let mut reader = Reader::new(&mut &bytes[..]);
        assert_eq!(reader.read().unwrap().unwrap(), object);
        assert_eq!(reader.read().unwrap().unwrap(), object);
    }

    #[test]
    fn ecma_array() {
        let bytes = [
            0x08, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01, 0x30, 0x02, 0x00, 0x01, 0x61, 0x00, 0x01,
            0x31, 0x02, 0x00, 0x01, 0x62, 0x00, 0x01, 0x32, 0x02, 0x00, 0x01, 0x63, 0x00, 0x01,
            0x33, 0x02, 0x00, 0x01, 0x64, 0x00, 0x00, 0x09,
        ];
        let arr = vec![
            ("0".to_string(), Value::String("a".to_string())),
            ("1".to_string(), Value::String("b".to_string())),
            ("2".to_string(), Value::String("c".to_string())),
            ("3".to_string(), Value::String("d".to_string())),
        ];
        assert_eq!(decode!(&bytes).unwrap().unwrap(), Value::ECMAArray(arr));

        assert_eof!(&bytes[..bytes.len() - 3]);
    }

    #[test]
    fn strict_array() {
        let bytes = [
            0x0A, 0x00, 0x00, 0x00, 0x03, 0x00, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x01, 0x32, 0x00, 0x40, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let arr = vec![
            Value::Number(1.0),
            Value::String("2".to_string()),
            Value::Number(3.0),
        ];
        assert_eq!(decode!(&bytes).unwrap().unwrap(), Value::StrictArray(arr));

        assert_eof!(&bytes[..4]);
    }

    #[test]
    fn date() {
        let bytes = [
            0x0B, 0x42, 0x77, 0x26, 0x2E, 0x0D, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(
            decode!(&bytes).unwrap().unwrap(),
            Value::Date {
                time_zone: 0,
                millis_timestamp: time::Duration::from_millis(1_590_796_800_000)
            }
        );

        let negative = [0x0B, 0xBF, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            decode!(&negative),
            Err(AmfError::InvalidDate { milliseconds }) if milliseconds < 0.0
        ));
    }

    #[test]
    fn typed_object() {
        let bytes = [
            0x10, 0x00, 0x0F, 0x6F, 0x72, 0x67, 0x2E, 0x61, 0x6D, 0x66, 0x2E, 0x41, 0x53, 0x43,
            0x6C, 0x61, 0x73, 0x73, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x02, 0x00, 0x03, 0x62, 0x61,
            0x72, 0x00, 0x03, 0x62, 0x61, 0x7A, 0x05, 0x00, 0x00, 0x09,
        ];
        let pairs = vec![
            ("foo".to_string(), Value::String("bar".to_string())),
            ("baz".to_string(), Value::Null),
        ];
        assert_eq!(
            decode!(&bytes).unwrap().unwrap(),
            Value::Object {
                name: Some("org.amf.ASClass".to_string()),
                entries: pairs
            }
        );
    }

    #[test]
    fn unsupported() {
        assert!(matches!(
            decode!(&[amf0_marker::MOVIECLIP]),
            Err(AmfError::Unsupported {
                marker: amf0_marker::MOVIECLIP
            })
        ));
        assert!(matches!(
            decode!(&[amf0_marker::RECORDSET]),
            Err(AmfError::Unsupported {
                marker: amf0_marker::RECORDSET
            })
        ));
    }

    #[test]
    fn unknown() {
        assert_eq!(decode!(&[]).unwrap(), None);
        assert!(matches!(
            decode!(&[0xFF]),
            Err(AmfError::Unknown { marker: 0xFF })
        ));
    }

    #[test]
    fn avm_plus() {
        let bytes = [0x11, 0x09, 0x01, 0x01, 0x04, 0x02, 0x04, 0x04, 0x04, 0x06];
        assert_eq!(
            decode!(&bytes).unwrap().unwrap(),
            Value::AVMPlus(amf3::Value::Array {
                assoc_entries: vec![],
                dense_entries: (1..4).map(amf3::Value::Integer).collect()
            })
        );
    }
}
