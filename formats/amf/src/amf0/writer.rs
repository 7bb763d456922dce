use core::time;
use std::{collections::HashMap, io};

use crate::{
    amf3,
    errors::{AmfError, AmfResult},
};

use byteorder::{BigEndian, WriteBytesExt};
use utils::traits::writer::WriteTo;

use super::{Value, amf0_marker};

impl<W: io::Write> WriteTo<W> for Value {
    type Error = AmfError;
    fn write_to(&self, writer: &mut W) -> Result<(), Self::Error> {
        match self {
            Value::Number(n) => Self::write_number(writer, *n),
            Value::Boolean(b) => Self::write_boolean(writer, *b),
            Value::String(ss) => Self::write_string(writer, ss),
            Value::Object { name, entries } => match name {
                Some(name) => Self::write_typed_object_arr_inner(writer, name, entries),
                None => Self::write_anonymous_object_arr(writer, entries),
            },
            Value::Null => Self::write_null(writer),
            Value::Undefined => Self::write_undefined(writer),
            Value::Reference { index } => Self::write_reference(writer, *index),
            Value::ECMAArray(arr) => Self::write_ecma_array(writer, arr),
            Value::ObjectEnd => Self::write_object_end(writer),
            Value::StrictArray(arr) => Self::write_strict_array(writer, arr),
            Value::Date {
                time_zone,
                millis_timestamp: unix_timestamp,
            } => Self::write_date(writer, unix_timestamp, *time_zone),
            Value::XMLDocument(xml) => Self::write_xml(writer, xml),
            Value::AVMPlus(value) => Self::write_avm_plus(writer, value),
        }
    }
}

impl Value {
    pub fn write_number<W: io::Write>(writer: &mut W, v: f64) -> AmfResult<()> {
        writer.write_u8(amf0_marker::NUMBER)?;
        writer.write_f64::<BigEndian>(v)?;
        Ok(())
    }
    pub fn write_boolean<W: io::Write>(writer: &mut W, v: bool) -> AmfResult<()> {
        writer.write_u8(amf0_marker::BOOLEAN)?;
        writer.write_u8(v as u8)?;
        Ok(())
    }
    fn write_short_string_inner<W: io::Write>(writer: &mut W, v: &str) -> AmfResult<()> {
        assert!(v.len() < 0xFFFF); // TODO CHECK this
        writer.write_u16::<BigEndian>(v.len() as u16)?;
        writer.write_all(v.as_bytes())?;
        Ok(())
    }
    fn write_long_string_inner<W: io::Write>(writer: &mut W, v: &str) -> AmfResult<()> {
        assert!(v.len() <= 0xFFFF_FFFF);
        writer.write_u32::<BigEndian>(v.len() as u32)?;
        writer.write_all(v.as_bytes())?;
        Ok(())
    }
    pub fn write_string<W: io::Write>(writer: &mut W, v: &str) -> AmfResult<()> {
        if v.len() < 0xFFFF {
            writer.write_u8(amf0_marker::STRING)?;
            Self::write_short_string_inner(writer, v)?;
        } else {
            writer.write_u8(amf0_marker::LONG_STRING)?;
            Self::write_long_string_inner(writer, v)?;
        }
        Ok(())
    }
    fn write_pairs_inner<W: io::Write>(
        writer: &mut W,
        entries: &[(String, Value)],
    ) -> AmfResult<()> {
        for (key, value) in entries {
            Self::write_short_string_inner(writer, key)?;
            value.write_to(&mut *writer)?;
        }
        writer.write_u16::<BigEndian>(0)?;
        writer.write_u8(amf0_marker::OBJECT_END)?;
        Ok(())
    }
    fn write_anonymous_object_arr<W: io::Write>(
        writer: &mut W,
        entries: &[(String, Value)],
    ) -> AmfResult<()> {
        assert!(entries.len() <= 0xFFFF_FFFF);
        writer.write_u8(amf0_marker::OBJECT)?;
        Self::write_pairs_inner(writer, entries)?;
        Ok(())
    }
    pub fn write_anonymous_object<W: io::Write>(
        writer: &mut W,
        entries: &HashMap<String, Value>,
    ) -> AmfResult<()> {
        let arr: Vec<(_, _)> = entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self::write_anonymous_object_arr(writer, arr.as_slice())?;
        Ok(())
    }
    pub fn write_null<W: io::Write>(writer: &mut W) -> AmfResult<()> {
        writer.write_u8(amf0_marker::NULL)?;
        Ok(())
    }
    pub fn write_undefined<W: io::Write>(writer: &mut W) -> AmfResult<()> {
        writer.write_u8(amf0_marker::UNDEFINED)?;
        Ok(())
    }
    pub fn write_reference<W: io::Write>(writer: &mut W, index: u16) -> AmfResult<()> {
        writer.write_u8(amf0_marker::REFERENCE)?;
        writer.write_u16::<BigEndian>(index)?;
        Ok(())
    }
    pub fn write_ecma_array<W: io::Write>(
        writer: &mut W,
        arr: &[(String, Value)],
    ) -> AmfResult<()> {
        assert!(arr.len() <= 0xFFFF_FFFF);
        writer.write_u8(amf0_marker::ECMA_ARRAY)?;
        writer.write_u32::<BigEndian>(arr.len() as u32)?;
        Self::write_pairs_inner(writer, arr)?;
        Ok(())
    }
    fn write_object_end<W: io::Write>(writer: &mut W) -> AmfResult<()> {
        writer.write_u8(amf0_marker::OBJECT_END)?;
        Ok(())
    }
    pub fn write_strict_array<W: io::Write>(writer: &mut W, arr: &[Value]) -> AmfResult<()> {
        assert!(arr.len() <= 0xFFFF_FFFF);
        writer.write_u8(amf0_marker::STRICT_ARRAY)?;
        writer.write_u32::<BigEndian>(arr.len() as u32)?;
        for v in arr {
            v.write_to(&mut *writer)?;
        }
        Ok(())
    }
    pub fn write_date<W: io::Write>(
        writer: &mut W,
        date_time: &time::Duration,
        time_zone: i16,
    ) -> AmfResult<()> {
        assert!(time_zone.eq(&0x0000));
        writer.write_u8(amf0_marker::DATE)?;
        writer.write_f64::<BigEndian>(date_time.as_millis() as f64)?;
        writer.write_i16::<BigEndian>(0x0000)?;
        Ok(())
    }
    pub fn write_xml<W: io::Write>(writer: &mut W, xml: &str) -> AmfResult<()> {
        writer.write_u8(amf0_marker::XML_DOCUMENT)?;
        Self::write_long_string_inner(writer, xml)?;
        Ok(())
    }
    fn write_typed_object_arr_inner<W: io::Write>(
        writer: &mut W,
        name: &str,
        entries: &[(String, Value)],
    ) -> AmfResult<()> {
        assert!(entries.len() <= 0xFFFF_FFFF);
        writer.write_u8(amf0_marker::TYPED_OBJECT)?;
        Self::write_short_string_inner(writer, name)?;
        Self::write_pairs_inner(writer, entries)?;
        Ok(())
    }
    pub fn write_typed_object<W: io::Write>(
        writer: &mut W,
        name: &str,
        entries: &HashMap<String, Value>,
    ) -> AmfResult<()> {
        let arr: Vec<(_, _)> = entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self::write_typed_object_arr_inner(writer, name, &arr)?;
        Ok(())
    }
    pub fn write_avm_plus<W: io::Write>(writer: &mut W, value: &amf3::Value) -> AmfResult<()> {
        writer.write_u8(amf0_marker::AVMPLUS_OBJECT)?;
        value.write_to(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::time;

    use crate::{amf0::Value, amf3};
    use utils::traits::writer::WriteTo;

    macro_rules! encode {
        ($value:expr) => {{
            let mut buf = Vec::new();
            let res = (&$value).write_to(&mut buf);
            assert!(res.is_ok());
            buf
        }};
    }

    #[test]
    fn number() {
        assert_eq!(
            encode!(Value::Number(3.5)),
            vec![0x00, 0x40, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        )
    }

    #[test]
    fn boolean() {
        assert_eq!(encode!(Value::Boolean(true)), vec![0x01, 0x01]);
        assert_eq!(encode!(Value::Boolean(false)), vec![0x01, 0x00])
    }

    #[test]
    fn string() {
        assert_eq!(
            encode!(Value::String("this is a テスト".to_string())),
            vec![
                0x02, 0x00, 0x13, 0x74, 0x68, 0x69, 0x73, 0x20, 0x69, 0x73, 0x20, 0x61, 0x20,
                0xE3, 0x83, 0x86, 0xE3, 0x82, 0xB9, 0xE3, 0x83, 0x88,
            ]
        );
    }

    #[test]
    fn anonymous_object() {
        {
            let pairs = vec![
                ("foo".to_string(), Value::String("bar".to_string())),
                ("baz".to_string(), Value::Null),
            ];

            assert_eq!(
                encode!(Value::Object {
                    name: None,
                    entries: pairs
                }),
                vec![
                    0x03, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x02, 0x00, 0x03, 0x62, 0x61, 0x72, 0x00,
                    0x03, 0x62, 0x61, 0x7A, 0x05, 0x00, 0x00, 0x09,
                ]
            );
        }
    }

    #[test]
    fn null() {
        assert_eq!(encode!(Value::Null), vec![0x05]);
    }

    #[test]
    fn undefined() {
        assert_eq!(encode!(Value::Undefined), vec![0x06]);
    }

    #[test]
    fn reference() {
        assert_eq!(
            encode!(Value::Reference { index: 1 }),
            vec![0x07, 0x00, 0x01]
        );
    }

    #[test]
    fn ecma_array() {
        let arr = vec![
            ("0".to_string(), Value::String("a".to_string())),
            ("1".to_string(), Value::String("b".to_string())),
            ("2".to_string(), Value::String("c".to_string())),
            ("3".to_string(), Value::String("d".to_string())),
        ];
        assert_eq!(
            encode!(Value::ECMAArray(arr)),
            vec![
                0x08, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01, 0x30, 0x02, 0x00, 0x01, 0x61, 0x00,
                0x01, 0x31, 0x02, 0x00, 0x01, 0x62, 0x00, 0x01, 0x32, 0x02, 0x00, 0x01, 0x63,
                0x00, 0x01, 0x33, 0x02, 0x00, 0x01, 0x64, 0x00, 0x00, 0x09,
            ]
        );
    }

    #[test]
    fn strict_array() {
        let arr = vec![
            Value::Number(1.0),
            Value::String("2".to_string()),
            Value::Number(3.0),
        ];
        assert_eq!(
            encode!(Value::StrictArray(arr)),
            vec![
                0x0A, 0x00, 0x00, 0x00, 0x03, 0x00, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x02, 0x00, 0x01, 0x32, 0x00, 0x40, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00,
            ]
        );
    }

    #[test]
    fn date() {
        assert_eq!(
            encode!(Value::Date {
                time_zone: 0,
                millis_timestamp: time::Duration::from_millis(1_590_796_800_000)
            }),
            vec![0x0B, 0x42, 0x77, 0x26, 0x2E, 0x0D, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn xml() {
        let xml = "<parent><child prop=\"test\" /></parent>";
        let mut expected = vec![0x0F];
        expected.extend_from_slice(&(xml.len() as u32).to_be_bytes());
        expected.extend_from_slice(xml.as_bytes());
        assert_eq!(encode!(Value::XMLDocument(xml.to_string())), expected);
    }

    #[test]
    fn typed_object() {
        let arr = vec![
            ("foo".to_string(), Value::String("bar".to_string())),
            ("baz".to_string(), Value::Null),
        ];

        let mut buf = Vec::new();
        Value::write_typed_object_arr_inner(&mut buf, "org.amf.ASClass", &arr).unwrap();

        assert_eq!(
            buf,
            vec![
                0x10, 0x00, 0x0F, 0x6F, 0x72, 0x67, 0x2E, 0x61, 0x6D, 0x66, 0x2E, 0x41, 0x53,
                0x43, 0x6C, 0x61, 0x73, 0x73, 0x00, 0x03, 0x66, 0x6F, 0x6F, 0x02, 0x00, 0x03,
                0x62, 0x61, 0x72, 0x00, 0x03, 0x62, 0x61, 0x7A, 0x05, 0x00, 0x00, 0x09,
            ]
        );
    }

    #[test]
    fn avm_plus() {
        assert_eq!(
            encode!(Value::AVMPlus(amf3::Value::Array {
                assoc_entries: vec![],
                dense_entries: (1..4).map(amf3::Value::Integer).collect()
            })),
            vec![0x11, 0x09, 0x01, 0x01, 0x04, 0x02, 0x04, 0x04, 0x04, 0x06]
        );
    }
}
