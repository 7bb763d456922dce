

use tokio_util::{bytes::{Buf, BufMut, BytesMut}, codec::{Decoder, Encoder}};
use crate::errors::AmfError;
use utils::traits::writer::WriteTo;

use super::{Reader, Value};

pub struct Amf0ValueCodec;

impl Decoder for Amf0ValueCodec {
    type Error = AmfError;
    type Item = Value;
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let bytes_reader = src.reader();
        Reader::new(bytes_reader).read()
    }
}

impl Encoder<Value> for Amf0ValueCodec {
    type Error = AmfError;
    fn encode(&mut self, item: Value, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buf: Vec<u8> = Vec::new();
        <Value as WriteTo<Vec<u8>>>::write_to(&item, &mut buf)?;
        dst.put_slice(&buf);
        Ok(())
    }
}