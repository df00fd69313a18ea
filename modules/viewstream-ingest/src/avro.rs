//! Avro encoding in the schema-registry wire format.
//!
//! Every payload is `0x00` + 4-byte big-endian schema id + Avro binary datum,
//! so consumers can look the writer schema up by id.

use apache_avro::Schema;
use viewstream_common::ActivityEvent;

use crate::error::Result;

/// Value schema for activity events.
pub const ACTIVITY_EVENT_SCHEMA: &str = include_str!("../schemas/activity_event.avsc");

/// Wire format magic byte.
const MAGIC_BYTE: u8 = 0x00;

/// 1 magic byte + 4 schema id bytes.
const HEADER_SIZE: usize = 5;

#[derive(Debug)]
pub struct AvroEncoder {
    schema: Schema,
    schema_id: u32,
}

impl AvroEncoder {
    /// `schema_json` is the same text registered with the schema registry
    /// under `schema_id`.
    pub fn new(schema_json: &str, schema_id: u32) -> Result<Self> {
        Ok(Self {
            schema: Schema::parse_str(schema_json)?,
            schema_id,
        })
    }

    pub fn schema_id(&self) -> u32 {
        self.schema_id
    }

    pub fn encode(&self, event: &ActivityEvent) -> Result<Vec<u8>> {
        let value = apache_avro::to_value(event)?.resolve(&self.schema)?;
        let datum = apache_avro::to_avro_datum(&self.schema, value)?;

        let mut buf = Vec::with_capacity(HEADER_SIZE + datum.len());
        buf.push(MAGIC_BYTE);
        buf.extend_from_slice(&self.schema_id.to_be_bytes());
        buf.extend_from_slice(&datum);
        Ok(buf)
    }
}
