use std::collections::BTreeSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde_json::{json, Map};

use crate::error::Result;
use crate::geojson::FeatureCollection;
use crate::record::Record;


/// Fix types below this (no fix, dead reckoning) are not usable positions
const MIN_FIX_TYPE: i64 = 2;


/**
 * How a position message lays out its fields. MAVLink GPS_RAW_INT packs
 * degrees * 1e7, millimeters, cm/s and centidegrees into integers; DataFlash
 * GPS is already in degrees, meters, m/s and degrees. Both number their fix
 * types the same way.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionLayout {
    MavlinkRaw,
    DataFlash,
}


/// Output property, source field, divisor
type Column = (&'static str, &'static str, f64);

static MAVLINK_RAW_COLUMNS: [Column; 5] = [
    ("gps_lat", "lat", 1.0e7),
    ("gps_lon", "lon", 1.0e7),
    ("gps_alt", "alt", 1.0e3),
    ("gps_velocity", "vel", 100.0),
    ("gps_heading", "cog", 100.0),
];

static DATAFLASH_COLUMNS: [Column; 5] = [
    ("gps_lat", "Lat", 1.0),
    ("gps_lon", "Lng", 1.0),
    ("gps_alt", "Alt", 1.0),
    ("gps_velocity", "Spd", 1.0),
    ("gps_heading", "GCrs", 1.0),
];


impl PositionLayout {
    /**
     * Picks the layout from the fields the record actually has, so the same
     * converter handles decoded telemetry and DataFlash logs.
     */
    pub fn of(record: &Record) -> PositionLayout {
        if record.get("fix_type").is_none() && record.get("Status").is_some() {
            PositionLayout::DataFlash
        } else {
            PositionLayout::MavlinkRaw
        }
    }

    fn fix_field(self) -> &'static str {
        match self {
            PositionLayout::MavlinkRaw => "fix_type",
            PositionLayout::DataFlash => "Status",
        }
    }

    fn columns(self) -> &'static [Column] {
        match self {
            PositionLayout::MavlinkRaw => &MAVLINK_RAW_COLUMNS,
            PositionLayout::DataFlash => &DATAFLASH_COLUMNS,
        }
    }
}


/**
 * What happened to the snapshot when it was flushed.
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Flush {
    /// Nothing had been collected
    Empty,
    Emitted,
    /// Some required message types never reported; these are the ones
    Incomplete(Vec<String>),
    NoFix,
}


/**
 * Merges the messages describing one instant into a single GeoJSON point.
 * Each position message closes the previous instant and opens the next one;
 * the instant is only written out once every required message type has
 * reported and the position has a fix.
 */
pub struct SnapshotAggregator {
    position_type: String,
    required: BTreeSet<String>,
    fields: Map<String, serde_json::Value>,
    contributors: BTreeSet<String>,
    fix: bool,
}


impl SnapshotAggregator {
    pub fn new(position_type: &str, auxiliary_types: &[String]) -> SnapshotAggregator {
        let mut required: BTreeSet<String> = auxiliary_types.iter().cloned().collect();
        required.insert(position_type.to_string());
        SnapshotAggregator {
            position_type: position_type.to_string(),
            required,
            fields: Map::new(),
            contributors: BTreeSet::new(),
            fix: false,
        }
    }

    pub fn position_type(&self) -> &str {
        &self.position_type
    }

    pub fn required(&self) -> &BTreeSet<String> {
        &self.required
    }

    /**
     * Drops whatever has been collected without writing it.
     */
    pub fn reset(&mut self) {
        self.fields.clear();
        self.contributors.clear();
        self.fix = false;
    }

    /**
     * Handles a message from the position source. The previous instant is
     * flushed first, then this message starts the next one.
     */
    pub fn on_position<W: Write>(&mut self, record: &Record, out: &mut FeatureCollection<W>) -> Result<()> {
        self.flush(out)?;

        let layout = PositionLayout::of(record);
        let fix_type = record.require_i64(layout.fix_field())?;
        let mut fields = Map::new();
        for &(name, field, scale) in layout.columns() {
            fields.insert(name.to_string(), json!(record.require_f64(field)? / scale));
        }
        fields.insert("timestamp".to_string(), json!(format_timestamp(record.timestamp)));

        self.fix = fix_type >= MIN_FIX_TYPE;
        self.fields = fields;
        self.contributors.clear();
        self.contributors.insert(record.type_name.clone());
        Ok(())
    }

    /**
     * Merges every field of a supporting message into the snapshot as
     * `<type>_<field>`, replacing any earlier value.
     */
    pub fn on_auxiliary(&mut self, record: &Record) {
        let prefix = record.type_name.to_lowercase();
        self.contributors.insert(record.type_name.clone());
        for &(ref name, ref value) in &record.fields {
            self.fields.insert(format!("{}_{}", prefix, name), value.to_json());
        }
    }

    /**
     * Writes the snapshot out if it is complete and has a fix, then starts
     * over. Flushing an empty snapshot does nothing.
     */
    pub fn flush<W: Write>(&mut self, out: &mut FeatureCollection<W>) -> Result<Flush> {
        if self.fields.is_empty() && self.contributors.is_empty() {
            return Ok(Flush::Empty);
        }

        let result = if self.contributors != self.required {
            let missing: Vec<String> = self.required.difference(&self.contributors).cloned().collect();
            warn!("incomplete data point; missing: {}", missing.join(","));
            Flush::Incomplete(missing)
        } else if !self.fix {
            debug!("ignoring data with no gps fix");
            Flush::NoFix
        } else {
            out.add(&self.feature())?;
            Flush::Emitted
        };

        self.reset();
        Ok(result)
    }

    fn feature(&self) -> serde_json::Value {
        let lon = self.fields.get("gps_lon").cloned().unwrap_or(serde_json::Value::Null);
        let lat = self.fields.get("gps_lat").cloned().unwrap_or(serde_json::Value::Null);
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [lon, lat],
            },
            "properties": self.fields,
        })
    }
}


/**
 * ISO 8601, UTC, microsecond precision.
 */
pub fn format_timestamp(timestamp: f64) -> String {
    let seconds = timestamp.floor();
    let nanos = (((timestamp - seconds) * 1.0e9).round() as u32).min(999_999_999);
    match DateTime::<Utc>::from_timestamp(seconds as i64, nanos) {
        Some(time) => time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        None => timestamp.to_string(),
    }
}
