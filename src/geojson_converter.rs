use std::io::Write;

use crate::dispatcher::{Converter, Handler};
use crate::error::Result;
use crate::geojson::FeatureCollection;
use crate::record::Record;
use crate::snapshot_aggregator::SnapshotAggregator;


pub const DEFAULT_POSITION_TYPE: &str = "GPS_RAW_INT";
pub const DEFAULT_AUXILIARY_TYPES: [&str; 3] = ["VFR_HUD", "VIBRATION", "RADIO_STATUS"];
/// The same roles in a DataFlash log
pub const DATAFLASH_POSITION_TYPE: &str = "GPS";
pub const DATAFLASH_AUXILIARY_TYPES: [&str; 1] = ["VIBE"];


/**
 * Streams merged telemetry snapshots out as GeoJSON points. The
 * FeatureCollection is opened on construction and closed by `close`, or
 * when the converter is dropped on an error path.
 */
pub struct GeoJsonConverter<W: Write> {
    aggregator: SnapshotAggregator,
    output: FeatureCollection<W>,
}


impl<W: Write> GeoJsonConverter<W> {
    pub fn new(out: W, position_type: &str, auxiliary_types: &[String]) -> Result<GeoJsonConverter<W>> {
        Ok(GeoJsonConverter {
            aggregator: SnapshotAggregator::new(position_type, auxiliary_types),
            output: FeatureCollection::open(out)?,
        })
    }

    pub fn feature_count(&self) -> usize {
        self.output.count()
    }

    /**
     * Writes the end of the FeatureCollection and returns the output.
     */
    pub fn close(self) -> Result<W> {
        self.output.finish()
    }

    fn on_position(&mut self, record: &Record) -> Result<()> {
        self.aggregator.on_position(record, &mut self.output)
    }

    fn on_auxiliary(&mut self, record: &Record) -> Result<()> {
        self.aggregator.on_auxiliary(record);
        Ok(())
    }
}


impl<W: Write> Converter for GeoJsonConverter<W> {
    fn handlers(&self) -> Vec<(String, Handler<Self>)> {
        let mut handlers = vec![(
            self.aggregator.position_type().to_string(),
            GeoJsonConverter::on_position as Handler<Self>,
        )];
        for type_name in self.aggregator.required() {
            if type_name != self.aggregator.position_type() {
                handlers.push((type_name.clone(), GeoJsonConverter::on_auxiliary as Handler<Self>));
            }
        }
        handlers
    }

    fn start(&mut self, _name: &str) {
        self.aggregator.reset();
    }

    fn finish(&mut self) -> Result<()> {
        self.aggregator.flush(&mut self.output)?;
        Ok(())
    }
}
