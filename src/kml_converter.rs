use crate::dispatcher::{Converter, Handler};
use crate::error::Result;
use crate::kml::{KmlDocument, PlacemarkSink};
use crate::mavlink::{MavCmdNav, TRACK_COLORS};
use crate::record::{Coordinate, Record};
use crate::track_segmenter::{TrackOptions, TrackSegmenter};
use crate::waypoint_extractor::WaypointExtractor;


pub const DEFAULT_POSITION_SOURCE: &str = "GPS";


#[derive(Clone, Debug)]
pub struct KmlOptions {
    /// Message type carrying the vehicle position
    pub source: String,
    pub track: TrackOptions,
    pub extract_waypoints: bool,
}


impl Default for KmlOptions {
    fn default() -> KmlOptions {
        KmlOptions {
            source: DEFAULT_POSITION_SOURCE.to_string(),
            track: TrackOptions::default(),
            extract_waypoints: false,
        }
    }
}


/**
 * Builds a KML document with one track per flight mode stretch and,
 * optionally, the mission waypoints.
 */
pub struct KmlConverter {
    source: String,
    kml: KmlDocument,
    segmenter: TrackSegmenter,
    waypoints: WaypointExtractor,
}


impl KmlConverter {
    pub fn new(options: KmlOptions) -> KmlConverter {
        KmlConverter {
            source: options.source,
            kml: KmlDocument::new(),
            segmenter: TrackSegmenter::new(options.track, &TRACK_COLORS),
            waypoints: WaypointExtractor::new(options.extract_waypoints),
        }
    }

    pub fn document(&self) -> &KmlDocument {
        &self.kml
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.kml.serialize()
    }

    fn on_mode(&mut self, record: &Record) -> Result<()> {
        let mode = record.require("Mode")?.clone();
        self.segmenter.on_mode_change(mode);
        Ok(())
    }

    fn on_position(&mut self, record: &Record) -> Result<()> {
        let coordinate = Coordinate::from_record(record)?;
        self.segmenter.on_position(coordinate, &mut self.kml);
        Ok(())
    }

    fn on_command(&mut self, record: &Record) -> Result<()> {
        if !self.waypoints.is_enabled() {
            return Ok(());
        }
        let command_id = record.require_i64("CId")?;
        // DO_* and CONDITION_* commands carry no usable location
        if MavCmdNav::from_id(command_id).is_none() {
            return Ok(());
        }
        let coordinate = Coordinate::from_record(record)?;
        self.waypoints.on_command(command_id, coordinate, &mut self.kml);
        Ok(())
    }
}


impl Converter for KmlConverter {
    fn handlers(&self) -> Vec<(String, Handler<Self>)> {
        vec![
            ("MODE".to_string(), KmlConverter::on_mode as Handler<Self>),
            ("CMD".to_string(), KmlConverter::on_command as Handler<Self>),
            (self.source.clone(), KmlConverter::on_position as Handler<Self>),
        ]
    }

    fn start(&mut self, _name: &str) {
        self.segmenter.reset();
    }

    fn finish(&mut self) -> Result<()> {
        info!(
            "{} tracks and {} waypoints so far",
            self.segmenter.track_count(),
            self.waypoints.waypoint_count());
        Ok(())
    }
}
