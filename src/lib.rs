#[macro_use]
extern crate enum_primitive;
#[macro_use]
extern crate log;

pub mod condition;
pub mod dataflash;
pub mod dispatcher;
pub mod error;
pub mod geojson;
pub mod geojson_converter;
pub mod kml;
pub mod kml_converter;
pub mod mavlink;
pub mod record;
pub mod snapshot_aggregator;
pub mod source;
pub mod track_segmenter;
pub mod waypoint_extractor;
