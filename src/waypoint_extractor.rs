use std::collections::HashSet;

use crate::kml::{AltitudeMode, PlacemarkHandle, PlacemarkSink};
use crate::mavlink::{MavCmdNav, UNKNOWN};
use crate::record::{Coordinate, CoordinateKey};


/**
 * Turns mission commands into waypoint markers, one per distinct location.
 */
pub struct WaypointExtractor {
    enabled: bool,
    seen: HashSet<CoordinateKey>,
    next_id: usize,
}


impl WaypointExtractor {
    pub fn new(enabled: bool) -> WaypointExtractor {
        WaypointExtractor {
            enabled,
            seen: HashSet::new(),
            next_id: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn waypoint_count(&self) -> usize {
        self.next_id
    }

    /**
     * Emits a waypoint for a MAV_CMD_NAV_* command at a location we haven't
     * marked yet. Everything else is ignored.
     */
    pub fn on_command<S: PlacemarkSink + ?Sized>(
        &mut self,
        command_id: i64,
        coordinate: Coordinate,
        sink: &mut S,
    ) -> Option<PlacemarkHandle> {
        if !self.enabled {
            return None;
        }
        let command = MavCmdNav::from_id(command_id)?;
        if !self.seen.insert(coordinate.key()) {
            debug!("skipping waypoint at {:?}, already marked", coordinate);
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        let metadata = vec![
            ("command_id".to_string(), command_id.to_string()),
            ("command_name".to_string(), command_name(command_id)),
        ];
        Some(sink.new_point(
            &format!("WP{:03}", id),
            &[coordinate],
            AltitudeMode::Absolute,
            metadata,
            command.icon()))
    }
}


fn command_name(command_id: i64) -> String {
    MavCmdNav::from_id(command_id).map_or(UNKNOWN, |c| c.name()).to_string()
}
