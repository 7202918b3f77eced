/**
 * MAVLink and ArduPilot lookup tables: navigation commands, flight modes,
 * marker icons and track colors.
 */

use enum_primitive::FromPrimitive;

use crate::record::Value;


enum_from_primitive! {
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MavCmdNav {
    Waypoint = 16,
    LoiterUnlim = 17,
    LoiterTurns = 18,
    LoiterTime = 19,
    ReturnToLaunch = 20,
    Land = 21,
    Takeoff = 22,
    LandLocal = 23,
    TakeoffLocal = 24,
    Follow = 25,
    ContinueAndChangeAlt = 30,
    LoiterToAlt = 31,
    Roi = 80,
    Pathplanning = 81,
    SplineWaypoint = 82,
    VtolTakeoff = 84,
    VtolLand = 85,
    GuidedEnable = 92,
    Delay = 93,
    PayloadPlace = 94,
    Last = 95
}
}


impl MavCmdNav {
    /**
     * Returns the navigation command for a raw command id, or `None` for
     * DO_* / CONDITION_* commands and anything unknown.
     */
    pub fn from_id(id: i64) -> Option<MavCmdNav> {
        MavCmdNav::from_i64(id)
    }

    pub fn name(&self) -> &'static str {
        match *self {
            MavCmdNav::Waypoint => "MAV_CMD_NAV_WAYPOINT",
            MavCmdNav::LoiterUnlim => "MAV_CMD_NAV_LOITER_UNLIM",
            MavCmdNav::LoiterTurns => "MAV_CMD_NAV_LOITER_TURNS",
            MavCmdNav::LoiterTime => "MAV_CMD_NAV_LOITER_TIME",
            MavCmdNav::ReturnToLaunch => "MAV_CMD_NAV_RETURN_TO_LAUNCH",
            MavCmdNav::Land => "MAV_CMD_NAV_LAND",
            MavCmdNav::Takeoff => "MAV_CMD_NAV_TAKEOFF",
            MavCmdNav::LandLocal => "MAV_CMD_NAV_LAND_LOCAL",
            MavCmdNav::TakeoffLocal => "MAV_CMD_NAV_TAKEOFF_LOCAL",
            MavCmdNav::Follow => "MAV_CMD_NAV_FOLLOW",
            MavCmdNav::ContinueAndChangeAlt => "MAV_CMD_NAV_CONTINUE_AND_CHANGE_ALT",
            MavCmdNav::LoiterToAlt => "MAV_CMD_NAV_LOITER_TO_ALT",
            MavCmdNav::Roi => "MAV_CMD_NAV_ROI",
            MavCmdNav::Pathplanning => "MAV_CMD_NAV_PATHPLANNING",
            MavCmdNav::SplineWaypoint => "MAV_CMD_NAV_SPLINE_WAYPOINT",
            MavCmdNav::VtolTakeoff => "MAV_CMD_NAV_VTOL_TAKEOFF",
            MavCmdNav::VtolLand => "MAV_CMD_NAV_VTOL_LAND",
            MavCmdNav::GuidedEnable => "MAV_CMD_NAV_GUIDED_ENABLE",
            MavCmdNav::Delay => "MAV_CMD_NAV_DELAY",
            MavCmdNav::PayloadPlace => "MAV_CMD_NAV_PAYLOAD_PLACE",
            MavCmdNav::Last => "MAV_CMD_NAV_LAST",
        }
    }

    /**
     * Google Earth icon for the waypoint marker, if this command gets one.
     * See http://kml4earth.appspot.com/icons.html for more.
     */
    pub fn icon(&self) -> Option<&'static str> {
        match *self {
            MavCmdNav::Waypoint =>
                Some("http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png"),
            MavCmdNav::ReturnToLaunch =>
                Some("http://maps.google.com/mapfiles/kml/paddle/red-square.png"),
            MavCmdNav::Takeoff => Some("http://maps.google.com/mapfiles/kml/paddle/go.png"),
            MavCmdNav::Land => Some("http://maps.google.com/mapfiles/kml/paddle/orange-square.png"),
            MavCmdNav::LoiterTime
            | MavCmdNav::LoiterToAlt
            | MavCmdNav::LoiterTurns
            | MavCmdNav::LoiterUnlim =>
                Some("http://maps.google.com/mapfiles/kml/paddle/pause.png"),
            _ => None,
        }
    }
}


enum_from_primitive! {
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CopterMode {
    Stabilize = 0,
    Acro = 1,
    AltHold = 2,
    Auto = 3,
    Guided = 4,
    Loiter = 5,
    Rtl = 6,
    Circle = 7,
    Position = 8,
    Land = 9,
    OfLoiter = 10,
    Drift = 11,
    Sport = 13,
    Flip = 14,
    Autotune = 15,
    PosHold = 16,
    Brake = 17,
    Throw = 18,
    AvoidAdsb = 19,
    GuidedNoGps = 20,
    SmartRtl = 21
}
}


impl CopterMode {
    pub fn name(&self) -> &'static str {
        match *self {
            CopterMode::Stabilize => "STABILIZE",
            CopterMode::Acro => "ACRO",
            CopterMode::AltHold => "ALT_HOLD",
            CopterMode::Auto => "AUTO",
            CopterMode::Guided => "GUIDED",
            CopterMode::Loiter => "LOITER",
            CopterMode::Rtl => "RTL",
            CopterMode::Circle => "CIRCLE",
            CopterMode::Position => "POSITION",
            CopterMode::Land => "LAND",
            CopterMode::OfLoiter => "OF_LOITER",
            CopterMode::Drift => "DRIFT",
            CopterMode::Sport => "SPORT",
            CopterMode::Flip => "FLIP",
            CopterMode::Autotune => "AUTOTUNE",
            CopterMode::PosHold => "POSHOLD",
            CopterMode::Brake => "BRAKE",
            CopterMode::Throw => "THROW",
            CopterMode::AvoidAdsb => "AVOID_ADSB",
            CopterMode::GuidedNoGps => "GUIDED_NOGPS",
            CopterMode::SmartRtl => "SMART_RTL",
        }
    }
}


pub const UNKNOWN: &str = "UNKNOWN";


/**
 * Human readable name for a logged flight mode. Older firmware logs the mode
 * as text already; newer firmware logs the mode number.
 */
pub fn mode_name(mode: Option<&Value>) -> String {
    match mode {
        Some(&Value::Text(ref name)) => name.clone(),
        Some(value) => value
            .as_i64()
            .and_then(CopterMode::from_i64)
            .map_or(UNKNOWN, |m| m.name())
            .to_string(),
        None => UNKNOWN.to_string(),
    }
}


/**
 * Track colors, KML aabbggrr: red, blue, violet, yellow, orange, burlywood,
 * azure, lightblue, lawngreen, indianred, hotpink, green.
 */
pub const TRACK_COLORS: [&str; 12] = [
    "ff0000ff",
    "ffff0000",
    "ffee82ee",
    "ff00ffff",
    "ff00a5ff",
    "ff87b8de",
    "fffffff0",
    "ffe6d8ad",
    "ff00fc7c",
    "ff5c5ccd",
    "ffb469ff",
    "ff008000",
];
