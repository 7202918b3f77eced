use crate::kml::{AltitudeMode, PlacemarkHandle, PlacemarkSink};
use crate::mavlink::mode_name;
use crate::record::{Coordinate, Value};


/**
 * Hands out colors from a fixed palette, wrapping around forever.
 */
pub struct ColorCycle {
    colors: &'static [&'static str],
    next: usize,
}


impl ColorCycle {
    pub fn new(colors: &'static [&'static str]) -> ColorCycle {
        ColorCycle { colors, next: 0 }
    }
}


impl Iterator for ColorCycle {
    type Item = &'static str;

    fn next(&mut self) -> Option<&'static str> {
        if self.colors.is_empty() {
            return None;
        }
        let color = self.colors[self.next % self.colors.len()];
        self.next = (self.next + 1) % self.colors.len();
        Some(color)
    }
}


#[derive(Clone, Debug, Default)]
pub struct TrackOptions {
    pub extrude: bool,
    pub color_by_mode: bool,
    /// Used for every track when set, regardless of mode
    pub color: Option<String>,
}


/**
 * The open track and the flight mode it belongs to. Reset per log file.
 */
#[derive(Debug, Default)]
struct TrackState {
    current: Option<PlacemarkHandle>,
    mode: Option<Value>,
}


/**
 * Splits the position stream into one track per contiguous stretch of the
 * same flight mode.
 */
pub struct TrackSegmenter {
    options: TrackOptions,
    state: TrackState,
    mode_colors: Vec<(Option<Value>, &'static str)>,
    colors: ColorCycle,
    next_id: usize,
}


impl TrackSegmenter {
    pub fn new(options: TrackOptions, palette: &'static [&'static str]) -> TrackSegmenter {
        TrackSegmenter {
            options,
            state: TrackState::default(),
            mode_colors: Vec::new(),
            colors: ColorCycle::new(palette),
            next_id: 0,
        }
    }

    /**
     * Forgets the open track and mode, e.g. before starting on the next log
     * file. Track ids and mode colors carry on.
     */
    pub fn reset(&mut self) {
        self.state = TrackState::default();
    }

    pub fn current_mode(&self) -> Option<&Value> {
        self.state.mode.as_ref()
    }

    pub fn track_count(&self) -> usize {
        self.next_id
    }

    /**
     * Closes the open track if the mode actually changed. The next track is
     * only created once a position arrives, so a mode with no positions
     * leaves no empty track behind.
     */
    pub fn on_mode_change(&mut self, mode: Value) {
        if self.state.mode.as_ref() != Some(&mode) {
            debug!("mode change to {}", mode);
            self.state.current = None;
            self.state.mode = Some(mode);
        }
    }

    pub fn on_position<S: PlacemarkSink + ?Sized>(&mut self, coordinate: Coordinate, sink: &mut S) {
        let track = match self.state.current {
            Some(track) => track,
            None => {
                let track = self.new_track(sink);
                self.state.current = Some(track);
                track
            },
        };
        sink.add_coordinates(track, &[coordinate]);
    }

    fn new_track<S: PlacemarkSink + ?Sized>(&mut self, sink: &mut S) -> PlacemarkHandle {
        let id = self.next_id;
        self.next_id += 1;
        let track = sink.new_track(&format!("TRK{:03}", id), AltitudeMode::Absolute, self.options.extrude);

        if self.options.color_by_mode {
            if let Some(color) = self.mode_color() {
                sink.set_style(track, color);
            }
        }
        if let Some(ref color) = self.options.color {
            sink.set_style(track, color);
        }

        let mode = self.state.mode.as_ref();
        let name = mode_name(mode);
        debug!("starting track {} in mode {}", id, name);
        sink.set_metadata(track, vec![
            ("mode_id".to_string(), mode.map_or(String::new(), |m| m.to_string())),
            ("mode_name".to_string(), name),
        ]);
        track
    }

    fn mode_color(&mut self) -> Option<&'static str> {
        let mode = &self.state.mode;
        if let Some(&(_, color)) = self.mode_colors.iter().find(|&&(ref m, _)| m == mode) {
            return Some(color);
        }
        let color = self.colors.next()?;
        self.mode_colors.push((self.state.mode.clone(), color));
        Some(color)
    }
}


#[cfg(test)]
mod tests {
    use super::{ColorCycle, TrackOptions, TrackSegmenter};
    use crate::kml::{Geometry, KmlDocument, Placemark, Style};
    use crate::mavlink::TRACK_COLORS;
    use crate::record::{Coordinate, Value};

    fn point(i: u32) -> Coordinate {
        Coordinate::new(i as f64, i as f64 * 2.0, 100.0 + i as f64)
    }

    fn coordinates(placemark: &Placemark) -> &[Coordinate] {
        match placemark.geometry {
            Geometry::LineString { ref coordinates, .. } => coordinates,
            Geometry::Point { .. } => panic!("expected a track"),
        }
    }

    fn metadata<'a>(placemark: &'a Placemark, key: &str) -> &'a str {
        placemark.metadata.iter().find(|&&(ref k, _)| k == key).map(|&(_, ref v)| v.as_str()).unwrap()
    }

    #[test]
    fn test_color_cycle_wraps() {
        static PALETTE: [&str; 2] = ["a", "b"];
        let colors: Vec<&str> = ColorCycle::new(&PALETTE).take(5).collect();
        assert_eq!(colors, vec!["a", "b", "a", "b", "a"]);
        assert_eq!(ColorCycle::new(&[]).next(), None);
    }

    #[test]
    fn test_no_mode_single_track() {
        let mut kml = KmlDocument::new();
        let mut segmenter = TrackSegmenter::new(TrackOptions::default(), &TRACK_COLORS);
        for i in 0..5 {
            segmenter.on_position(point(i), &mut kml);
        }
        assert_eq!(kml.placemarks().len(), 1);
        let track = &kml.placemarks()[0];
        assert_eq!(track.name, "TRK000");
        assert_eq!(coordinates(track), &[point(0), point(1), point(2), point(3), point(4)][..]);
        assert_eq!(metadata(track, "mode_id"), "");
        assert_eq!(metadata(track, "mode_name"), "UNKNOWN");
        assert_eq!(track.style, None);
    }

    #[test]
    fn test_new_track_starts_at_next_position() {
        let mut kml = KmlDocument::new();
        let mut segmenter = TrackSegmenter::new(TrackOptions::default(), &TRACK_COLORS);
        segmenter.on_position(point(0), &mut kml);
        segmenter.on_mode_change(Value::Int(3));
        // No track is opened by the mode change itself
        assert_eq!(kml.placemarks().len(), 1);
        segmenter.on_position(point(1), &mut kml);
        segmenter.on_position(point(2), &mut kml);

        assert_eq!(kml.placemarks().len(), 2);
        assert_eq!(coordinates(&kml.placemarks()[0]), &[point(0)][..]);
        let second = &kml.placemarks()[1];
        assert_eq!(second.name, "TRK001");
        assert_eq!(coordinates(second), &[point(1), point(2)][..]);
        assert_eq!(metadata(second, "mode_id"), "3");
        assert_eq!(metadata(second, "mode_name"), "AUTO");
    }

    #[test]
    fn test_same_mode_keeps_track() {
        let mut kml = KmlDocument::new();
        let mut segmenter = TrackSegmenter::new(TrackOptions::default(), &TRACK_COLORS);
        segmenter.on_mode_change(Value::Int(5));
        segmenter.on_position(point(0), &mut kml);
        segmenter.on_mode_change(Value::Int(5));
        segmenter.on_position(point(1), &mut kml);
        assert_eq!(kml.placemarks().len(), 1);
        assert_eq!(coordinates(&kml.placemarks()[0]).len(), 2);
    }

    #[test]
    fn test_mode_change_without_positions() {
        let mut kml = KmlDocument::new();
        let mut segmenter = TrackSegmenter::new(TrackOptions::default(), &TRACK_COLORS);
        segmenter.on_mode_change(Value::Int(0));
        segmenter.on_mode_change(Value::Int(3));
        segmenter.on_mode_change(Value::Int(6));
        assert!(kml.placemarks().is_empty());
        segmenter.on_position(point(0), &mut kml);
        assert_eq!(metadata(&kml.placemarks()[0], "mode_name"), "RTL");
        assert_eq!(segmenter.track_count(), 1);
    }

    #[test]
    fn test_color_by_mode() {
        let mut kml = KmlDocument::new();
        let options = TrackOptions { color_by_mode: true, ..TrackOptions::default() };
        let mut segmenter = TrackSegmenter::new(options, &TRACK_COLORS);
        for (i, mode) in [0, 3, 0, 6].iter().enumerate() {
            segmenter.on_mode_change(Value::Int(*mode));
            segmenter.on_position(point(i as u32), &mut kml);
        }
        let styles: Vec<Option<Style>> = kml.placemarks().iter().map(|p| p.style.clone()).collect();
        let line = |c: &str| Some(Style::Line(c.to_string()));
        assert_eq!(styles, vec![
            line(TRACK_COLORS[0]),
            line(TRACK_COLORS[1]),
            line(TRACK_COLORS[0]),
            line(TRACK_COLORS[2]),
        ]);
    }

    #[test]
    fn test_fixed_color_wins() {
        let mut kml = KmlDocument::new();
        let options = TrackOptions {
            color_by_mode: true,
            color: Some("ff123456".to_string()),
            ..TrackOptions::default()
        };
        let mut segmenter = TrackSegmenter::new(options, &TRACK_COLORS);
        segmenter.on_mode_change(Value::Int(3));
        segmenter.on_position(point(0), &mut kml);
        assert_eq!(kml.placemarks()[0].style, Some(Style::Line("ff123456".to_string())));
    }

    #[test]
    fn test_reset_between_files() {
        let mut kml = KmlDocument::new();
        let mut segmenter = TrackSegmenter::new(TrackOptions::default(), &TRACK_COLORS);
        segmenter.on_mode_change(Value::Int(3));
        segmenter.on_position(point(0), &mut kml);
        segmenter.reset();
        assert_eq!(segmenter.current_mode(), None);
        segmenter.on_position(point(1), &mut kml);
        assert_eq!(kml.placemarks().len(), 2);
        assert_eq!(kml.placemarks()[1].name, "TRK001");
    }
}
