use crate::record::Coordinate;


/**
 * Refers to a placemark previously created in a `PlacemarkSink`.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacemarkHandle(usize);


#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AltitudeMode {
    Absolute,
    RelativeToGround,
    ClampToGround,
}


impl AltitudeMode {
    fn as_str(&self) -> &'static str {
        match *self {
            AltitudeMode::Absolute => "absolute",
            AltitudeMode::RelativeToGround => "relativeToGround",
            AltitudeMode::ClampToGround => "clampToGround",
        }
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    LineString { extrude: bool, coordinates: Vec<Coordinate> },
    Point { coordinates: Vec<Coordinate> },
}


#[derive(Clone, Debug, PartialEq)]
pub enum Style {
    /// Line color, aabbggrr
    Line(String),
    /// Icon image URL
    Icon(String),
}


#[derive(Clone, Debug, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub altitude_mode: AltitudeMode,
    pub geometry: Geometry,
    pub style: Option<Style>,
    pub metadata: Vec<(String, String)>,
}


/**
 * Collects tracks and points as they are produced. Implementations decide
 * how they end up on disk.
 */
pub trait PlacemarkSink {
    fn new_track(&mut self, name: &str, altitude_mode: AltitudeMode, extrude: bool) -> PlacemarkHandle;

    fn add_coordinates(&mut self, handle: PlacemarkHandle, coordinates: &[Coordinate]);

    /**
     * Sets the line color of a track.
     */
    fn set_style(&mut self, handle: PlacemarkHandle, color: &str);

    fn set_metadata(&mut self, handle: PlacemarkHandle, metadata: Vec<(String, String)>);

    fn new_point(
        &mut self,
        name: &str,
        coordinates: &[Coordinate],
        altitude_mode: AltitudeMode,
        metadata: Vec<(String, String)>,
        icon: Option<&str>,
    ) -> PlacemarkHandle;

    fn serialize(&self) -> Vec<u8>;
}


/**
 * An in-memory KML 2.2 document. Placemarks are written in creation order.
 */
#[derive(Default)]
pub struct KmlDocument {
    placemarks: Vec<Placemark>,
}


impl KmlDocument {
    pub fn new() -> KmlDocument {
        KmlDocument::default()
    }

    pub fn placemarks(&self) -> &[Placemark] {
        &self.placemarks
    }

    fn push(&mut self, placemark: Placemark) -> PlacemarkHandle {
        self.placemarks.push(placemark);
        PlacemarkHandle(self.placemarks.len() - 1)
    }
}


impl PlacemarkSink for KmlDocument {
    fn new_track(&mut self, name: &str, altitude_mode: AltitudeMode, extrude: bool) -> PlacemarkHandle {
        self.push(Placemark {
            name: name.to_string(),
            altitude_mode,
            geometry: Geometry::LineString { extrude, coordinates: Vec::new() },
            style: None,
            metadata: Vec::new(),
        })
    }

    fn add_coordinates(&mut self, handle: PlacemarkHandle, new_coordinates: &[Coordinate]) {
        if let Some(placemark) = self.placemarks.get_mut(handle.0) {
            match placemark.geometry {
                Geometry::LineString { ref mut coordinates, .. }
                | Geometry::Point { ref mut coordinates } => coordinates.extend_from_slice(new_coordinates),
            }
        }
    }

    fn set_style(&mut self, handle: PlacemarkHandle, color: &str) {
        if let Some(placemark) = self.placemarks.get_mut(handle.0) {
            placemark.style = Some(Style::Line(color.to_string()));
        }
    }

    fn set_metadata(&mut self, handle: PlacemarkHandle, metadata: Vec<(String, String)>) {
        if let Some(placemark) = self.placemarks.get_mut(handle.0) {
            placemark.metadata = metadata;
        }
    }

    fn new_point(
        &mut self,
        name: &str,
        coordinates: &[Coordinate],
        altitude_mode: AltitudeMode,
        metadata: Vec<(String, String)>,
        icon: Option<&str>,
    ) -> PlacemarkHandle {
        self.push(Placemark {
            name: name.to_string(),
            altitude_mode,
            geometry: Geometry::Point { coordinates: coordinates.to_vec() },
            style: icon.map(|href| Style::Icon(href.to_string())),
            metadata,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
        out.push_str("<Document>\n");
        for placemark in &self.placemarks {
            write_placemark(&mut out, placemark);
        }
        out.push_str("</Document>\n");
        out.push_str("</kml>\n");
        out.into_bytes()
    }
}


fn write_placemark(out: &mut String, placemark: &Placemark) {
    out.push_str("<Placemark>\n");
    out.push_str(&format!("<name>{}</name>\n", escape(&placemark.name)));

    match placemark.style {
        Some(Style::Line(ref color)) => out.push_str(&format!(
            "<Style><LineStyle><color>{}</color></LineStyle></Style>\n",
            escape(color))),
        Some(Style::Icon(ref href)) => out.push_str(&format!(
            "<Style><IconStyle><Icon><href>{}</href></Icon></IconStyle></Style>\n",
            escape(href))),
        None => (),
    }

    if !placemark.metadata.is_empty() {
        out.push_str("<ExtendedData>\n");
        for &(ref name, ref value) in &placemark.metadata {
            out.push_str(&format!(
                "<Data name=\"{}\"><value>{}</value></Data>\n",
                escape(name),
                escape(value)));
        }
        out.push_str("</ExtendedData>\n");
    }

    let (tag, extrude, coordinates) = match placemark.geometry {
        Geometry::LineString { extrude, ref coordinates } => ("LineString", Some(extrude), coordinates),
        Geometry::Point { ref coordinates } => ("Point", None, coordinates),
    };
    out.push_str(&format!("<{}>\n", tag));
    if let Some(extrude) = extrude {
        out.push_str(&format!("<extrude>{}</extrude>\n", if extrude { 1 } else { 0 }));
    }
    out.push_str(&format!("<altitudeMode>{}</altitudeMode>\n", placemark.altitude_mode.as_str()));
    let points: Vec<String> = coordinates
        .iter()
        .map(|c| format!("{},{},{}", c.lon, c.lat, c.alt))
        .collect();
    out.push_str(&format!("<coordinates>{}</coordinates>\n", points.join(" ")));
    out.push_str(&format!("</{}>\n", tag));
    out.push_str("</Placemark>\n");
}


fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
