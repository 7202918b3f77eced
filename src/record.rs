use std::fmt;

use num::ToPrimitive;

use crate::error::{ConvertError, Result};


/**
 * A single decoded field value. Logs carry integers, floats and short
 * strings; nothing else.
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}


impl Value {
    /**
     * Parses a raw textual field the way a log reader would: integer first,
     * then float, falling back to text.
     */
    pub fn parse(raw: &str) -> Value {
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Int(i);
        }
        match raw.parse::<f64>() {
            Ok(f) => Value::Float(f),
            Err(_) => Value::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(i) => i.to_f64(),
            Value::Float(f) => Some(f),
            Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            Value::Float(f) => f.to_i64(),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::Text(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match *self {
            Value::Int(i) => serde_json::Value::from(i),
            // NaN and infinities have no JSON representation
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(ref s) => serde_json::Value::String(s.clone()),
        }
    }
}


impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(ref s) => write!(f, "{}", s),
        }
    }
}


/**
 * One decoded telemetry message. Fields keep the order the log declared them
 * in.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<(String, Value)>,
    /// Arrival time, seconds since the Unix epoch
    pub timestamp: f64,
}


impl Record {
    pub fn new(type_name: &str, timestamp: f64) -> Record {
        Record {
            type_name: type_name.to_string(),
            fields: Vec::new(),
            timestamp,
        }
    }

    /**
     * Builder style field append, mostly for tests and in-memory sources.
     */
    pub fn with(mut self, name: &str, value: Value) -> Record {
        self.fields.push((name.to_string(), value));
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|&&(ref name, _)| name == field)
            .map(|&(_, ref value)| value)
    }

    pub fn require(&self, field: &str) -> Result<&Value> {
        self.get(field).ok_or_else(|| ConvertError::MissingField {
            type_name: self.type_name.clone(),
            field: field.to_string(),
        })
    }

    pub fn require_f64(&self, field: &str) -> Result<f64> {
        self.require(field)?
            .as_f64()
            .ok_or_else(|| ConvertError::WrongFieldType {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            })
    }

    pub fn require_i64(&self, field: &str) -> Result<i64> {
        self.require(field)?
            .as_i64()
            .ok_or_else(|| ConvertError::WrongFieldType {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            })
    }
}


/**
 * Longitude, latitude, altitude. Compared by exact value.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
}


/// Hashable identity of a `Coordinate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordinateKey([u64; 3]);


impl Coordinate {
    pub fn new(lon: f64, lat: f64, alt: f64) -> Coordinate {
        Coordinate { lon, lat, alt }
    }

    /**
     * Reads a coordinate out of a position or command record. Older logs
     * call the longitude `Lon`, newer ones `Lng`.
     */
    pub fn from_record(record: &Record) -> Result<Coordinate> {
        let lon = match record.get("Lng") {
            Some(_) => record.require_f64("Lng")?,
            None => record.require_f64("Lon")?,
        };
        Ok(Coordinate {
            lon,
            lat: record.require_f64("Lat")?,
            alt: record.require_f64("Alt")?,
        })
    }

    pub fn key(&self) -> CoordinateKey {
        // -0.0 == 0.0 but their bits differ
        fn bits(v: f64) -> u64 {
            if v == 0.0 { 0 } else { v.to_bits() }
        }
        CoordinateKey([bits(self.lon), bits(self.lat), bits(self.alt)])
    }
}


#[cfg(test)]
mod tests {
    use super::{Coordinate, Record, Value};
    use crate::error::ConvertError;

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse("42"), Value::Int(42));
        assert_eq!(Value::parse("-7"), Value::Int(-7));
        assert_eq!(Value::parse("1.5"), Value::Float(1.5));
        assert_eq!(Value::parse("AUTO"), Value::Text("AUTO".to_string()));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(3.9).as_i64(), Some(3));
        assert_eq!(Value::Text("x".to_string()).as_f64(), None);
        assert_eq!(Value::Float(std::f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(Value::Int(5).to_json(), serde_json::json!(5));
    }

    #[test]
    fn test_coordinate_from_record() {
        let record = Record::new("GPS", 0.0)
            .with("Lat", Value::Float(40.1))
            .with("Lng", Value::Float(-105.2))
            .with("Alt", Value::Int(1600));
        let coordinate = Coordinate::from_record(&record).unwrap();
        assert_eq!(coordinate, Coordinate::new(-105.2, 40.1, 1600.0));

        let legacy = Record::new("GPS", 0.0)
            .with("Lat", Value::Float(1.0))
            .with("Lon", Value::Float(2.0))
            .with("Alt", Value::Float(3.0));
        assert_eq!(
            Coordinate::from_record(&legacy).unwrap(),
            Coordinate::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn test_coordinate_missing_field() {
        let record = Record::new("CMD", 0.0).with("Lat", Value::Float(1.0));
        match Coordinate::from_record(&record) {
            Err(ConvertError::MissingField { type_name, field }) => {
                assert_eq!(type_name, "CMD");
                assert_eq!(field, "Lon");
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_coordinate_wrong_type() {
        let record = Record::new("GPS", 0.0)
            .with("Lat", Value::Text("north".to_string()))
            .with("Lng", Value::Float(1.0))
            .with("Alt", Value::Float(1.0));
        match Coordinate::from_record(&record) {
            Err(ConvertError::WrongFieldType { field, .. }) => assert_eq!(field, "Lat"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_coordinate_key_is_exact() {
        let a = Coordinate::new(1.0, 1.0, 1.0);
        let b = Coordinate::new(1.0, 1.0, 1.0);
        let c = Coordinate::new(1.0, 1.0, 1.0000001);
        assert_eq!(a.key(), b.key());
        assert!(a.key() != c.key());
        assert_eq!(
            Coordinate::new(-0.0, 0.0, 0.0).key(),
            Coordinate::new(0.0, 0.0, 0.0).key());
    }
}
