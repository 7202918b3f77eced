/**
 * Reads ArduPilot DataFlash logs in their text form, as written by the
 * autopilot to SD card or converted by mission planners:
 *
 * FMT, 130, 45, GPS, BIHBcLLeeEefI, Status,TimeMS,Week,NSats,HDop,Lat,Lng,RelAlt,Alt,Spd,GCrs,VZ,T
 * GPS, 3, 122790, 1827, 9, 1.49, 40.0905792, -105.1856385, 0.15, 1578.5, 0.02, 0, 0, 0
 */

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::condition::Condition;
use crate::error::{ConvertError, Result};
use crate::record::{Record, Value};
use crate::source::{LastSeen, RecordSource};


pub struct DataFlashReader<R> {
    reader: R,
    formats: HashMap<String, Vec<String>>,
    last_seen: LastSeen,
    last_timestamp: f64,
    line_number: usize,
    exhausted: bool,
}


impl DataFlashReader<BufReader<File>> {
    pub fn open(path: &str) -> Result<DataFlashReader<BufReader<File>>> {
        match File::open(&Path::new(path)) {
            Ok(file) => Ok(DataFlashReader::new(BufReader::new(file))),
            Err(e) => Err(ConvertError::Open { path: path.to_string(), source: e }),
        }
    }
}


impl<R: BufRead> DataFlashReader<R> {
    pub fn new(reader: R) -> DataFlashReader<R> {
        DataFlashReader {
            reader,
            formats: HashMap::new(),
            last_seen: LastSeen::default(),
            last_timestamp: 0.0,
            line_number: 0,
            exhausted: false,
        }
    }

    /**
     * Returns the next data record of any type, registering formats along the
     * way.
     */
    fn next_record(&mut self) -> Result<Option<Record>> {
        let mut buffer = Vec::new();
        while !self.exhausted {
            buffer.clear();
            if self.reader.read_until(b'\n', &mut buffer)? == 0 {
                self.exhausted = true;
                break;
            }
            self.line_number += 1;

            // Logs pulled off flaky SD cards occasionally contain garbage
            let line = String::from_utf8_lossy(&buffer);
            let parts: Vec<&str> = line.trim().split(',').map(|s| s.trim()).collect();
            match parts[0] {
                "" => continue,
                "FMT" => self.register_format(&parts),
                name => {
                    if let Some(record) = self.parse_record(name, &parts[1..]) {
                        return Ok(Some(record));
                    }
                },
            }
        }
        Ok(None)
    }

    fn register_format(&mut self, parts: &[&str]) {
        // FMT, Type, Length, Name, Format, Columns...
        if parts.len() < 5 {
            debug!("line {}: short FMT line, skipping", self.line_number);
            return;
        }
        let columns = parts[5..]
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();
        self.formats.insert(parts[3].to_string(), columns);
    }

    fn parse_record(&mut self, name: &str, values: &[&str]) -> Option<Record> {
        let columns = match self.formats.get(name) {
            Some(columns) => columns,
            None => {
                debug!("line {}: no FMT for {}, skipping", self.line_number, name);
                return None;
            },
        };
        if columns.len() != values.len() {
            debug!(
                "line {}: {} has {} values, expected {}",
                self.line_number,
                name,
                values.len(),
                columns.len());
            return None;
        }

        let fields: Vec<(String, Value)> = columns
            .iter()
            .zip(values.iter())
            .map(|(column, raw)| (column.clone(), Value::parse(raw)))
            .collect();
        let mut record = Record::new(name, self.last_timestamp);
        record.fields = fields;

        if let Some(us) = record.get("TimeUS").and_then(|v| v.as_f64()) {
            record.timestamp = us / 1.0e6;
        } else if let Some(ms) = record.get("TimeMS").and_then(|v| v.as_f64()) {
            record.timestamp = ms / 1.0e3;
        }
        self.last_timestamp = record.timestamp;
        Some(record)
    }
}


impl<R: BufRead> RecordSource for DataFlashReader<R> {
    fn next_matching(
        &mut self,
        wanted: &HashSet<String>,
        condition: Option<&Condition>,
    ) -> Result<Option<Record>> {
        while let Some(record) = self.next_record()? {
            self.last_seen.update(&record);
            if wanted.contains(&record.type_name) && self.last_seen.accepts(&record, condition) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}
