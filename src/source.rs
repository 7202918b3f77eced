use std::collections::{HashMap, HashSet, VecDeque};

use crate::condition::{Condition, FieldLookup};
use crate::error::Result;
use crate::record::{Record, Value};


/**
 * Delivers decoded records from a finite log, in order.
 */
pub trait RecordSource {
    /**
     * Returns the next record whose type is in `wanted` and which satisfies
     * `condition`, if one was given. `Ok(None)` means the log is exhausted;
     * calling again after that keeps returning `Ok(None)`.
     */
    fn next_matching(
        &mut self,
        wanted: &HashSet<String>,
        condition: Option<&Condition>,
    ) -> Result<Option<Record>>;
}


/**
 * The most recent record of every type seen so far, so that a condition can
 * refer to fields of a message type other than the candidate's.
 */
#[derive(Default)]
pub struct LastSeen {
    records: HashMap<String, Record>,
}


impl LastSeen {
    pub fn update(&mut self, record: &Record) {
        self.records.insert(record.type_name.clone(), record.clone());
    }

    /**
     * Checks `record` against an optional condition.
     */
    pub fn accepts(&self, record: &Record, condition: Option<&Condition>) -> bool {
        match condition {
            Some(condition) => condition.evaluate(&CandidateLookup { record, last_seen: self }),
            None => true,
        }
    }
}


struct CandidateLookup<'a> {
    record: &'a Record,
    last_seen: &'a LastSeen,
}


impl<'a> FieldLookup for CandidateLookup<'a> {
    fn lookup(&self, type_name: Option<&str>, field: &str) -> Option<&Value> {
        match type_name {
            None => self.record.get(field),
            Some(name) if name == self.record.type_name => self.record.get(field),
            Some(name) => self.last_seen.records.get(name).and_then(|r| r.get(field)),
        }
    }
}


/**
 * Replays records held in memory.
 */
pub struct MemorySource {
    records: VecDeque<Record>,
    last_seen: LastSeen,
}


impl MemorySource {
    pub fn new(records: Vec<Record>) -> MemorySource {
        MemorySource {
            records: records.into(),
            last_seen: LastSeen::default(),
        }
    }
}


impl RecordSource for MemorySource {
    fn next_matching(
        &mut self,
        wanted: &HashSet<String>,
        condition: Option<&Condition>,
    ) -> Result<Option<Record>> {
        while let Some(record) = self.records.pop_front() {
            self.last_seen.update(&record);
            if wanted.contains(&record.type_name) && self.last_seen.accepts(&record, condition) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}
