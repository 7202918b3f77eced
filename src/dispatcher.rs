use std::collections::{HashMap, HashSet};

use crate::condition::Condition;
use crate::error::{ConvertError, Result};
use crate::record::Record;
use crate::source::RecordSource;


/// Processes one record on behalf of a converter.
pub type Handler<C> = fn(&mut C, &Record) -> Result<()>;


/**
 * Something that turns a stream of records into output, one handler per
 * record type.
 */
pub trait Converter: Sized {
    /**
     * The record types this converter understands, with their handlers. If a
     * type appears twice the later entry wins.
     */
    fn handlers(&self) -> Vec<(String, Handler<Self>)>;

    /**
     * Called before the first record of each log.
     */
    fn start(&mut self, _name: &str) {}

    /**
     * Called once the source is exhausted.
     */
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}


/**
 * Pulls records from a source and routes each to its handler, strictly in
 * arrival order.
 */
pub struct Dispatcher<C> {
    handlers: HashMap<String, Handler<C>>,
    wanted: HashSet<String>,
    condition: Option<Condition>,
}


impl<C: Converter> Dispatcher<C> {
    pub fn new(condition: Option<Condition>) -> Dispatcher<C> {
        Dispatcher {
            handlers: HashMap::new(),
            wanted: HashSet::new(),
            condition,
        }
    }

    pub fn for_converter(converter: &C, condition: Option<Condition>) -> Dispatcher<C> {
        let mut dispatcher = Dispatcher::new(condition);
        for (type_name, handler) in converter.handlers() {
            dispatcher.register_handler(&type_name, handler);
        }
        dispatcher
    }

    pub fn register_handler(&mut self, type_name: &str, handler: Handler<C>) {
        debug!("registering handler for {} messages", type_name);
        self.handlers.insert(type_name.to_string(), handler);
        self.wanted.insert(type_name.to_string());
    }

    pub fn types(&self) -> &HashSet<String> {
        &self.wanted
    }

    /**
     * Feeds every matching record of `source` to `converter`, then lets the
     * converter finish. Returns the number of records processed.
     */
    pub fn run(&self, converter: &mut C, source: &mut dyn RecordSource, name: &str) -> Result<usize> {
        info!("processing messages from {}", name);
        let mut count = 0;

        converter.start(name);
        while let Some(record) = source.next_matching(&self.wanted, self.condition.as_ref())? {
            count += 1;
            debug!("processing {} message: {:?}", record.type_name, record.fields);
            let handler = match self.handlers.get(&record.type_name) {
                Some(handler) => handler,
                None => return Err(ConvertError::UnhandledType(record.type_name)),
            };
            handler(converter, &record)?;
        }

        converter.finish()?;
        info!("finished processing {} ({} messages)", name, count);
        Ok(count)
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{Converter, Dispatcher, Handler};
    use crate::condition::Condition;
    use crate::error::{ConvertError, Result};
    use crate::record::{Record, Value};
    use crate::source::{MemorySource, RecordSource};

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
        finished: bool,
    }

    impl Recorder {
        fn on_a(&mut self, record: &Record) -> Result<()> {
            self.seen.push(format!("a{}", record.timestamp));
            Ok(())
        }

        fn on_b(&mut self, record: &Record) -> Result<()> {
            self.seen.push(format!("b{}", record.timestamp));
            Ok(())
        }

        fn on_b_again(&mut self, record: &Record) -> Result<()> {
            self.seen.push(format!("B{}", record.timestamp));
            Ok(())
        }

        fn fail(&mut self, record: &Record) -> Result<()> {
            record.require("Missing").map(|_| ())
        }
    }

    impl Converter for Recorder {
        fn handlers(&self) -> Vec<(String, Handler<Self>)> {
            vec![
                ("A".to_string(), Recorder::on_a as Handler<Self>),
                ("B".to_string(), Recorder::on_b as Handler<Self>),
                ("B".to_string(), Recorder::on_b_again as Handler<Self>),
            ]
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new("A", 1.0).with("X", Value::Int(1)),
            Record::new("C", 2.0),
            Record::new("B", 3.0).with("X", Value::Int(2)),
            Record::new("A", 4.0).with("X", Value::Int(3)),
        ]
    }

    #[test]
    fn test_routes_in_order_and_last_registration_wins() {
        let mut recorder = Recorder::default();
        let dispatcher = Dispatcher::for_converter(&recorder, None);
        let mut source = MemorySource::new(records());
        let count = dispatcher.run(&mut recorder, &mut source, "test").unwrap();
        assert_eq!(count, 3);
        assert_eq!(recorder.seen, vec!["a1", "B3", "a4"]);
        assert!(recorder.finished);
    }

    #[test]
    fn test_condition_is_passed_to_source() {
        let mut recorder = Recorder::default();
        let condition = Condition::parse("X >= 2").unwrap();
        let dispatcher = Dispatcher::for_converter(&recorder, Some(condition));
        let mut source = MemorySource::new(records());
        dispatcher.run(&mut recorder, &mut source, "test").unwrap();
        assert_eq!(recorder.seen, vec!["B3", "a4"]);
    }

    #[test]
    fn test_handler_error_aborts() {
        let mut recorder = Recorder::default();
        let mut dispatcher: Dispatcher<Recorder> = Dispatcher::new(None);
        dispatcher.register_handler("A", Recorder::fail);
        let mut source = MemorySource::new(records());
        match dispatcher.run(&mut recorder, &mut source, "test") {
            Err(ConvertError::MissingField { .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!recorder.finished);
    }

    /// A source that ignores the requested types
    struct Rogue;

    impl RecordSource for Rogue {
        fn next_matching(&mut self, _: &HashSet<String>, _: Option<&Condition>) -> Result<Option<Record>> {
            Ok(Some(Record::new("Z", 0.0)))
        }
    }

    #[test]
    fn test_unrequested_type_is_fatal() {
        let mut recorder = Recorder::default();
        let dispatcher = Dispatcher::for_converter(&recorder, None);
        match dispatcher.run(&mut recorder, &mut Rogue, "test") {
            Err(ConvertError::UnhandledType(name)) => assert_eq!(name, "Z"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
