use std::io::{self, Write};

use crate::error::Result;


/**
 * Writes a GeoJSON FeatureCollection piece by piece, so features can be
 * emitted as they are produced instead of being held in memory.
 */
pub struct FeatureWriter<W: Write> {
    out: W,
}


impl<W: Write> FeatureWriter<W> {
    pub fn new(out: W) -> FeatureWriter<W> {
        FeatureWriter { out }
    }

    pub fn write_opening(&mut self) -> Result<()> {
        self.out.write_all(b"{\"type\": \"FeatureCollection\", \"features\": [")?;
        Ok(())
    }

    pub fn write_feature(&mut self, feature: &serde_json::Value) -> Result<()> {
        serde_json::to_writer(&mut self.out, feature)?;
        Ok(())
    }

    pub fn write_separator(&mut self) -> Result<()> {
        self.out.write_all(b"\n,\n")?;
        Ok(())
    }

    pub fn write_closing(&mut self) -> Result<()> {
        self.out.write_all(b"]}\n")?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}


/**
 * An open FeatureCollection. The opening is written on construction and the
 * closing exactly once, either by `finish` or, on early exit, when dropped.
 */
pub struct FeatureCollection<W: Write> {
    writer: Option<FeatureWriter<W>>,
    count: usize,
}


impl<W: Write> FeatureCollection<W> {
    pub fn open(out: W) -> Result<FeatureCollection<W>> {
        let mut writer = FeatureWriter::new(out);
        writer.write_opening()?;
        Ok(FeatureCollection { writer: Some(writer), count: 0 })
    }

    pub fn add(&mut self, feature: &serde_json::Value) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            if self.count > 0 {
                writer.write_separator()?;
            }
            writer.write_feature(feature)?;
            self.count += 1;
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /**
     * Closes the collection and hands back the underlying writer.
     */
    pub fn finish(mut self) -> Result<W> {
        let mut writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                let e = io::Error::new(io::ErrorKind::Other, "feature collection already closed");
                return Err(e.into());
            },
        };
        writer.write_closing()?;
        Ok(writer.into_inner())
    }
}


impl<W: Write> Drop for FeatureCollection<W> {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.write_closing() {
                error!("Unable to close feature collection: {}", e);
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::FeatureCollection;

    /// A Vec<u8> that stays readable after the collection owning it is dropped
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_framing() {
        let mut collection = FeatureCollection::open(Vec::new()).unwrap();
        collection.add(&json!({"a": 1})).unwrap();
        collection.add(&json!({"b": 2})).unwrap();
        assert_eq!(collection.count(), 2);
        let out = String::from_utf8(collection.finish().unwrap()).unwrap();
        assert_eq!(out, "{\"type\": \"FeatureCollection\", \"features\": [{\"a\":1}\n,\n{\"b\":2}]}\n");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_collection() {
        let collection = FeatureCollection::open(Vec::new()).unwrap();
        let out = String::from_utf8(collection.finish().unwrap()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(parsed["features"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_closed_on_drop() {
        let buffer = SharedBuffer::default();
        {
            let mut collection = FeatureCollection::open(buffer.clone()).unwrap();
            collection.add(&json!({"a": 1})).unwrap();
            // Dropped without finish, as on an error path
        }
        let out = buffer.text();
        assert!(out.ends_with("]}\n"));
        assert_eq!(out.matches("]}").count(), 1);
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }
}
