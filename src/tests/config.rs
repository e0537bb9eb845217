//! Configuration tests
#[cfg(test)]
mod test {
    use crate::config::DEFAULT_CAPACITY;
    use crate::prelude::*;
    use crate::tests::RecordingSink;
    use std::thread;

    #[test]
    fn default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.capacity, DEFAULT_CAPACITY);
        assert!(cfg.flush_interval.is_none());

        let cfg = cfg
            .with_capacity(128)
            .with_flush_interval(Duration::from_millis(20));
        assert_eq!(cfg.capacity, 128);
        assert_eq!(cfg.flush_interval, Some(Duration::from_millis(20)));
    }
    #[test]
    fn writer_from_config() {
        let sink = RecordingSink::default();
        let writer = BufferedWriter::from_config(Config::default(), sink.clone()).unwrap();
        assert_eq!(writer.capacity(), DEFAULT_CAPACITY);
        assert!(!writer.is_flusher_running());

        let cfg = Config::default().with_capacity(0);
        assert!(matches!(
            BufferedWriter::from_config(cfg, sink.clone()),
            Err(Error::InvalidCapacity(0))
        ));
    }
    #[test]
    fn config_starts_flusher() {
        let sink = RecordingSink::default();
        let cfg = Config::default()
            .with_capacity(256)
            .with_flush_interval(Duration::from_millis(20));
        let writer = BufferedWriter::from_config(cfg, sink.clone()).unwrap();
        assert!(writer.is_flusher_running());

        writer.write(b"configured").unwrap();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(writer.len(), 0);
        assert_eq!(sink.data(), b"configured");
        writer.stop();
    }
}
