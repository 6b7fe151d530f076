use base::log::{self, LevelFilter, Log};
use base::{FileLogger, StdoutLogger};
use std::fs;

#[test]
fn test_stdout_logger_respects_level() {
    let logger = StdoutLogger::new(LevelFilter::Warn);
    let info = log::MetadataBuilder::new().level(log::Level::Info).build();
    let error = log::MetadataBuilder::new().level(log::Level::Error).build();
    assert!(!logger.enabled(&info));
    assert!(logger.enabled(&error));
    logger.flush();
}

#[test]
fn test_file_logger_writes_to_file() {
    let test_dir = std::env::temp_dir().join(format!("base-log-test-{}-write", std::process::id()));
    let _ = fs::remove_dir_all(&test_dir);

    let logger = FileLogger::new(&test_dir, LevelFilter::Info).expect("create logger");
    let record = log::RecordBuilder::new()
        .level(log::Level::Error)
        .target("test")
        .file(Some("test.rs"))
        .line(Some(100))
        .args(format_args!("model failed to load"))
        .build();
    logger.log(&record);
    logger.flush();

    let entries: Vec<_> = fs::read_dir(&test_dir)
        .expect("read log dir")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(entries.len(), 1);

    let content = fs::read_to_string(entries[0].path()).expect("read log file");
    assert!(content.contains("[ERROR]"));
    assert!(content.contains("test.rs:100"));
    assert!(content.contains("model failed to load"));

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn test_file_logger_drops_filtered_records() {
    let test_dir = std::env::temp_dir().join(format!("base-log-test-{}-filter", std::process::id()));
    let _ = fs::remove_dir_all(&test_dir);

    let logger = FileLogger::new(&test_dir, LevelFilter::Error).expect("create logger");
    let record = log::RecordBuilder::new()
        .level(log::Level::Debug)
        .args(format_args!("noise"))
        .build();
    logger.log(&record);
    logger.flush();

    let entries: Vec<_> = fs::read_dir(&test_dir)
        .expect("read log dir")
        .filter_map(|e| e.ok())
        .collect();
    let content = fs::read_to_string(entries[0].path()).expect("read log file");
    assert!(content.is_empty());

    fs::remove_dir_all(&test_dir).ok();
}
