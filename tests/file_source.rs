//! Integration tests for reading single files and byte ranges of them.

mod common;

use common::*;
use ironbeam_source::testing::*;
use ironbeam_source::*;
use std::sync::Arc;

fn thousand_lines(dir: &TempDirPath) -> anyhow::Result<(String, Vec<String>)> {
    let lines = fixed_width_lines(1000);
    let path = dir.write_lines("file", &lines)?;
    Ok((path, lines))
}

#[test]
fn test_read_whole_file() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, lines) = thousand_lines(&dir)?;

    let source = lines_source(SourceDescriptor::for_file(&path, 1));
    assert_eq!(source.descriptor().mode(), Mode::SingleFile);
    assert_collections_equal(&read_source(&source)?, &lines);
    Ok(())
}

#[test]
fn test_read_range_in_middle() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, lines) = thousand_lines(&dir)?;

    // Line i starts at byte 4 * i: [502, 702) owns lines 126 (504) through 175 (700).
    let source = lines_source(subrange(&path, 502, 702)?);
    assert_collections_equal(&read_source(&source)?, &lines[126..176]);
    Ok(())
}

#[test]
fn test_read_range_at_beginning() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, lines) = thousand_lines(&dir)?;

    let source = lines_source(subrange(&path, 0, 102)?);
    assert_collections_equal(&read_source(&source)?, &lines[..26]);
    Ok(())
}

#[test]
fn test_read_range_to_end_of_file() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, lines) = thousand_lines(&dir)?;

    let source = lines_source(subrange(&path, 802, UNBOUNDED_END)?);
    assert_eq!(source.descriptor().mode(), Mode::SubrangeOfSingleFile);
    assert_collections_equal(&read_source(&source)?, &lines[201..]);
    Ok(())
}

#[test]
fn test_range_starting_exactly_on_record() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, lines) = thousand_lines(&dir)?;

    // Byte 503 is the delimiter ending line 125, so the record at 504 is kept.
    let on_boundary = lines_source(subrange(&path, 504, 604)?);
    assert_collections_equal(&read_source(&on_boundary)?, &lines[126..151]);

    // One byte later line 126 straddles the start and belongs to the previous range.
    let inside = lines_source(subrange(&path, 505, 604)?);
    assert_collections_equal(&read_source(&inside)?, &lines[127..151]);
    Ok(())
}

#[test]
fn test_adjacent_ranges_partition_records() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, lines) = thousand_lines(&dir)?;

    for cut in 500..=508 {
        let mut read = read_source(&lines_source(subrange(&path, 0, cut)?))?;
        read.extend(read_source(&lines_source(subrange(&path, cut, UNBOUNDED_END)?))?);
        assert_collections_equal(&read, &lines);
    }
    Ok(())
}

#[test]
fn test_empty_and_out_of_file_ranges() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, _) = thousand_lines(&dir)?;

    assert!(read_source(&lines_source(subrange(&path, 504, 504)?))?.is_empty());
    assert!(read_source(&lines_source(subrange(&path, 5000, 6000)?))?.is_empty());
    Ok(())
}

#[test]
fn test_offsets_and_split_points() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, lines) = thousand_lines(&dir)?;

    let source = lines_source(subrange(&path, 502, 702)?);
    let mut reader = source.create_reader();
    let records = drain_with_offsets(reader.as_mut())?;

    assert_eq!(records.len(), 50);
    for (k, record) in records.iter().enumerate() {
        let line = 126 + k;
        assert_eq!(record.value, lines[line]);
        assert_eq!(record.offset, line as u64 * LINE_BYTES);
        assert!(record.split_point);
    }
    Ok(())
}

#[test]
fn test_empty_file() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_bytes("empty", b"")?;

    let source = lines_source(SourceDescriptor::for_file(&path, 1));
    let mut reader = source.create_reader();
    assert!(!reader.start()?);
    assert!(!reader.advance()?);
    assert_eq!(source.estimated_size_bytes()?, 0);
    Ok(())
}

#[test]
fn test_last_record_without_delimiter() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_bytes("partial", b"aaa\nbbb\nccc")?;

    let source = lines_source(SourceDescriptor::for_file(&path, 1));
    assert_collections_equal(&read_source(&source)?, &["aaa", "bbb", "ccc"].map(String::from));

    let tail = lines_source(subrange(&path, 5, UNBOUNDED_END)?);
    assert_collections_equal(&read_source(&tail)?, &["ccc".to_string()]);
    Ok(())
}

#[test]
fn test_custom_delimiter_and_small_buffer() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_bytes("semi", b"alpha;beta;gamma;delta;")?;
    let options = ReadOptions::default().with_delimiter(b';').with_buffer_size(2);

    let whole = lines_source(SourceDescriptor::for_file(&path, 1)).with_options(options);
    assert_collections_equal(
        &read_source(&whole)?,
        &["alpha", "beta", "gamma", "delta"].map(String::from),
    );

    // "beta" starts at 6, "gamma" at 11.
    let middle = lines_source(subrange(&path, 7, 12)?).with_options(options);
    assert_collections_equal(&read_source(&middle)?, &["gamma".to_string()]);
    Ok(())
}

#[test]
fn test_bytes_decoder_keeps_raw_records() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_bytes("raw", b"\xff\x00\n\x01\n")?;

    let source = FileBasedSource::new(
        SourceDescriptor::for_file(&path, 1),
        RecordFormat::Delimited,
        BytesDecoder,
    );
    let read = read_source(&source)?;
    assert_eq!(read, vec![vec![0xff, 0x00], vec![0x01]]);
    Ok(())
}

#[test]
fn test_missing_file_is_not_found() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.pattern("does-not-exist.txt");

    let source = lines_source(SourceDescriptor::for_file(&path, 1));
    let err = source.create_reader().start().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(source.estimated_size_bytes().unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(source.split_into_shards(1024).unwrap_err().kind(), ErrorKind::NotFound);
    Ok(())
}

#[test]
fn test_accessors_before_start() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, _) = thousand_lines(&dir)?;

    let reader = lines_source(SourceDescriptor::for_file(&path, 1)).create_reader();
    assert_eq!(reader.current().unwrap_err().kind(), ErrorKind::IllegalState);
    assert_eq!(reader.current_offset().unwrap_err().kind(), ErrorKind::IllegalState);
    assert_eq!(reader.is_at_split_point().unwrap_err().kind(), ErrorKind::IllegalState);

    let mut reader = reader;
    assert_eq!(reader.advance().unwrap_err().kind(), ErrorKind::IllegalState);
    Ok(())
}

#[test]
fn test_start_twice_is_rejected() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, _) = thousand_lines(&dir)?;

    let mut reader = lines_source(SourceDescriptor::for_file(&path, 1)).create_reader();
    assert!(reader.start()?);
    assert_eq!(reader.start().unwrap_err().kind(), ErrorKind::IllegalState);
    Ok(())
}

#[test]
fn test_exhausted_reader_stays_exhausted() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, _) = thousand_lines(&dir)?;

    let mut reader = lines_source(subrange(&path, 0, 10)?).create_reader();
    assert!(reader.start()?);
    assert!(reader.advance()?);
    assert!(reader.advance()?);
    assert!(!reader.advance()?);
    assert!(!reader.advance()?);
    assert_eq!(reader.current().unwrap_err().kind(), ErrorKind::IllegalState);
    assert_eq!(reader.current_offset().unwrap_err().kind(), ErrorKind::IllegalState);
    Ok(())
}

#[test]
fn test_close_midway_releases_reader() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, _) = thousand_lines(&dir)?;

    let mut reader = lines_source(SourceDescriptor::for_file(&path, 1)).create_reader();
    assert!(reader.start()?);
    reader.close();
    reader.close();
    assert!(!reader.advance()?);
    assert_eq!(reader.current().unwrap_err().kind(), ErrorKind::IllegalState);
    Ok(())
}

#[test]
fn test_decode_failure_is_terminal() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_lines("numbers", &["1", "2", "x", "4"])?;

    let source = FileBasedSource::new(
        SourceDescriptor::for_file(&path, 1),
        RecordFormat::Delimited,
        JsonDecoder::<u32>::new(),
    );
    let mut reader = source.create_reader();
    assert!(reader.start()?);
    assert_eq!(*reader.current()?, 1);
    assert!(reader.advance()?);
    assert_eq!(*reader.current()?, 2);

    match reader.advance() {
        Err(SourceError::Decode { offset, .. }) => assert_eq!(offset, 4),
        other => panic!("expected decode error, got {other:?}"),
    }
    assert_eq!(reader.advance().unwrap_err().kind(), ErrorKind::IllegalState);
    assert_eq!(reader.current().unwrap_err().kind(), ErrorKind::IllegalState);
    Ok(())
}

#[test]
fn test_read_failure_is_terminal() -> anyhow::Result<()> {
    setup();
    let provider = InMemoryProvider::new("failing-mem");
    register_provider(Arc::new(provider.clone()));
    let lines = fixed_width_lines(100);
    provider.put_file("failing-mem://data", lines_to_bytes(&lines));
    // Lines 0..50 occupy exactly the first 200 bytes.
    provider.fail_reads_at("failing-mem://data", 200);

    let source = lines_source(SourceDescriptor::for_file("failing-mem://data", 1));
    let mut reader = source.create_reader();
    let mut read = Vec::new();
    let mut available = reader.start()?;
    let err = loop {
        if !available {
            panic!("reader finished without surfacing the read failure");
        }
        read.push(reader.current()?.clone());
        match reader.advance() {
            Ok(more) => available = more,
            Err(e) => break e,
        }
    };

    assert_eq!(err.kind(), ErrorKind::Io);
    assert_collections_equal(&read, &lines[..50]);
    assert_eq!(reader.advance().unwrap_err().kind(), ErrorKind::IllegalState);
    Ok(())
}

#[test]
fn test_reader_recreated_from_descriptor_repeats_output() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let (path, _) = thousand_lines(&dir)?;

    let descriptor = subrange(&path, 333, 777)?;
    let json = serde_json::to_string(&descriptor)?;
    let restored: SourceDescriptor = serde_json::from_str(&json)?;
    assert_eq!(restored, descriptor);

    let first = read_source(&lines_source(descriptor))?;
    let second = read_source(&lines_source(restored))?;
    assert_collections_equal(&first, &second);
    Ok(())
}
