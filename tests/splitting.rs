//! Integration tests for shard planning and dynamic splitting.

mod common;

use common::*;
use ironbeam_source::testing::*;
use ironbeam_source::*;

fn assert_contiguous(shards: &[FileBasedSource<Utf8Decoder>], start: u64, end: u64) {
    let mut expected_start = start;
    for shard in shards {
        let d = shard.descriptor();
        assert_eq!(d.mode(), Mode::SubrangeOfSingleFile);
        assert_eq!(d.start_offset(), expected_start);
        assert!(d.end_offset() > d.start_offset());
        expected_start = d.end_offset();
    }
    assert_eq!(expected_start, end);
}

#[test]
fn test_split_single_file_into_shards() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let lines = fixed_width_lines(10_000);
    let path = dir.write_lines("file", &lines)?;

    let source = lines_source(SourceDescriptor::for_file(&path, 1));
    let shards = source.split_into_shards(4096)?;
    assert_eq!(shards.len(), 10);
    assert_contiguous(&shards, 0, 40_000);
    assert_collections_equal(&read_shards(&shards)?, &lines);
    Ok(())
}

#[test]
fn test_split_pattern_into_shards() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let lines = fixed_width_lines(10_000);
    for name in ["file1", "file2", "file3"] {
        dir.write_lines(name, &lines)?;
    }

    let source = lines_source(SourceDescriptor::for_pattern(dir.pattern("file*"), 1));
    let shards = source.split_into_shards(4096)?;
    assert_eq!(shards.len(), 30);

    // Shards are grouped by file in match order, ascending within each file.
    for (i, chunk) in shards.chunks(10).enumerate() {
        let file = chunk[0].descriptor().path_or_pattern().to_string();
        assert!(file.ends_with(&format!("file{}", i + 1)));
        assert!(chunk.iter().all(|s| s.descriptor().path_or_pattern() == file));
        assert_contiguous(chunk, 0, 40_000);
    }

    let expected: Vec<String> = lines.iter().chain(&lines).chain(&lines).cloned().collect();
    assert_collections_unordered_equal(&read_shards(&shards)?, &expected);
    Ok(())
}

#[test]
fn test_shards_cover_every_record_once() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let lines = fixed_width_lines(1000);
    let path = dir.write_lines("file", &lines)?;
    let source = lines_source(SourceDescriptor::for_file(&path, 1));

    for desired in [3, 7, 100, 1000, 1001, 4096, 100_000] {
        let shards = source.split_into_shards(desired)?;
        assert_contiguous(&shards, 0, 4000);
        assert_collections_equal(&read_shards(&shards)?, &lines);
    }
    Ok(())
}

#[test]
fn test_shard_sizes_add_up() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_lines("file", &fixed_width_lines(1000))?;
    let source = lines_source(SourceDescriptor::for_file(&path, 1));

    let shards = source.split_into_shards(333)?;
    let total: u64 = shards
        .iter()
        .map(FileBasedSource::estimated_size_bytes)
        .sum::<Result<u64>>()?;
    assert_eq!(total, source.estimated_size_bytes()?);
    assert_eq!(total, 4000);
    Ok(())
}

#[test]
fn test_min_shard_size_keeps_small_file_whole() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let lines = fixed_width_lines(1000);
    let path = dir.write_lines("file", &lines)?;

    let source = lines_source(SourceDescriptor::for_file(&path, 10_000));
    let shards = source.split_into_shards(100)?;
    assert_eq!(shards.len(), 1);
    assert_contiguous(&shards, 0, 4000);
    assert_collections_equal(&read_shards(&shards)?, &lines);
    Ok(())
}

#[test]
fn test_split_subrange_stays_inside_range() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_lines("file", &fixed_width_lines(1000))?;

    let source = lines_source(subrange(&path, 1001, 3003)?);
    let shards = source.split_into_shards(500)?;
    assert_eq!(shards.len(), 4);
    assert_contiguous(&shards, 1001, 3003);
    assert_collections_equal(&read_shards(&shards)?, &read_source(&source)?);

    // An open-ended range is clipped to the file size.
    let tail = lines_source(subrange(&path, 3000, UNBOUNDED_END)?);
    let shards = tail.split_into_shards(500)?;
    assert_eq!(shards.len(), 2);
    assert_contiguous(&shards, 3000, 4000);
    Ok(())
}

#[test]
fn test_empty_inputs_produce_no_shards() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_bytes("empty", b"")?;

    let empty = lines_source(SourceDescriptor::for_file(&path, 1));
    assert!(empty.split_into_shards(1024)?.is_empty());

    let nothing = lines_source(SourceDescriptor::for_pattern(dir.pattern("nomatch*"), 1));
    assert!(nothing.split_into_shards(1024)?.is_empty());
    assert_eq!(nothing.estimated_size_bytes()?, 0);
    assert!(read_source(&nothing)?.is_empty());
    Ok(())
}

#[test]
fn test_split_after_record_hands_off_remainder() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let lines = fixed_width_lines(1000);
    let path = dir.write_lines("file", &lines)?;
    let source = lines_source(subrange(&path, 0, 4000)?);

    let mut reader = source.create_reader();
    let mut consumed = Vec::new();
    let mut available = reader.start()?;
    while available && consumed.len() < 101 {
        consumed.push(reader.current()?.clone());
        available = reader.advance()?;
    }
    assert!(reader.is_at_split_point()?);
    let last_offset = 100 * LINE_BYTES;

    let (primary, residual) = source.split_after_record(last_offset)?;
    assert_eq!(primary.descriptor().end_offset(), last_offset + 1);
    assert_eq!(residual.descriptor().start_offset(), last_offset + 1);

    assert_collections_equal(&read_source(&primary)?, &lines[..=100]);
    assert_collections_equal(&consumed, &lines[..=100]);
    assert_collections_equal(&read_source(&residual)?, &lines[101..]);
    Ok(())
}

#[test]
fn test_split_after_last_byte_is_rejected() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let path = dir.write_lines("file", &fixed_width_lines(10))?;

    let source = lines_source(subrange(&path, 0, 40)?);
    assert_eq!(
        source.split_after_record(39).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );

    let pattern = lines_source(SourceDescriptor::for_pattern(dir.pattern("*"), 1));
    assert_eq!(
        pattern.split_after_record(0).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_compressed_file_is_one_shard() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let lines = fixed_width_lines(5000);
    let path = dir.write_gzip_lines("data.txt.gz", &lines)?;

    let source = lines_source(SourceDescriptor::for_file(&path, 1));
    let shards = source.split_into_shards(64)?;
    assert_eq!(shards.len(), 1);
    assert_eq!(shards[0].descriptor().mode(), Mode::SingleFile);
    assert_collections_equal(&read_shards(&shards)?, &lines);

    let ranged = lines_source(subrange(&path, 0, 64)?);
    assert_eq!(
        ranged.split_into_shards(64).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
    assert_eq!(
        ranged.create_reader().start().unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_compressed_shard_rejects_split_after_record() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let lines = fixed_width_lines(100);
    let path = dir.write_gzip_lines("d.txt.gz", &lines)?;

    let shards = lines_source(SourceDescriptor::for_file(&path, 1)).split_into_shards(64)?;
    assert_eq!(shards.len(), 1);
    assert_eq!(
        shards[0].split_after_record(40).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
    // The shard is untouched and still reads in full.
    assert_collections_equal(&read_shards(&shards)?, &lines);
    Ok(())
}

#[cfg(feature = "compression-gzip")]
#[test]
fn test_pattern_mixes_plain_and_compressed_files() -> anyhow::Result<()> {
    setup();
    let dir = TempDirPath::new()?;
    let plain = fixed_width_lines_from(0, 1000);
    let packed = fixed_width_lines_from(1000, 1000);
    dir.write_lines("part-0.txt", &plain)?;
    dir.write_gzip_lines("part-1.txt.gz", &packed)?;

    let source = lines_source(SourceDescriptor::for_pattern(dir.pattern("part-*"), 1));
    let shards = source.split_into_shards(1000)?;
    assert_eq!(shards.len(), 5);

    let expected: Vec<String> = plain.iter().chain(&packed).cloned().collect();
    assert_collections_equal(&read_shards(&shards)?, &expected);
    assert_collections_equal(&read_source(&source)?, &expected);
    Ok(())
}
