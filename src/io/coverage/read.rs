use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
};
use std::path::{
    Path,
    PathBuf,
};

use log::{
    debug,
    warn,
};

use crate::data_structs::typedef::CountType;
use crate::data_structs::MethylationRecord;
use crate::error::{
    DhunterError,
    Result,
};
use crate::tools::ingest::AbortHandle;

const N_FIELDS: usize = 5;

/// Parses one coverage line `position numC numNonC numMC numHMC`.
///
/// Returns `Ok(None)` for blank lines and for the position `0` sentinel.
pub fn parse_line(line: &str) -> std::result::Result<Option<MethylationRecord>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut fields = [0 as CountType; N_FIELDS];
    let mut n = 0;
    for token in line.split_whitespace() {
        if n == N_FIELDS {
            return Err(format!("expected {} fields, found more", N_FIELDS));
        }
        fields[n] = token
            .parse::<CountType>()
            .map_err(|e| format!("field {} ('{}'): {}", n + 1, token, e))?;
        n += 1;
    }
    if n != N_FIELDS {
        return Err(format!("expected {} fields, found {}", N_FIELDS, n));
    }

    let [position, c, non_c, mc, hmc] = fields;
    if position == 0 {
        return Ok(None);
    }
    Ok(Some(MethylationRecord::from_counts(position, c, non_c, mc, hmc)))
}

/// Records read from one strand file.
#[derive(Debug, Default)]
pub struct StrandRead {
    pub records:       Vec<MethylationRecord>,
    /// Reading stopped early because of an abort request.
    pub aborted:       bool,
    pub skipped_lines: usize,
}

/// Reads all records from a coverage stream.
///
/// Malformed lines are logged and skipped. The abort flag is polled once per
/// line; on abort the records read so far are returned.
pub fn read_records<R: BufRead>(
    mut reader: R,
    path: &Path,
    abort: &AbortHandle,
) -> StrandRead {
    let mut out = StrandRead::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        if abort.is_aborted() {
            debug!("Reading of {} aborted after line {}", path.display(), line_no);
            out.aborted = true;
            break;
        }
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => line_no += 1,
            Err(e) => {
                warn!(
                    "{}",
                    DhunterError::Ingestion {
                        path:   path.to_path_buf(),
                        source: e,
                    }
                );
                break;
            },
        }

        let parsed = std::str::from_utf8(&buf)
            .map_err(|e| format!("not valid UTF-8: {}", e))
            .and_then(parse_line);
        match parsed {
            Ok(Some(record)) => out.records.push(record),
            Ok(None) => {},
            Err(reason) => {
                out.skipped_lines += 1;
                warn!(
                    "{}",
                    DhunterError::Parse {
                        path: path.to_path_buf(),
                        line: line_no,
                        reason,
                    }
                );
            },
        }
    }
    out
}

/// Opens and reads one strand file.
pub fn read_coverage_file(
    path: &Path,
    abort: &AbortHandle,
) -> Result<StrandRead> {
    let file = File::open(path).map_err(|source| {
        DhunterError::Ingestion {
            path: PathBuf::from(path),
            source,
        }
    })?;
    let read = read_records(BufReader::new(file), path, abort);
    debug!(
        "Read {} records from {} ({} lines skipped)",
        read.records.len(),
        path.display(),
        read.skipped_lines
    );
    Ok(read)
}

#[cfg(test)]
mod tests {
    use std::io::{
        Cursor,
        Read,
    };

    use rstest::rstest;

    use super::*;

    #[test]
    fn test_parse_line_valid() {
        let record = parse_line("10 5 3 40 10").unwrap().unwrap();
        assert_eq!(record.position, 10);
        assert_eq!(record.count_c, 5);
        assert_eq!(record.count_non_c, 3);
        assert_eq!(record.count_mc, 40);
        assert_eq!(record.count_hmc, 10);
        assert_eq!(record.mc.coverage, 45);
    }

    #[test]
    fn test_parse_line_tabs_and_padding() {
        let record = parse_line("  7\t1  0\t1 0 \n").unwrap().unwrap();
        assert_eq!(record.position, 7);
        assert_eq!(record.mc.coverage, 2);
    }

    #[rstest]
    #[case::blank("")]
    #[case::whitespace("   \t ")]
    #[case::position_zero("0 5 5 5 5")]
    fn test_parse_line_ignored(#[case] line: &str) {
        assert_eq!(parse_line(line).unwrap(), None);
    }

    #[rstest]
    #[case::too_few("10 5 3 40")]
    #[case::too_many("10 5 3 40 1 2")]
    #[case::negative("10 -5 3 40 1")]
    #[case::text("10 five 3 40 1")]
    #[case::float("10 5.0 3 40 1")]
    fn test_parse_line_malformed(#[case] line: &str) {
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn test_read_records_skips_malformed() {
        let data = "10 5 3 40 10\nbroken line\n\n0 1 1 1 1\n11 8 2 20 30\n";
        let read = read_records(
            Cursor::new(data),
            Path::new("mem.csv"),
            &AbortHandle::default(),
        );
        assert_eq!(read.records.len(), 2);
        assert_eq!(read.skipped_lines, 1);
        assert!(!read.aborted);
        assert_eq!(read.records[1].position, 11);
    }

    /// Raises the abort flag once `limit` lines have been consumed.
    struct AbortAfter {
        inner:    Cursor<Vec<u8>>,
        abort:    AbortHandle,
        limit:    usize,
        consumed: usize,
    }

    impl Read for AbortAfter {
        fn read(
            &mut self,
            buf: &mut [u8],
        ) -> std::io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl BufRead for AbortAfter {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> { self.inner.fill_buf() }

        fn consume(
            &mut self,
            amt: usize,
        ) {
            let position = self.inner.position() as usize;
            self.consumed += self.inner.get_ref()[position..position + amt]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            if self.consumed >= self.limit {
                self.abort.abort();
            }
            self.inner.consume(amt);
        }
    }

    #[test]
    fn test_read_records_skips_invalid_utf8_line() {
        let data = b"10 1 0 1 0\n\xff\xfe 1 0 1 0\n11 1 0 1 0\n12 2 0 2 0\n".to_vec();
        let read = read_records(
            Cursor::new(data),
            Path::new("mem.csv"),
            &AbortHandle::default(),
        );
        assert_eq!(read.records.len(), 3);
        assert_eq!(read.skipped_lines, 1);
        assert_eq!(read.records[2].position, 12);
        assert!(!read.aborted);
    }

    #[test]
    fn test_read_records_already_aborted() {
        let abort = AbortHandle::default();
        abort.abort();
        let read = read_records(Cursor::new("10 5 3 40 10\n"), Path::new("mem.csv"), &abort);
        assert!(read.aborted);
        assert!(read.records.is_empty());
    }

    #[test]
    fn test_read_records_aborted_midway_keeps_read_records() {
        let abort = AbortHandle::default();
        let reader = AbortAfter {
            inner:    Cursor::new(b"10 1 0 1 0\n11 1 0 1 0\n12 1 0 1 0\n13 1 0 1 0\n".to_vec()),
            abort:    abort.clone(),
            limit:    2,
            consumed: 0,
        };
        let read = read_records(reader, Path::new("mem.csv"), &abort);
        assert!(read.aborted);
        assert_eq!(
            read.records.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![10, 11]
        );
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_coverage_file(
            Path::new("/definitely/not/here.csv"),
            &AbortHandle::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DhunterError::Ingestion { .. }));
    }
}
