//! Tab-separated metadata index over a folder of certificate files.

pub mod walk;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::cert::Certificate;
use crate::config::default::INDEX_FILE_NAME;
use crate::time::format_date;
use walk::CertFileWalk;

pub const INDEX_HEADER: [&str; 10] = [
    "SerialNumber",
    "Hash",
    "NotBefore",
    "NotAfter",
    "Length",
    "Domain",
    "Name",
    "Email",
    "Issuer",
    "Subject",
];

/// One index line. Field names double as the header columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexRow {
    pub serial_number: String,
    pub hash: String,
    pub not_before: String,
    pub not_after: String,
    pub length: usize,
    pub domain: String,
    pub name: String,
    pub email: String,
    pub issuer: String,
    pub subject: String,
}

impl From<&Certificate> for IndexRow {
    fn from(cert: &Certificate) -> Self {
        IndexRow {
            serial_number: cert.serial.clone(),
            hash: cert.hash.clone(),
            not_before: format_date(cert.not_before),
            not_after: format_date(cert.not_after),
            length: cert.key_length,
            domain: cert.domain().unwrap_or_default().to_string(),
            name: cert.name.clone(),
            email: cert.email.clone().unwrap_or_default(),
            issuer: cert.issuer.clone(),
            subject: cert.subject.clone(),
        }
    }
}

/// Streams tab-separated rows to an underlying writer, header first.
///
/// Fields containing a tab, a quote or a line break are quoted.
pub struct IndexWriter<W: Write> {
    out: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> IndexWriter<W> {
    pub fn new(out: W) -> csv::Result<Self> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(out);
        // written up front so an empty folder still gets a header line
        out.write_record(INDEX_HEADER)?;
        Ok(IndexWriter { out, rows: 0 })
    }
    pub fn write_row(&mut self, row: &IndexRow) -> csv::Result<()> {
        self.out.serialize(row)?;
        self.rows += 1;
        Ok(())
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn finish(mut self) -> csv::Result<W> {
        self.out.flush()?;
        self.out
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

/// Counters of an index build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSummary {
    pub index_path: PathBuf,
    pub files: usize,
    pub rows: usize,
    pub unparsable: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Walk `root` and write `<root>/index.csv`. Files that do not parse are
/// logged and left out; filesystem errors abort the build.
pub fn build_index(root: &Path, progress: bool) -> Result<IndexSummary> {
    let start = Instant::now();
    let index_path = root.join(INDEX_FILE_NAME);
    let file = File::create(&index_path)?;
    let mut writer = IndexWriter::new(file)?;
    let mut summary = IndexSummary {
        index_path: index_path.clone(),
        ..Default::default()
    };

    let header_span = tracing::info_span!("build_index");
    if progress {
        header_span.pb_set_style(&crate::output::progress::get_counter_style());
        header_span.pb_set_message(&format!("Indexing {}", root.display()));
        header_span.pb_start();
    }

    for path in CertFileWalk::new(root) {
        let path = path?;
        summary.files += 1;
        let bytes = std::fs::read(&path)?;
        match Certificate::from_bytes(&bytes) {
            Ok(cert) => writer.write_row(&IndexRow::from(&cert))?,
            Err(e) => {
                tracing::error!("{}: {}", path.display(), e);
                summary.unparsable.push(path);
            }
        }
        if progress {
            header_span.pb_inc(1);
        }
    }

    summary.rows = writer.rows();
    writer.finish()?;
    drop(header_span);
    summary.elapsed = start.elapsed();
    tracing::info!(
        "Indexed {} certificate(s) into {}",
        summary.rows,
        index_path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::tests::{EC_P256_PEM, RSA1024_EMAIL_PEM, RSA2048_EMAIL_DER};
    use std::fs;
    use std::io::Read;

    /// Read an index back, header included.
    fn read_index<R: Read>(input: R) -> csv::Result<Vec<IndexRow>> {
        csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(input)
            .deserialize()
            .collect()
    }

    #[test]
    fn builds_header_plus_one_row_per_certificate() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("0001")).unwrap();
        fs::write(root.join("rsa.crt"), RSA2048_EMAIL_DER).unwrap();
        fs::write(root.join("0001").join("ec.PEM"), EC_P256_PEM).unwrap();
        fs::write(root.join("0001").join("small.cer"), RSA1024_EMAIL_PEM).unwrap();
        fs::write(root.join("readme.txt"), b"ignored").unwrap();

        let summary = build_index(root, false).unwrap();
        assert_eq!(summary.files, 3);
        assert_eq!(summary.rows, 3);

        let text = fs::read_to_string(root.join("index.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "SerialNumber\tHash\tNotBefore\tNotAfter\tLength\tDomain\tName\tEmail\tIssuer\tSubject"
        );
        let issuer = "CN=Test Qualified CA, O=Test Qualified CA, C=CZ";
        assert_eq!(
            lines[1].split('\t').collect::<Vec<_>>(),
            vec![
                "0x0A1B2C3D",
                "E469832D091EE88C1C40E95F7AB19158E910604A",
                "2017-03-15",
                "2018-03-15",
                "2048",
                "example.cz",
                "Jan Novak",
                "jan.novak@example.cz",
                issuer,
                "E=jan.novak@example.cz, CN=Jan Novak, O=Example s.r.o., C=CZ",
            ]
        );
        assert_eq!(
            lines[2].split('\t').collect::<Vec<_>>(),
            vec![
                "0x00FF10",
                "1B2771D8E9005822B47934E475ABA25E2E99CF23",
                "2019-06-01",
                "2021-06-01",
                "256",
                "",
                "Eva Svobodova",
                "",
                issuer,
                "CN=Eva Svobodova, O=Example s.r.o., C=CZ",
            ]
        );
        assert_eq!(
            lines[3].split('\t').collect::<Vec<_>>(),
            vec![
                "0x7F",
                "295DE39A7969C88E82FC997757FDB1F4B1C95A38",
                "2020-02-29",
                "2022-02-28",
                "1024",
                "mail.example.org",
                "Petr Dvorak",
                "petr@mail.example.org",
                issuer,
                "E=petr@mail.example.org, CN=Petr Dvorak, C=CZ",
            ]
        );
    }

    #[test]
    fn unparsable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.crt"), b"garbage").unwrap();
        fs::write(dir.path().join("ok.crt"), RSA2048_EMAIL_DER).unwrap();

        let summary = build_index(dir.path(), false).unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.unparsable, vec![dir.path().join("broken.crt")]);

        let text = fs::read_to_string(dir.path().join("index.csv")).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn special_characters_survive_a_round_trip() {
        let row = IndexRow {
            serial_number: "0x01".into(),
            hash: "AB".into(),
            not_before: "2020-01-01".into(),
            not_after: "2021-01-01".into(),
            length: 2048,
            domain: String::new(),
            name: "Novak\tJan".into(),
            email: String::new(),
            issuer: "CN=\"Quoted\" CA\nsecond line".into(),
            subject: "CN=c".into(),
        };
        let mut writer = IndexWriter::new(Vec::new()).unwrap();
        writer.write_row(&row).unwrap();
        assert_eq!(writer.rows(), 1);
        let bytes = writer.finish().unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with(&format!("{}\n", INDEX_HEADER.join("\t"))));
        assert_eq!(read_index(bytes.as_slice()).unwrap(), vec![row]);
    }

    #[test]
    fn header_matches_row_field_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.crt"), RSA2048_EMAIL_DER).unwrap();
        build_index(dir.path(), false).unwrap();

        // deserialization goes by header name, so a mismatch fails here
        let file = fs::File::open(dir.path().join("index.csv")).unwrap();
        let rows = read_index(file).unwrap();
        let cert = Certificate::from_bytes(RSA2048_EMAIL_DER).unwrap();
        assert_eq!(rows, vec![IndexRow::from(&cert)]);
    }

    #[test]
    fn empty_folder_gets_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let summary = build_index(dir.path(), false).unwrap();
        assert_eq!(summary.rows, 0);
        let text = fs::read_to_string(dir.path().join("index.csv")).unwrap();
        assert_eq!(text, format!("{}\n", INDEX_HEADER.join("\t")));
    }
}
