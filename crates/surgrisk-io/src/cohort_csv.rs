//! Cohort dataset CSV: one row per case, fixed column order.

use std::fs::File;
use std::path::{Path, PathBuf};

use surgrisk_cohort::{AsaClass, Case, Cohort, ProcedureType};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Dataset columns in file order.
pub const COLUMNS: [&str; 8] = [
    "Age",
    "BMI",
    "ASA_Class",
    "Procedure_Type",
    "Surgery_Duration_Minutes",
    "Estimated_Blood_Loss",
    "Intraoperative_Events",
    "Complication_30d",
];

/// Writes a [`Cohort`] as CSV.
///
/// Numbers are plain decimal text, booleans are `0`/`1`, the ASA class is its
/// numeric code and the procedure is its label.
pub struct CohortWriter {
    path: PathBuf,
}

impl CohortWriter {
    /// Create a writer targeting `path`. The file is created on [`write`](Self::write).
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write the header and one row per case, replacing any existing file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteFile`] | File cannot be created or flushed |
    /// | [`IoError::WriteCsv`] | A record cannot be written |
    #[instrument(skip_all, fields(path = %self.path.display(), n_cases = cohort.len()))]
    pub fn write(&self, cohort: &Cohort) -> Result<(), IoError> {
        let file = File::create(&self.path).map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;
        let mut wtr = csv::Writer::from_writer(file);

        let csv_err = |e| IoError::WriteCsv {
            path: self.path.clone(),
            source: e,
        };
        wtr.write_record(COLUMNS).map_err(csv_err)?;
        for case in cohort.cases() {
            wtr.write_record(encode(case)).map_err(csv_err)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;

        info!("cohort written");
        Ok(())
    }
}

fn encode(case: &Case) -> [String; 8] {
    let flag = |b: bool| if b { "1" } else { "0" }.to_string();
    [
        case.age.to_string(),
        case.bmi.to_string(),
        case.asa_class.code().to_string(),
        case.procedure_type.label().to_string(),
        case.surgery_duration_minutes.to_string(),
        case.estimated_blood_loss_ml.to_string(),
        flag(case.intraoperative_event),
        flag(case.complication_30d),
    ]
}

/// Reads a cohort CSV written by [`CohortWriter`] or by an external tool
/// producing the same columns.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::InvalidHeader`] | Header differs from [`COLUMNS`] |
/// | [`IoError::InconsistentRowLength`] | Row has a different column count than the header |
/// | [`IoError::InvalidValue`] | Unparseable number, non-finite value, ASA code outside 1..=5, unknown procedure, flag other than 0/1 |
/// | [`IoError::EmptyDataset`] | Zero data rows after the header |
pub struct CohortReader {
    path: PathBuf,
}

impl CohortReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the file, returning cases in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Cohort, IoError> {
        let file = File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so a short row surfaces as InconsistentRowLength.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?;
        if header.iter().ne(COLUMNS) {
            return Err(IoError::InvalidHeader {
                path: self.path.clone(),
                expected: COLUMNS.join(","),
                found: header.iter().collect::<Vec<_>>().join(","),
            });
        }
        debug!("header validated");

        let mut cases = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() != COLUMNS.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: COLUMNS.len(),
                    got: record.len(),
                });
            }
            let row = Row {
                path: &self.path,
                row_index,
                record: &record,
            };
            cases.push(row.decode()?);
        }

        if cases.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let cohort = Cohort::new(cases);
        info!(
            n_cases = cohort.len(),
            n_complications = cohort.n_complications(),
            "cohort loaded"
        );
        Ok(cohort)
    }

    fn parse_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// One data record plus the context needed for error reporting.
struct Row<'a> {
    path: &'a Path,
    row_index: usize,
    record: &'a csv::StringRecord,
}

impl Row<'_> {
    fn decode(&self) -> Result<Case, IoError> {
        let asa_code: u8 = self.parse(2, "integer ASA code")?;
        let asa_class = AsaClass::from_code(asa_code)
            .ok_or_else(|| self.invalid(2, "ASA code must be 1..=5"))?;
        let procedure_type: ProcedureType = self
            .raw(3)
            .parse()
            .map_err(|_| self.invalid(3, "unknown procedure label"))?;

        Ok(Case {
            age: self.parse(0, "non-negative integer")?,
            bmi: self.finite(1)?,
            asa_class,
            procedure_type,
            surgery_duration_minutes: self.parse(4, "non-negative integer")?,
            estimated_blood_loss_ml: self.finite(5)?,
            intraoperative_event: self.flag(6)?,
            complication_30d: self.flag(7)?,
        })
    }

    fn raw(&self, col: usize) -> &str {
        self.record.get(col).unwrap_or("")
    }

    fn invalid(&self, col: usize, reason: &'static str) -> IoError {
        IoError::InvalidValue {
            path: self.path.to_path_buf(),
            row_index: self.row_index,
            column: COLUMNS[col],
            raw: self.raw(col).to_string(),
            reason,
        }
    }

    fn parse<T: std::str::FromStr>(&self, col: usize, reason: &'static str) -> Result<T, IoError> {
        self.raw(col).parse().map_err(|_| self.invalid(col, reason))
    }

    fn finite(&self, col: usize) -> Result<f64, IoError> {
        let value: f64 = self.parse(col, "finite number")?;
        if !value.is_finite() {
            return Err(self.invalid(col, "finite number"));
        }
        Ok(value)
    }

    fn flag(&self, col: usize) -> Result<bool, IoError> {
        match self.raw(col) {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(self.invalid(col, "flag must be 0 or 1")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Age,BMI,ASA_Class,Procedure_Type,Surgery_Duration_Minutes,Estimated_Blood_Loss,Intraoperative_Events,Complication_30d\n";

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    fn with_rows(rows: &[&str]) -> NamedTempFile {
        let mut content = HEADER.to_string();
        for row in rows {
            content.push_str(row);
            content.push('\n');
        }
        write_csv(&content)
    }

    fn sample_case() -> Case {
        Case {
            age: 67,
            bmi: 31.4,
            asa_class: AsaClass::III,
            procedure_type: ProcedureType::HerniaRepair,
            surgery_duration_minutes: 142,
            estimated_blood_loss_ml: 250.0,
            intraoperative_event: true,
            complication_30d: false,
        }
    }

    #[test]
    fn encodes_flags_and_labels() {
        let row = encode(&sample_case());
        assert_eq!(row, ["67", "31.4", "3", "Hernia Repair", "142", "250", "1", "0"]);
    }

    #[test]
    fn writer_then_reader_preserves_cases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cohort.csv");
        let mut second = sample_case();
        second.procedure_type = ProcedureType::LapChole;
        second.complication_30d = true;
        let cohort = Cohort::new(vec![sample_case(), second]);

        CohortWriter::new(&path).write(&cohort).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(HEADER));

        let loaded = CohortReader::new(&path).read().unwrap();
        assert_eq!(loaded.cases(), cohort.cases());
    }

    #[test]
    fn reads_padded_cells() {
        let f = with_rows(&["45 , 22.5, 2, Colectomy ,90,120,0,1"]);
        let cohort = CohortReader::new(f.path()).read().unwrap();
        let case = &cohort.cases()[0];
        assert_eq!(case.procedure_type, ProcedureType::Colectomy);
        assert!(case.complication_30d);
    }

    #[test]
    fn missing_file() {
        let err = CohortReader::new(Path::new("/nonexistent/cohort.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_header() {
        let f = write_csv("age,bmi\n40,22.0\n");
        let err = CohortReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidHeader { .. }));
    }

    #[test]
    fn header_only_is_empty() {
        let f = with_rows(&[]);
        let err = CohortReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn short_row() {
        let f = with_rows(&["40,22.0,2,Colectomy,90,120,0,0", "40,22.0,2"]);
        let err = CohortReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InconsistentRowLength {
                row_index: 1,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn asa_code_out_of_range() {
        let f = with_rows(&["40,22.0,6,Colectomy,90,120,0,0"]);
        let err = CohortReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidValue {
                column: "ASA_Class",
                row_index: 0,
                ..
            }
        ));
    }

    #[test]
    fn unknown_procedure() {
        let f = with_rows(&["40,22.0,2,Whipple,90,120,0,0"]);
        let err = CohortReader::new(f.path()).read().unwrap_err();
        match err {
            IoError::InvalidValue { column, raw, .. } => {
                assert_eq!(column, "Procedure_Type");
                assert_eq!(raw, "Whipple");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_number() {
        let f = with_rows(&["40,NaN,2,Colectomy,90,120,0,0"]);
        let err = CohortReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidValue { column: "BMI", .. }));

        let f = with_rows(&["40,22.0,2,Colectomy,90,inf,0,0"]);
        let err = CohortReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidValue {
                column: "Estimated_Blood_Loss",
                ..
            }
        ));
    }

    #[test]
    fn flag_must_be_binary() {
        let f = with_rows(&["40,22.0,2,Colectomy,90,120,yes,0"]);
        let err = CohortReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidValue {
                column: "Intraoperative_Events",
                ..
            }
        ));
    }
}
