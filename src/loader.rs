use crate::error::{ChartError, Result};
use crate::series::{SeriesKind, SeriesRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Source of a [`SeriesRecord`]. Providers do not check series lengths.
pub trait SeriesProvider {
    fn load(&self) -> Result<SeriesRecord>;

    /// Short description for log lines
    fn describe(&self) -> String;
}

/// The built-in Los Ríos dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticProvider;

impl SeriesProvider for StaticProvider {
    fn load(&self) -> Result<SeriesRecord> {
        Ok(SeriesRecord::los_rios())
    }

    fn describe(&self) -> String {
        "built-in Los Ríos dataset".to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Stdin,
    Path(PathBuf),
}

impl InputSource {
    fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
            InputSource::Path(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        }
    }

    fn describe(&self) -> String {
        match self {
            InputSource::Stdin => "stdin".to_string(),
            InputSource::Path(path) => path.display().to_string(),
        }
    }
}

/// CSV with a header row naming the year, total, male and female columns
#[derive(Debug, Clone)]
pub struct CsvProvider {
    source: InputSource,
}

impl CsvProvider {
    pub fn new(source: InputSource) -> Self {
        Self { source }
    }
}

impl SeriesProvider for CsvProvider {
    fn load(&self) -> Result<SeriesRecord> {
        parse_csv(self.source.open()?)
    }

    fn describe(&self) -> String {
        format!("CSV from {}", self.source.describe())
    }
}

/// JSON, either columnar (`{"years": [...], "total": [...], ...}`) or one
/// object per year (`[{"year": 2010, "total": 1.0, ...}, ...]`)
#[derive(Debug, Clone)]
pub struct JsonProvider {
    path: PathBuf,
}

impl JsonProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SeriesProvider for JsonProvider {
    fn load(&self) -> Result<SeriesRecord> {
        parse_json(BufReader::new(File::open(&self.path)?))
    }

    fn describe(&self) -> String {
        format!("JSON from {}", self.path.display())
    }
}

/// Pick a provider for a CLI input argument.
///
/// No input means the built-in dataset, `-` means CSV on stdin, and files are
/// chosen by extension (`.json` is JSON, anything else CSV).
pub fn provider_for(input: Option<&Path>) -> Box<dyn SeriesProvider> {
    match input {
        None => Box::new(StaticProvider),
        Some(path) if path == Path::new("-") => Box::new(CsvProvider::new(InputSource::Stdin)),
        Some(path) => {
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if is_json {
                Box::new(JsonProvider::new(path.to_path_buf()))
            } else {
                Box::new(CsvProvider::new(InputSource::Path(path.to_path_buf())))
            }
        }
    }
}

// === CSV ===

const YEAR_COLUMNS: [&str; 3] = ["year", "año", "ano"];

/// Header used by the Spanish INE extracts
fn spanish_column(kind: SeriesKind) -> &'static str {
    match kind {
        SeriesKind::Total => "ambos_sexos",
        SeriesKind::Male => "hombres",
        SeriesKind::Female => "mujeres",
    }
}

/// A series column may be named in English, in Spanish, or by its INE gender
/// code (`_T`, `M`, `F`) as in pivoted `DTI_CL_SEXO` exports
fn series_column(headers: &[String], kind: SeriesKind) -> Result<usize> {
    let code = kind.gender_code().to_lowercase();
    find_column(headers, &[kind.field_name(), spanish_column(kind), code.as_str()])
}

pub fn parse_csv<R: Read>(reader: R) -> Result<SeriesRecord> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect();

    let year_idx = find_column(&headers, &YEAR_COLUMNS)?;
    let total_idx = series_column(&headers, SeriesKind::Total)?;
    let male_idx = series_column(&headers, SeriesKind::Male)?;
    let female_idx = series_column(&headers, SeriesKind::Female)?;

    let mut record = SeriesRecord::default();

    for (row, result) in reader.records().enumerate() {
        let line = row + 2;
        let fields = result?;

        record.years.push(parse_cell(&fields, year_idx, line, "year")?);
        record.total.push(parse_cell(&fields, total_idx, line, "total")?);
        record.male.push(parse_cell(&fields, male_idx, line, "male")?);
        record.female.push(parse_cell(&fields, female_idx, line, "female")?);
    }

    warn_if_unordered(&record.years);
    Ok(record)
}

fn find_column(headers: &[String], names: &[&str]) -> Result<usize> {
    headers
        .iter()
        .position(|h| names.contains(&h.as_str()))
        .ok_or_else(|| {
            ChartError::Load(format!(
                "Missing column '{}'. Available columns: {}",
                names[0],
                headers.join(", ")
            ))
        })
}

fn parse_cell<T: std::str::FromStr>(
    fields: &csv::StringRecord,
    idx: usize,
    line: usize,
    column: &str,
) -> Result<T> {
    let raw = fields.get(idx).unwrap_or("");
    raw.parse::<T>().map_err(|_| {
        ChartError::Load(format!(
            "Line {}: cannot parse '{}' in column '{}' as a number",
            line, raw, column
        ))
    })
}

// === JSON ===

#[derive(Debug, Deserialize)]
struct JsonRow {
    #[serde(alias = "año")]
    year: i32,
    total: f64,
    male: f64,
    female: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonSeries {
    Columns(SeriesRecord),
    Rows(Vec<JsonRow>),
}

pub fn parse_json<R: Read>(reader: R) -> Result<SeriesRecord> {
    let parsed: JsonSeries = serde_json::from_reader(reader)
        .map_err(|e| ChartError::Load(format!("Unrecognised JSON series layout: {}", e)))?;

    let record = match parsed {
        JsonSeries::Columns(record) => record,
        JsonSeries::Rows(rows) => {
            let mut record = SeriesRecord::default();
            for row in rows {
                record.years.push(row.year);
                record.total.push(row.total);
                record.male.push(row.male);
                record.female.push(row.female);
            }
            record
        }
    };

    warn_if_unordered(&record.years);
    Ok(record)
}

fn warn_if_unordered(years: &[i32]) {
    if years.windows(2).any(|w| w[0] >= w[1]) {
        tracing::warn!("years are not strictly ascending; the chart will connect points in file order");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_static_provider_returns_sample() {
        assert_eq!(StaticProvider.load().unwrap(), SeriesRecord::los_rios());
    }

    #[test]
    fn test_parse_csv_english_headers() {
        let csv = "year,total,male,female\n2010,168.5,102.4,66.1\n2011,173.1,104.1,69.0\n";
        let record = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(record.years, vec![2010, 2011]);
        assert_eq!(record.total, vec![168.5, 173.1]);
        assert_eq!(record.male, vec![102.4, 104.1]);
        assert_eq!(record.female, vec![66.1, 69.0]);
    }

    #[test]
    fn test_parse_csv_spanish_headers_any_order() {
        let csv = "Mujeres, Año ,Hombres,Ambos_Sexos\n66.1,2010,102.4,168.5\n";
        let record = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(record.years, vec![2010]);
        assert_eq!(record.total, vec![168.5]);
        assert_eq!(record.female, vec![66.1]);
    }

    #[test]
    fn test_parse_csv_gender_code_headers() {
        let csv = "year,_T,M,F\n2010,168.5,102.4,66.1\n2011,173.1,104.1,69.0\n";
        let record = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(record.years, vec![2010, 2011]);
        assert_eq!(record.total, vec![168.5, 173.1]);
        assert_eq!(record.male, vec![102.4, 104.1]);
        assert_eq!(record.female, vec![66.1, 69.0]);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let csv = "year,total,male\n2010,1,1\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Missing column 'female'"));
    }

    #[test]
    fn test_parse_csv_bad_number() {
        let csv = "year,total,male,female\n2010,abc,1,1\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Line 2"));
        assert!(msg.contains("'abc'"));
    }

    #[test]
    fn test_parse_csv_header_only_is_empty_record() {
        let record = parse_csv("year,total,male,female\n".as_bytes()).unwrap();
        assert!(record.is_empty());
        assert!(record.total.is_empty());
    }

    #[test]
    fn test_parse_json_columns() {
        let json = r#"{"years": [2010, 2011], "total": [3, 4], "male": [1, 2], "female": [2]}"#;
        let record = parse_json(json.as_bytes()).unwrap();
        assert_eq!(record.years, vec![2010, 2011]);
        // Lengths are left for the validator
        assert_eq!(record.female.len(), 1);
    }

    #[test]
    fn test_parse_json_rows() {
        let json = r#"[{"year": 2010, "total": 3.0, "male": 1.0, "female": 2.0},
                       {"año": 2011, "total": 4.0, "male": 2.0, "female": 2.0}]"#;
        let record = parse_json(json.as_bytes()).unwrap();
        assert_eq!(record.years, vec![2010, 2011]);
        assert_eq!(record.total, vec![3.0, 4.0]);
    }

    #[test]
    fn test_parse_json_wrong_shape() {
        let err = parse_json(r#"{"rows": []}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ChartError::Load(_)));
    }

    #[test]
    fn test_provider_for_picks_by_extension() {
        assert_eq!(provider_for(None).describe(), "built-in Los Ríos dataset");
        assert_eq!(provider_for(Some(Path::new("-"))).describe(), "CSV from stdin");
        assert!(provider_for(Some(Path::new("data.JSON")))
            .describe()
            .starts_with("JSON"));
        assert!(provider_for(Some(Path::new("data.csv")))
            .describe()
            .starts_with("CSV"));
    }

    #[test]
    fn test_csv_provider_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "year,total,male,female").unwrap();
        writeln!(file, "2020,178.8,104.2,74.6").unwrap();

        let provider = CsvProvider::new(InputSource::Path(file.path().to_path_buf()));
        let record = provider.load().unwrap();
        assert_eq!(record.years, vec![2020]);
        assert_eq!(record.male, vec![104.2]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let provider = JsonProvider::new(PathBuf::from("/nonexistent/series.json"));
        assert!(matches!(provider.load().unwrap_err(), ChartError::Io(_)));
    }
}
