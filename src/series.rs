use serde::{Deserialize, Serialize};

/// Workforce series for one region, aligned to a shared year axis.
///
/// Values are thousands of persons. The four vectors are expected to have the
/// same length, but nothing here enforces it: a record is allowed to be
/// malformed until it reaches [`crate::validate::validate_series`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesRecord {
    pub years: Vec<i32>,
    pub total: Vec<f64>,
    pub male: Vec<f64>,
    pub female: Vec<f64>,
}

/// One of the three plotted series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Total,
    Male,
    Female,
}

impl SeriesKind {
    /// Plot order: total first, then male, then female
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Total, SeriesKind::Male, SeriesKind::Female];

    /// Legend label used by the INE publications
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesKind::Total => "Ambos sexos",
            SeriesKind::Male => "Hombres",
            SeriesKind::Female => "Mujeres",
        }
    }

    /// INE gender code (`DTI_CL_SEXO`)
    pub fn gender_code(self) -> &'static str {
        match self {
            SeriesKind::Total => "_T",
            SeriesKind::Male => "M",
            SeriesKind::Female => "F",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            SeriesKind::Total => "total",
            SeriesKind::Male => "male",
            SeriesKind::Female => "female",
        }
    }
}

impl SeriesRecord {
    pub fn new(years: Vec<i32>, total: Vec<f64>, male: Vec<f64>, female: Vec<f64>) -> Self {
        Self {
            years,
            total,
            male,
            female,
        }
    }

    /// Labour force of the Región de Los Ríos (CHL14), annual figures 2010-2024
    pub fn los_rios() -> Self {
        Self {
            years: (2010..=2024).collect(),
            total: vec![
                168.5, 173.1, 176.2, 179.1, 181.7, 184.0, 186.8, 188.9, 191.8, 194.2, 178.8,
                186.7, 193.0, 196.9, 199.4,
            ],
            male: vec![
                102.4, 104.1, 105.0, 106.3, 107.2, 108.0, 108.9, 109.6, 110.8, 111.5, 104.2,
                107.9, 110.6, 112.0, 113.1,
            ],
            female: vec![
                66.1, 69.0, 71.2, 72.8, 74.5, 76.0, 77.9, 79.3, 81.0, 82.7, 74.6, 78.8, 82.4,
                84.9, 86.3,
            ],
        }
    }

    pub fn values(&self, kind: SeriesKind) -> &[f64] {
        match kind {
            SeriesKind::Total => &self.total,
            SeriesKind::Male => &self.male,
            SeriesKind::Female => &self.female,
        }
    }

    /// Number of points on the year axis
    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
