/// Output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    JobTitle,
    Company,
    Location,
    ExpiryDate,
    Description,
    JobUrl,
}

impl Column {
    pub fn header(self) -> &'static str {
        match self {
            Column::JobTitle => "Job Title",
            Column::Company => "Company",
            Column::Location => "Location",
            Column::ExpiryDate => "Expiry Date",
            Column::Description => "Description",
            Column::JobUrl => "Job URL",
        }
    }
}

/// Which variant of the pipeline is running.
///
/// `Basic` reads detail blocks only. `Detailed` pairs every detail block with
/// its footer and infers location and expiry date from the footer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionProfile {
    Basic,
    #[default]
    Detailed,
}

impl ExtractionProfile {
    /// Basic puts the link before the description; Detailed puts it last.
    pub fn columns(self) -> &'static [Column] {
        match self {
            ExtractionProfile::Basic => &[
                Column::JobTitle,
                Column::Company,
                Column::JobUrl,
                Column::Description,
            ],
            ExtractionProfile::Detailed => &[
                Column::JobTitle,
                Column::Company,
                Column::Location,
                Column::ExpiryDate,
                Column::Description,
                Column::JobUrl,
            ],
        }
    }

    pub fn reads_footers(self) -> bool {
        matches!(self, ExtractionProfile::Detailed)
    }

    pub fn default_output_filename(self) -> &'static str {
        match self {
            ExtractionProfile::Basic => "jobs.csv",
            ExtractionProfile::Detailed => "scraped_data.csv",
        }
    }
}
