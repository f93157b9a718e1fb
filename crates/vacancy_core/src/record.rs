use std::fmt;

/// Locations recognised in listing footers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Harare,
}

impl Location {
    pub const ALL: &'static [Location] = &[Location::Harare];

    pub fn name(self) -> &'static str {
        match self {
            Location::Harare => "Harare",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One job listing as extracted from the index page.
///
/// `location` and `expiry` are only populated by the detailed profile.
/// `expiry` holds the raw token; date coercion happens when the table is written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub location: Option<Location>,
    pub expiry: Option<String>,
    pub description: String,
    pub job_url: Option<String>,
}
