//! Airport directory for search autocompletion
//!
//! Loaded from an OurAirports-style CSV. Columns are located by header name,
//! so extra or reordered columns are fine.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// An airport with an IATA code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
}

impl Airport {
    fn new(code: &str, name: &str, city: &str, country: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: country.to_string(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.code, &self.name, &self.city, &self.country]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// French display names by ISO country code
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("AE", "Émirats arabes unis"),
    ("AR", "Argentine"),
    ("AT", "Autriche"),
    ("AU", "Australie"),
    ("BE", "Belgique"),
    ("BG", "Bulgarie"),
    ("BR", "Brésil"),
    ("CA", "Canada"),
    ("CH", "Suisse"),
    ("CL", "Chili"),
    ("CN", "Chine"),
    ("CO", "Colombie"),
    ("CZ", "République tchèque"),
    ("DE", "Allemagne"),
    ("DK", "Danemark"),
    ("EG", "Égypte"),
    ("ES", "Espagne"),
    ("FI", "Finlande"),
    ("FR", "France"),
    ("GB", "Royaume-Uni"),
    ("GR", "Grèce"),
    ("HR", "Croatie"),
    ("HU", "Hongrie"),
    ("ID", "Indonésie"),
    ("IE", "Irlande"),
    ("IL", "Israël"),
    ("IN", "Inde"),
    ("IT", "Italie"),
    ("JO", "Jordanie"),
    ("JP", "Japon"),
    ("LB", "Liban"),
    ("MA", "Maroc"),
    ("MX", "Mexique"),
    ("MY", "Malaisie"),
    ("NL", "Pays-Bas"),
    ("NO", "Norvège"),
    ("NZ", "Nouvelle-Zélande"),
    ("PE", "Pérou"),
    ("PH", "Philippines"),
    ("PL", "Pologne"),
    ("PT", "Portugal"),
    ("RO", "Roumanie"),
    ("SA", "Arabie saoudite"),
    ("SE", "Suède"),
    ("SG", "Singapour"),
    ("SI", "Slovénie"),
    ("SK", "Slovaquie"),
    ("TH", "Thaïlande"),
    ("TR", "Turquie"),
    ("US", "États-Unis"),
    ("VN", "Vietnam"),
    ("ZA", "Afrique du Sud"),
];

fn country_name(iso: &str) -> &str {
    COUNTRY_NAMES
        .iter()
        .find(|(code, _)| *code == iso)
        .map(|(_, name)| *name)
        .unwrap_or(iso)
}

/// Split CSV content into records of trimmed fields.
///
/// Quoted fields may hold commas, newlines and `""` for a literal quote.
fn parse_csv(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field).trim().to_string()),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field).trim().to_string());
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field.trim().to_string());
        records.push(record);
    }
    records
}

/// Known airports, sorted by code
#[derive(Debug, Clone)]
pub struct AirportDirectory {
    airports: Vec<Airport>,
}

impl AirportDirectory {
    /// Parse CSV content. Rows without a 3-letter IATA code are skipped.
    pub fn parse(content: &str) -> Self {
        let mut records = parse_csv(content).into_iter();
        let Some(headers) = records.next() else {
            return Self { airports: vec![] };
        };
        let column = |name: &str| headers.iter().position(|h| h == name);
        let (Some(iata), name, city, country) = (
            column("iata_code"),
            column("name"),
            column("municipality"),
            column("iso_country"),
        ) else {
            log::warn!("Airport CSV has no iata_code column");
            return Self { airports: vec![] };
        };

        let mut airports: Vec<Airport> = records
            .filter(|values| values.iter().any(|v| !v.is_empty()))
            .filter_map(|values| {
                let get = |idx: Option<usize>| {
                    idx.and_then(|i| values.get(i))
                        .filter(|v| !v.is_empty())
                        .map(String::as_str)
                };
                let code = get(Some(iata))?;
                if code.chars().count() != 3 {
                    return None;
                }
                Some(Airport::new(
                    code,
                    get(name).unwrap_or("N/A"),
                    get(city).unwrap_or("N/A"),
                    country_name(get(country).unwrap_or("")),
                ))
            })
            .collect();

        airports.sort_by(|a, b| a.code.cmp(&b.code));
        Self { airports }
    }

    /// Load from `path`, or the built-in list when the file does not exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => {
                let content = std::fs::read_to_string(p)?;
                let directory = Self::parse(&content);
                log::debug!("Loaded {} airports from {}", directory.len(), p.display());
                Ok(directory)
            }
            Some(p) => {
                log::debug!("{} not found, using built-in airports", p.display());
                Ok(Self::fallback())
            }
            None => Ok(Self::fallback()),
        }
    }

    /// Paris-area airports
    pub fn fallback() -> Self {
        Self {
            airports: vec![
                Airport::new("BVA", "Beauvais-Tillé", "Beauvais", "France"),
                Airport::new("CDG", "Charles de Gaulle", "Paris", "France"),
                Airport::new("ORY", "Orly", "Paris", "France"),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn all(&self) -> &[Airport] {
        &self.airports
    }

    /// Case-insensitive match on code, name, city or country. An empty
    /// query returns everything.
    pub fn search(&self, query: &str) -> Vec<&Airport> {
        let needle = query.trim().to_lowercase();
        self.airports
            .iter()
            .filter(|a| needle.is_empty() || a.matches(&needle))
            .collect()
    }

    pub fn get(&self, code: &str) -> Option<&Airport> {
        self.airports
            .iter()
            .find(|a| a.code.eq_ignore_ascii_case(code))
    }
}
