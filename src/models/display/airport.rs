//! Airport display model

use serde::Serialize;
use tabled::Tabled;

use crate::airports::Airport;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct AirportDisplay {
    #[tabled(rename = "CODE")]
    pub code: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "CITY")]
    pub city: String,

    #[tabled(rename = "COUNTRY")]
    pub country: String,
}

impl From<&Airport> for AirportDisplay {
    fn from(airport: &Airport) -> Self {
        Self {
            code: airport.code.clone(),
            name: airport.name.clone(),
            city: airport.city.clone(),
            country: airport.country.clone(),
        }
    }
}
