use ticklens_core::{CompanyProfile, Profile};

pub fn by_symbol(s: &str) -> Option<Profile> {
    let (name, sector, industry) = match s {
        "AAPL" => ("Apple Inc.", Some("Technology"), Some("Consumer Electronics")),
        "MSFT" => ("Microsoft Corporation", Some("Technology"), Some("Software - Infrastructure")),
        "NVDA" => ("NVIDIA Corporation", Some("Technology"), Some("Semiconductors")),
        // sector deliberately absent to exercise placeholders
        "KO" => ("The Coca-Cola Company", None, Some("Beverages - Non-Alcoholic")),
        _ => return None,
    };
    Some(Profile::Company(CompanyProfile {
        name: name.to_string(),
        website: None,
        summary: None,
        address: None,
        sector: sector.map(str::to_string),
        industry: industry.map(str::to_string),
        isin: None,
    }))
}
