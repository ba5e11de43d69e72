//! Location policy: remote detection and US-location heuristics.
//!
//! Only location-ish text (the posting's location field, falling back to its
//! title) is fed through here. Descriptions are never used: phrases such as
//! "About us" would read as US signals.

use crate::config::LocationFilters;

const REMOTE_TOKENS: [&str; 7] = [
    "remote",
    "work from home",
    "wfh",
    "distributed",
    "anywhere",
    "home-based",
    "telecommute",
];

const US_TOKENS: [&str; 5] = ["united states", "united states of america", "usa", "u.s.", "u.s"];

const US_COUNTRY_WISHES: [&str; 3] = ["united states", "usa", "us"];

const US_STATE_ABBREVIATIONS: [&str; 51] = [
    "al", "ak", "az", "ar", "ca", "co", "ct", "de", "fl", "ga", "hi", "id", "il", "in", "ia", "ks",
    "ky", "la", "me", "md", "ma", "mi", "mn", "ms", "mo", "mt", "ne", "nv", "nh", "nj", "nm", "ny",
    "nc", "nd", "oh", "ok", "or", "pa", "ri", "sc", "sd", "tn", "tx", "ut", "vt", "va", "wa", "wv",
    "wi", "wy", "dc",
];

const US_STATE_NAMES: [&str; 54] = [
    "alabama",
    "alaska",
    "arizona",
    "arkansas",
    "california",
    "colorado",
    "connecticut",
    "delaware",
    "florida",
    "georgia",
    "hawaii",
    "idaho",
    "illinois",
    "indiana",
    "iowa",
    "kansas",
    "kentucky",
    "louisiana",
    "maine",
    "maryland",
    "massachusetts",
    "michigan",
    "minnesota",
    "mississippi",
    "missouri",
    "montana",
    "nebraska",
    "nevada",
    "new hampshire",
    "new jersey",
    "new mexico",
    "new york",
    "north carolina",
    "north dakota",
    "ohio",
    "oklahoma",
    "oregon",
    "pennsylvania",
    "rhode island",
    "south carolina",
    "south dakota",
    "tennessee",
    "texas",
    "utah",
    "vermont",
    "virginia",
    "washington",
    "west virginia",
    "wisconsin",
    "wyoming",
    "district of columbia",
    "washington dc",
    "d.c.",
    "puerto rico",
];

/// Separators that delimit location tokens such as `Austin, TX | Remote (US)`.
const SEPARATORS: &[char] = &[' ', ',', '|', '/', '(', ')', '[', ']'];

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn is_remote(location: &str) -> bool {
    let text = normalize(location);
    REMOTE_TOKENS.iter().any(|token| text.contains(token))
}

fn has_token(text: &str, token: &str) -> bool {
    text.split(SEPARATORS).any(|part| part == token)
}

/// True when location text carries a US signal: country tokens, a state
/// name, or a two-letter state abbreviation standing on its own.
pub fn looks_like_us_location(location: &str) -> bool {
    let text = normalize(location);
    if text.is_empty() {
        return false;
    }

    let padded = format!(" {text} ");
    if US_TOKENS
        .iter()
        .any(|token| padded.contains(&format!(" {token} ")))
    {
        return true;
    }

    // Token match avoids hits inside words like "business".
    if has_token(&text, "us") {
        return true;
    }

    if US_STATE_NAMES.iter().any(|name| {
        padded.contains(&format!(" {name} "))
            || padded.contains(&format!("{name},"))
            || padded.contains(&format!("{name}|"))
            || padded.contains(&format!("{name}/"))
    }) {
        return true;
    }

    let abbreviated =
        abbreviation_tokens(&text).any(|token| US_STATE_ABBREVIATIONS.contains(&token));
    abbreviated
}

fn abbreviation_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(SEPARATORS)
        .filter(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_lowercase()))
}

fn matches_states(location: &str, allowed_states: &[String]) -> bool {
    let text = normalize(location);
    allowed_states.iter().any(|state| {
        if state.len() == 2 {
            has_token(&text, state)
        } else {
            text.contains(state.as_str())
        }
    })
}

fn matches_cities(location: &str, allowed_cities: &[String]) -> bool {
    let text = normalize(location);
    allowed_cities.iter().any(|city| text.contains(city.as_str()))
}

fn normalized_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| normalize(value))
        .filter(|value| !value.is_empty())
        .collect()
}

fn wants_us(values: &[String]) -> bool {
    values
        .iter()
        .any(|value| US_COUNTRY_WISHES.contains(&value.as_str()))
}

/// Location rules compiled from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationPolicy {
    Structured {
        allow_remote: bool,
        allowed_countries: Vec<String>,
        allowed_states: Vec<String>,
        allowed_cities: Vec<String>,
    },
    Legacy {
        locations: Vec<String>,
        remote_only: bool,
    },
}

impl LocationPolicy {
    pub fn structured(filters: &LocationFilters) -> Self {
        Self::Structured {
            allow_remote: filters.allow_remote,
            allowed_countries: normalized_list(&filters.allowed_countries),
            allowed_states: normalized_list(&filters.allowed_states),
            allowed_cities: normalized_list(&filters.allowed_cities),
        }
    }

    pub fn legacy(locations: &[String], remote_only: bool) -> Self {
        Self::Legacy {
            locations: normalized_list(locations),
            remote_only,
        }
    }

    pub fn allows(&self, location: &str) -> bool {
        let text = normalize(location);
        match self {
            Self::Structured {
                allow_remote,
                allowed_countries,
                allowed_states,
                allowed_cities,
            } => {
                let us_only = wants_us(allowed_countries);

                if is_remote(&text) {
                    if !allow_remote {
                        return false;
                    }
                    if allowed_countries.is_empty() {
                        return true;
                    }
                    if us_only {
                        return looks_like_us_location(&text);
                    }
                    return allowed_countries
                        .iter()
                        .any(|country| text.contains(country.as_str()));
                }

                if us_only && !looks_like_us_location(&text) {
                    return false;
                }

                // City/state constraints only apply on-site so US-remote roles still pass.
                if !allowed_states.is_empty() || !allowed_cities.is_empty() {
                    return matches_cities(&text, allowed_cities)
                        || matches_states(&text, allowed_states);
                }

                true
            }
            Self::Legacy {
                locations,
                remote_only,
            } => {
                let us_wanted = wants_us(locations);
                let remote_wanted = locations.iter().any(|value| value.contains("remote"));

                if us_wanted && text.is_empty() {
                    return false;
                }
                if *remote_only && !is_remote(&text) {
                    return false;
                }
                if us_wanted && !looks_like_us_location(&text) {
                    return false;
                }
                if remote_wanted && !is_remote(&text) {
                    return false;
                }
                true
            }
        }
    }
}
