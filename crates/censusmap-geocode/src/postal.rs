use regex::Regex;

use crate::types::GeocodeResult;

/// Returns the five-digit postal code of a geocoded address.
///
/// Structured `postal_code` components win; the formatted address is only
/// scanned when no component carries one.
#[must_use]
pub fn extract_postal_code(result: &GeocodeResult) -> Option<String> {
    if let Some(component) = result
        .address_components
        .iter()
        .find(|c| c.has_type("postal_code"))
    {
        return Some(component.long_name.clone());
    }
    postal_code_in_text(&result.formatted_address)
}

/// First `12345` or `12345-6789` token in `text`, as its five-digit prefix.
#[must_use]
pub fn postal_code_in_text(text: &str) -> Option<String> {
    let re = Regex::new(r"\b(\d{5})(?:-\d{4})?\b").expect("valid postal code regex");
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

#[cfg(test)]
mod tests {
    use censusmap_core::GeoPoint;

    use super::*;
    use crate::types::{AddressComponent, ResultGeometry};

    fn component(name: &str, types: &[&str]) -> AddressComponent {
        AddressComponent {
            long_name: name.to_owned(),
            short_name: name.to_owned(),
            types: types.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn result(components: Vec<AddressComponent>, formatted: &str) -> GeocodeResult {
        GeocodeResult {
            address_components: components,
            formatted_address: formatted.to_owned(),
            geometry: ResultGeometry {
                location: GeoPoint::new(34.0, -81.03),
                bounds: None,
                viewport: None,
            },
        }
    }

    #[test]
    fn structured_component_wins_over_text() {
        // The formatted address deliberately carries a different code so a
        // regex hit would be detectable.
        let r = result(
            vec![
                component("123", &["street_number"]),
                component("Main Street", &["route"]),
                component("Columbia", &["locality", "political"]),
                component("29201", &["postal_code"]),
            ],
            "123 Main St, Columbia, SC 29999, USA",
        );
        assert_eq!(extract_postal_code(&r).as_deref(), Some("29201"));
    }

    #[test]
    fn falls_back_to_formatted_address() {
        let r = result(
            vec![component("Columbia", &["locality"])],
            "123 Main St, Columbia, SC 29201-1234, USA",
        );
        assert_eq!(extract_postal_code(&r).as_deref(), Some("29201"));
    }

    #[test]
    fn no_code_anywhere_is_none() {
        let r = result(vec![], "Somewhere, SC, USA");
        assert!(extract_postal_code(&r).is_none());
    }

    #[test]
    fn text_scan_ignores_longer_digit_runs() {
        assert!(postal_code_in_text("PO Box 1234567").is_none());
        assert_eq!(postal_code_in_text("Unit 4, 30301").as_deref(), Some("30301"));
    }
}
