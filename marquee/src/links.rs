//! Search-page URLs for a picked suggestion.

use url::form_urlencoded::byte_serialize;

pub const DEFAULT_ORIGIN: &str = "https://letterboxd.com";

/// Marks form encoding escapes but URI components may carry as-is.
const UNRESERVED_MARKS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%7E", "~"),
];

/// `{origin}/search/{query}/`, or `None` for a blank query.
///
/// The query is form-encoded (spaces become `+`), leaving `! ' ( ) ~` literal
/// the way `encodeURIComponent` does, so "Heat (1995)" stays readable in the
/// address bar.
#[uniffi::export]
pub fn search_page_url(origin: String, query: String) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let origin = match origin.trim().trim_end_matches('/') {
        "" => DEFAULT_ORIGIN,
        other => other,
    };

    let mut encoded: String = byte_serialize(query.as_bytes()).collect();
    for (escaped, literal) in UNRESERVED_MARKS {
        encoded = encoded.replace(escaped, literal);
    }

    Some(format!("{origin}/search/{encoded}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(query: &str) -> Option<String> {
        search_page_url(String::new(), query.to_string())
    }

    #[test]
    fn test_spaces_become_plus() {
        assert_eq!(
            url("The Dark Knight").as_deref(),
            Some("https://letterboxd.com/search/The+Dark+Knight/")
        );
    }

    #[test]
    fn test_parentheses_stay_literal() {
        assert_eq!(
            url(" Heat (1995) ").as_deref(),
            Some("https://letterboxd.com/search/Heat+(1995)/")
        );
    }

    #[test]
    fn test_apostrophes_and_marks_stay_literal() {
        assert_eq!(
            url("Schindler's List").as_deref(),
            Some("https://letterboxd.com/search/Schindler's+List/")
        );
        assert_eq!(
            url("Airplane! ~ *").as_deref(),
            Some("https://letterboxd.com/search/Airplane!+~+*/")
        );
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        assert_eq!(
            url("Tom & Jerry/2").as_deref(),
            Some("https://letterboxd.com/search/Tom+%26+Jerry%2F2/")
        );
        assert_eq!(url("Amélie").as_deref(), Some("https://letterboxd.com/search/Am%C3%A9lie/"));
    }

    #[test]
    fn test_blank_query_has_no_url() {
        assert_eq!(url("   "), None);
    }

    #[test]
    fn test_custom_origin() {
        assert_eq!(
            search_page_url("http://localhost:8080/".into(), "up".into()).as_deref(),
            Some("http://localhost:8080/search/up/")
        );
    }
}
