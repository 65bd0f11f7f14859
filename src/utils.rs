use chrono::{DateTime, Utc};

/// Longest file-name component produced by [`sanitize_filename`]
const MAX_NAME_CHARS: usize = 100;

/// Timestamp usable inside a file name, e.g. `2025-10-07T12-30-05`
pub fn timestamp_slug(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S").to_string()
}

/// Convert a domain or URL fragment to a sanitized file-name component
pub fn sanitize_filename(name: &str) -> String {
    name.replace("http://", "")
        .replace("https://", "")
        .replace(['/', '\\', ':', '?', '&', '=', '#', '%', '*', '"', '<', '>', '|'], "_")
        .chars()
        .take(MAX_NAME_CHARS)
        .collect()
}

/// File name of a site's grouped opportunity links
pub fn grouped_links_file_name(domain: &str, site_id: &str) -> String {
    format!("{}_{}_opportunities.json", sanitize_filename(domain), site_id)
}

/// File name of a site's raw opportunity download
pub fn opportunities_file_name(site_id: &str) -> String {
    format!("site_copportunities_{}.json", site_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_slug() {
        let at = Utc.with_ymd_and_hms(2025, 10, 7, 12, 30, 5).unwrap();
        assert_eq!(timestamp_slug(at), "2025-10-07T12-30-05");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("https://a.com/us?x=1"), "a.com_us_x_1");
        assert_eq!(sanitize_filename(&"é".repeat(150)).chars().count(), 100);
    }

    #[test]
    fn test_artifact_names() {
        assert_eq!(
            grouped_links_file_name("sunstar.com", "542ad116"),
            "sunstar.com_542ad116_opportunities.json"
        );
        assert_eq!(
            opportunities_file_name("542ad116"),
            "site_copportunities_542ad116.json"
        );
    }
}
