//! Display-name recovery for export file and directory names.
//!
//! Exports percent-encode characters that are not safe in file names. Only the
//! fixed set below is decoded; anything else is left as-is.

const ENCODED_CHARACTERS: [(&str, &str); 19] = [
    ("%22", "\""),
    ("%23", "#"),
    ("%24", "$"),
    ("%26", "&"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2b", "+"),
    ("%2c", ","),
    ("%2f", "/"),
    ("%3a", ":"),
    ("%3c", "<"),
    ("%3d", "="),
    ("%3e", ">"),
    ("%3f", "?"),
    ("%5b", "["),
    ("%5d", "]"),
    ("%e2%80%9c", "\u{201c}"),
    ("%e2%80%9d", "\u{201d}"),
];

/// Replaces the encoded characters of an export file name with their literal form.
pub fn clean_display_name(raw: &str) -> String {
    let mut name = raw.to_string();
    for (encoded, decoded) in ENCODED_CHARACTERS {
        if name.contains(encoded) {
            name = name.replace(encoded, decoded);
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_sequences() {
        assert_eq!(clean_display_name("Billing %2b Payments"), "Billing + Payments");
        assert_eq!(clean_display_name("What%3f"), "What?");
        assert_eq!(
            clean_display_name("%e2%80%9cquoted%e2%80%9d"),
            "\u{201c}quoted\u{201d}"
        );
    }

    #[test]
    fn leaves_unknown_sequences_alone() {
        assert_eq!(clean_display_name("100%25 done"), "100%25 done");
        assert_eq!(clean_display_name("Upper %2B"), "Upper %2B");
    }
}
