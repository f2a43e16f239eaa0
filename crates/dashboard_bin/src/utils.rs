use std::collections::BTreeSet;
use std::str::FromStr;

pub fn sanitize_ticker(ticker: String) -> String {
    return ticker
        .chars()
        .take(20)
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '.' || *c == '^')
        .collect::<String>()
        .to_uppercase();
}

/// Parses a comma separated query value such as `2020,2021`.
///
/// Blank items are skipped and duplicates collapse.
pub fn parse_list<V: FromStr + Ord>(raw: &str) -> Result<BTreeSet<V>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<V>()
                .map_err(|_| format!("not a number: {}", item))
        })
        .collect()
}
