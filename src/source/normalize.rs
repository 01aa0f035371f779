//! Text, price and link cleanup used by adapters when building products

use url::Url;

/// Collapses runs of whitespace and trims the ends
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a displayed price into an integer amount
///
/// Currency symbols and thousand separators (`.`, spaces, apostrophes) are
/// ignored. Anything after a decimal comma is dropped, since listings show
/// whole currency units. Returns `None` when the text holds no digits.
///
/// # Examples
///
/// ```
/// use catalog_miner::source::parse_price;
///
/// assert_eq!(parse_price("Gs. 1.250.000"), Some(1_250_000));
/// assert_eq!(parse_price("₲ 35.900,00"), Some(35_900));
/// assert_eq!(parse_price("Consultar"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<u64> {
    let integral = raw.split(',').next().unwrap_or("");
    let digits: String = integral.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Lowest parsable amount among several displayed prices
///
/// Listings on sale show both the old and the new price; the lower one is the
/// price a customer pays.
pub fn lowest_price<'a, I>(candidates: I) -> Option<u64>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().filter_map(parse_price).min()
}

/// Resolves an href to an absolute http(s) URL
///
/// Without a base, only already absolute links are accepted.
pub(crate) fn resolve_link(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    }
    .ok()?;

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
