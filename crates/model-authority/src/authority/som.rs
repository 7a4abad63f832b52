use super::domain::ShareOfModelResult;

/// Share of sampled responses that mention `brand`, case-insensitively.
///
/// A response counts once no matter how often the brand repeats inside it.
/// An empty batch yields a zero share.
pub fn estimate_share<S: AsRef<str>>(brand: &str, responses: &[S]) -> ShareOfModelResult {
    estimate_share_with_aliases(brand, &[] as &[&str], responses)
}

/// Same as [`estimate_share`], also accepting alternate spellings of the brand.
pub fn estimate_share_with_aliases<A, S>(
    brand: &str,
    aliases: &[A],
    responses: &[S],
) -> ShareOfModelResult
where
    A: AsRef<str>,
    S: AsRef<str>,
{
    let needles: Vec<String> = std::iter::once(brand)
        .chain(aliases.iter().map(|alias| alias.as_ref()))
        .map(str::to_lowercase)
        .filter(|name| !name.is_empty())
        .collect();

    let mentions = responses
        .iter()
        .filter(|response| {
            let normalized = response.as_ref().to_lowercase();
            needles.iter().any(|needle| normalized.contains(needle))
        })
        .count();

    let share = if responses.is_empty() {
        0
    } else {
        ((mentions as f64 / responses.len() as f64) * 100.0).round() as u32
    };

    ShareOfModelResult {
        brand: brand.to_string(),
        share,
        mentions,
        total_mentions: responses.len(),
    }
}
