//! Natural-language instruction sent to the model for one filter triple.

use crate::models::{Category, Language, Region};

/// Build the digest request for `category` in `language`, scoped to `region`.
///
/// The global region is phrased as "the world"; every other region by name.
/// Sentiment labels stay in English regardless of the target language so the
/// normalizer can match them.
pub fn build_prompt(category: Category, language: &Language, region: &Region) -> String {
    let region_context = if region.is_global() { "the world" } else { region.name };
    let lang = language.name;

    format!(
        r#"Find the top 4-5 major unique news stories for the category "{category}" from {region_context} from the last 24 hours.

IMPORTANT: You must write the output in the language: {lang}.

For each story, provide:
1. A compelling title in {lang}.
2. Exactly 3-5 bullet points summarizing the article in {lang}. Keep them concise and readable in 15 seconds.
3. Sentiment analysis (Positive, Neutral, or Negative) - use these English labels.
4. The source name and original URL.

Format the output strictly as a JSON array where each object has these keys:
"title", "summary" (array of strings), "sentiment", "source", "url".

Important: Remove any duplicate stories or very similar coverage. Ensure all links are real and functional."#
    )
}
