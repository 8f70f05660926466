use std::collections::BTreeMap;

/// Language tag to display text, e.g. `{"en-US": "completed"}`.
pub type LanguageMap = BTreeMap<String, String>;

/// Pseudo-language tag for text whose language is undetermined.
pub const UNDETERMINED: &str = "und";

pub fn undetermined(text: impl Into<String>) -> LanguageMap {
    LanguageMap::from([(UNDETERMINED.to_string(), text.into())])
}

/// Pick the best entry: the requested language, then `und`, then `en-US`,
/// then whatever comes first.
pub fn language_value<'a>(map: &'a LanguageMap, lang: Option<&str>) -> &'a str {
    lang.and_then(|lang| map.get(lang))
        .or_else(|| map.get(UNDETERMINED))
        .or_else(|| map.get("en-US"))
        .or_else(|| map.values().next())
        .map(String::as_str)
        .unwrap_or("")
}
