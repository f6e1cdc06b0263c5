use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Deserializer, Serialize};

/// Chapter of the book being cited. Annotation documents write it either as a
/// JSON number or a string, so both are accepted.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(from = "NumberOrText")]
pub struct Chapter(String);

crate::impl_string_newtype!(Chapter);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct VerseNumber(String);

crate::impl_string_newtype!(VerseNumber);

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

impl From<NumberOrText> for String {
    fn from(value: NumberOrText) -> Self {
        match value {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s,
        }
    }
}

impl From<NumberOrText> for Chapter {
    fn from(value: NumberOrText) -> Self {
        Self(value.into())
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.map(String::from))
}

/// One `{number, verses}` citation attached to a pentacle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, alias = "psalm")]
    pub number: Option<Chapter>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub verses: Option<String>,
}

impl Citation {
    pub fn new(number: impl Into<String>, verses: Option<&str>) -> Self {
        Self {
            number: Some(Chapter::new(number)),
            verses: verses.map(str::to_string),
        }
    }

    pub fn chapter(&self) -> Chapter {
        self.number.clone().unwrap_or_else(|| Chapter::from("?"))
    }

    pub fn spec(&self) -> VerseSpec {
        VerseSpec::parse(self.verses.as_deref())
    }

    /// `Psalm 91:1-3`, or just `Psalm 91` when no verses are cited.
    pub fn heading(&self, book: &str) -> String {
        match self.verses.as_deref() {
            Some(v) if !v.trim().is_empty() => format!("{} {}:{}", book, self.chapter(), v),
            _ => format!("{} {}", book, self.chapter()),
        }
    }

    pub fn verse_label(&self) -> Option<String> {
        let verses = self.verses.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
        // a chapter-qualified reference such as "3:1-4" spans verses
        let noun = if verses.contains(':') {
            "Verses"
        } else {
            "Verse"
        };
        Some(format!("{} {}", noun, verses))
    }
}

/// How a citation's verse text should be sourced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerseSpec {
    /// Nothing cited; no lookup is attempted.
    Missing,
    /// Something was cited but yielded no verse numbers.
    Unparseable,
    Verses(Vec<VerseNumber>),
}

impl VerseSpec {
    pub fn parse(spec: Option<&str>) -> Self {
        match spec.map(str::trim) {
            None | Some("") => Self::Missing,
            Some(s) => {
                let verses = expand_verse_spec(s);
                if verses.is_empty() {
                    Self::Unparseable
                } else {
                    Self::Verses(verses)
                }
            }
        }
    }
}

/// Widest range expanded into lookups; Psalm 119 has 176 verses.
pub const MAX_RANGE_VERSES: u32 = 176;

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Expands a free-text verse reference into the individual verses to fetch.
///
/// A hyphen marks an inclusive range split at its first occurrence; both
/// sides are reduced to their digits. Anything that does not yield a valid
/// ascending range of at most [`MAX_RANGE_VERSES`] verses, or a number, comes
/// back empty.
pub fn expand_verse_spec(spec: &str) -> Vec<VerseNumber> {
    let clean = spec.trim();
    if clean.is_empty() {
        return Vec::new();
    }

    if let Some((start_raw, end_raw)) = clean.split_once('-') {
        let bounds = (
            digits(start_raw).parse::<u32>(),
            digits(end_raw).parse::<u32>(),
        );
        return match bounds {
            (Ok(start), Ok(end)) if end >= start => {
                if end - start >= MAX_RANGE_VERSES {
                    log::warn!("Verse range '{}' is too wide, skipping", clean);
                    return Vec::new();
                }
                (start..=end)
                    .map(|n| VerseNumber::new(n.to_string()))
                    .collect()
            }
            _ => Vec::new(),
        };
    }

    let numeric = digits(clean);
    if numeric.is_empty() {
        Vec::new()
    } else {
        vec![VerseNumber::new(numeric)]
    }
}
