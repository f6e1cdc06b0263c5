use crate::engine::FlatPentacle;
use psalter::{Citation, VerseSpec};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryText {
    Loading,
    Ready(String),
    NoText,
    NotProvided,
    Unparseable,
    FetchFailed,
}

impl EntryText {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl From<&VerseSpec> for EntryText {
    fn from(spec: &VerseSpec) -> Self {
        match spec {
            VerseSpec::Missing => Self::NotProvided,
            VerseSpec::Unparseable => Self::Unparseable,
            VerseSpec::Verses(_) => Self::Loading,
        }
    }
}

impl fmt::Display for EntryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading verse text…"),
            Self::Ready(text) => f.write_str(text),
            Self::NoText => f.write_str("No verse text returned by scripture service."),
            Self::NotProvided => f.write_str("Verse reference not provided in source."),
            Self::Unparseable => f.write_str("Unable to parse verse reference."),
            Self::FetchFailed => f.write_str("Unable to fetch verse text."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEntry {
    pub heading: String,
    pub verse_label: Option<String>,
    pub text: EntryText,
}

impl PanelEntry {
    pub fn from_citation(citation: &Citation, book: &str) -> Self {
        Self {
            heading: citation.heading(book),
            verse_label: citation.verse_label(),
            text: EntryText::from(&citation.spec()),
        }
    }
}

/// The side panel describing the active pentacle and its cited verses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailPanel {
    #[default]
    Idle,
    Pentacle {
        title: String,
        focus: String,
        entries: Vec<PanelEntry>,
    },
}

impl DetailPanel {
    /// Everything that can be shown without waiting on the verse service.
    pub fn for_pentacle(pentacle: &FlatPentacle, citations: &[Citation], book: &str) -> Self {
        let focus = match pentacle.pentacle.focus.trim() {
            "" => "Purpose unavailable".to_string(),
            focus => focus.to_string(),
        };

        Self::Pentacle {
            title: pentacle.title(),
            focus,
            entries: citations
                .iter()
                .map(|c| PanelEntry::from_citation(c, book))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[PanelEntry] {
        match self {
            Self::Idle => &[],
            Self::Pentacle { entries, .. } => entries,
        }
    }

    pub fn entry_mut(&mut self, slot: usize) -> Option<&mut PanelEntry> {
        match self {
            Self::Idle => None,
            Self::Pentacle { entries, .. } => entries.get_mut(slot),
        }
    }
}

impl fmt::Display for DetailPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => {
                writeln!(f, "—")?;
                writeln!(f, "Select a pentacle to view its verses.")?;
                writeln!(f, "  • No pentacle selected.")
            }
            Self::Pentacle {
                title,
                focus,
                entries,
            } => {
                writeln!(f, "{}", title)?;
                writeln!(f, "{}", focus)?;
                if entries.is_empty() {
                    return writeln!(
                        f,
                        "  • No psalms cited for this pentacle in the Key of Solomon notes."
                    );
                }
                for entry in entries {
                    match &entry.verse_label {
                        Some(label) => writeln!(f, "  • {} ({})", entry.heading, label)?,
                        None => writeln!(f, "  • {}", entry.heading)?,
                    }
                    for line in entry.text.to_string().lines() {
                        writeln!(f, "      {}", line)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Pentacle;

    fn pentacle(focus: &str) -> FlatPentacle {
        FlatPentacle {
            group_index: 0,
            pentacle_index: 0,
            planet: "Saturn".to_string(),
            pentacle: Pentacle {
                index: 1,
                focus: focus.to_string(),
            },
        }
    }

    #[test]
    fn test_static_entries() {
        let citations = vec![
            Citation::new("72", Some("8")),
            Citation::new("109", None),
            Citation::new("18", Some("see notes")),
        ];
        let panel = DetailPanel::for_pentacle(&pentacle("Banish harmful forces"), &citations, "Psalm");

        let texts: Vec<_> = panel.entries().iter().map(|e| e.text.clone()).collect();
        assert_eq!(
            texts,
            vec![EntryText::Loading, EntryText::NotProvided, EntryText::Unparseable]
        );
        assert_eq!(panel.entries()[0].heading, "Psalm 72:8");
        assert_eq!(panel.entries()[0].verse_label.as_deref(), Some("Verse 8"));
    }

    #[test]
    fn test_rendering() {
        let panel = DetailPanel::for_pentacle(&pentacle(""), &[], "Psalm");
        let rendered = panel.to_string();
        assert!(rendered.starts_with("Pentacle of Saturn #1\nPurpose unavailable\n"));
        assert!(rendered.contains("No psalms cited"));

        assert!(DetailPanel::Idle.to_string().contains("No pentacle selected."));
        assert!(DetailPanel::Idle.entries().is_empty());
    }
}
