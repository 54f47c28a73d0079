//! High-score tables, their saved form, and a scrolling panel to show them

use std::collections::hash_map::Entry;
use std::io::{Read, Write};
use std::rc::Rc;
use std::time::Duration;

use cdx_animation::GESTURES_NEEDED;
use cdx_core::{Color, FontId, Size, TextMeasurer, Vec2};
use cdx_layout::{ControlId, ControlTree, TextControl};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::control_screen::ControlScreen;
use crate::error::Result;
use crate::transition::ScreenTransition;

/// Column of the score in a panel row
const SCORE_COLUMN: f32 = 200.0;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: i64,
    /// Seconds since the Unix epoch, if known
    pub recorded_at: Option<u64>,
}

impl HighScoreEntry {
    /// Empty slots are filled with unnamed zero scores
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty() && self.recorded_at.is_none()
    }
}

/// A fixed number of scores in descending order
#[derive(Clone, Debug, PartialEq)]
pub struct HighScoreTable {
    size: usize,
    description: String,
    entries: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    pub fn new(size: usize, description: impl Into<String>) -> Self {
        let mut table = Self {
            size,
            description: description.into(),
            entries: Vec::with_capacity(size),
        };
        table.clear();
        table
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Always `size` entries, best first
    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    /// Reset every slot to a placeholder
    pub fn clear(&mut self) {
        self.entries.clear();
        self.entries.resize(self.size, HighScoreEntry::default());
    }

    /// Insert a score, returning its rank if it made the table
    ///
    /// Entries already in the table keep their place on a tie.
    pub fn add_entry(&mut self, name: impl Into<String>, score: i64, recorded_at: Option<u64>) -> Option<usize> {
        let rank = self.entries.iter().position(|e| score > e.score)?;
        self.entries.insert(
            rank,
            HighScoreEntry {
                name: name.into(),
                score,
                recorded_at,
            },
        );
        self.entries.truncate(self.size);
        Some(rank)
    }

    /// True if `score` would make the table
    pub fn score_qualifies(&self, score: i64) -> bool {
        self.entries.last().is_some_and(|last| score > last.score)
    }
}

#[derive(Serialize, Deserialize)]
struct SavedScores {
    tables: Vec<SavedTable>,
}

#[derive(Serialize, Deserialize)]
struct SavedTable {
    name: String,
    size: usize,
    description: String,
    entries: Vec<HighScoreEntry>,
}

/// Named high-score tables
#[derive(Clone, Debug, Default)]
pub struct HighScores {
    tables: FxHashMap<String, HighScoreTable>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table, or reset an existing one to the new size and description
    pub fn initialize_table(&mut self, name: &str, size: usize, description: &str) -> &mut HighScoreTable {
        let table = HighScoreTable::new(size, description);
        match self.tables.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(table);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(table),
        }
    }

    pub fn table(&self, name: &str) -> Option<&HighScoreTable> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut HighScoreTable> {
        self.tables.get_mut(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Clear the scores of every table, keeping the tables
    pub fn clear(&mut self) {
        for table in self.tables.values_mut() {
            table.clear();
        }
    }

    /// Write every table as JSON, placeholders left out
    pub fn save(&self, writer: &mut dyn Write) -> Result<()> {
        let tables = self
            .table_names()
            .into_iter()
            .filter_map(|name| self.tables.get(name).map(|table| (name, table)))
            .map(|(name, table)| SavedTable {
                name: name.to_string(),
                size: table.size,
                description: table.description.clone(),
                entries: table.entries.iter().filter(|e| !e.is_placeholder()).cloned().collect(),
            })
            .collect();
        serde_json::to_writer(writer, &SavedScores { tables })?;
        Ok(())
    }

    /// Replace the tables with saved ones
    ///
    /// On a read or format error the scores are cleared and false returned.
    pub fn load(&mut self, reader: &mut dyn Read) -> bool {
        match serde_json::from_reader::<_, SavedScores>(reader) {
            Ok(saved) => {
                for saved_table in saved.tables {
                    let mut table = HighScoreTable::new(saved_table.size, saved_table.description);
                    for entry in saved_table.entries {
                        table.add_entry(entry.name, entry.score, entry.recorded_at);
                    }
                    self.tables.insert(saved_table.name, table);
                }
                debug!(tables = self.tables.len(), "high scores loaded");
                true
            }
            Err(error) => {
                warn!(%error, "discarding saved high scores");
                self.clear();
                false
            }
        }
    }
}

/// Fonts used by the high-score panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighScoreFonts {
    pub title: FontId,
    pub header: FontId,
    pub detail: FontId,
}

impl HighScoreFonts {
    /// The same font for everything
    pub fn uniform(font: FontId) -> Self {
        Self {
            title: font,
            header: font,
            detail: font,
        }
    }
}

/// Build a scrolling panel listing `table`
///
/// The panel holds a title, a header row, then one row per score, stacked in
/// a column. Placeholder slots are not listed.
pub fn high_score_panel(
    tree: &mut ControlTree,
    table: &HighScoreTable,
    fonts: HighScoreFonts,
    viewport: Size,
) -> Result<ControlId> {
    let panel = tree.create_scrolling_panel(viewport);

    let title = tree.create_text(TextControl::new("High score", fonts.title));
    tree.add_child(panel, title)?;

    let header = tree.create_panel();
    let player = tree.create_text(TextControl::new("Player", fonts.header).with_color(Color::TURQUOISE));
    let score = tree.create_text(TextControl::new("Score", fonts.header).with_color(Color::TURQUOISE));
    tree.add_child(header, player)?;
    tree.add_child(header, score)?;
    tree.set_position(score, Vec2::new(SCORE_COLUMN, 0.0))?;
    tree.add_child(panel, header)?;

    let list = tree.create_panel();
    for entry in table.entries().iter().filter(|e| !e.is_placeholder()) {
        let row = tree.create_panel();
        let name = tree.create_text(TextControl::new(entry.name.as_str(), fonts.detail));
        let value = tree.create_text(TextControl::new(entry.score.to_string(), fonts.detail));
        tree.add_child(row, name)?;
        tree.add_child(row, value)?;
        tree.set_position(value, Vec2::new(SCORE_COLUMN, 0.0))?;
        tree.add_child(list, row)?;
    }
    tree.layout_column(list, 0.0, 0.0, 0.0)?;
    tree.add_child(panel, list)?;

    tree.layout_column(panel, 0.0, 0.0, 0.0)?;
    Ok(panel)
}

/// A scrollable screen showing one table
pub fn high_score_screen(
    measurer: Rc<dyn TextMeasurer>,
    table: &HighScoreTable,
    fonts: HighScoreFonts,
    viewport: Size,
) -> Result<ControlScreen> {
    let mut tree = ControlTree::new(measurer);
    let root = high_score_panel(&mut tree, table, fonts, viewport)?;
    Ok(ControlScreen::new(tree, root, "high_scores")
        .with_gestures(GESTURES_NEEDED)
        .with_transition(ScreenTransition::symmetric(Duration::from_millis(500))))
}
