//! RTF list and numbering support.
//!
//! RTF uses a two-table system. The list table (`\listtable`) defines each
//! list once, by id, with one level per indent level. The list override
//! table (`\listoverridetable`) creates instances of those lists; paragraphs
//! refer to an instance with `\lsN` and to a level with `\ilvlN`.

use smallvec::SmallVec;

/// Marker drawn in front of list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum MarkerStyle {
    None,
    #[default]
    Disc,
    Circle,
    Square,
    Box,
    LowerRoman,
    UpperRoman,
    LowerLatin,
    UpperLatin,
    Decimal,
}

impl MarkerStyle {
    /// XAML spelling of this style.
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerStyle::None => "None",
            MarkerStyle::Disc => "Disc",
            MarkerStyle::Circle => "Circle",
            MarkerStyle::Square => "Square",
            MarkerStyle::Box => "Box",
            MarkerStyle::LowerRoman => "LowerRoman",
            MarkerStyle::UpperRoman => "UpperRoman",
            MarkerStyle::LowerLatin => "LowerLatin",
            MarkerStyle::UpperLatin => "UpperLatin",
            MarkerStyle::Decimal => "Decimal",
        }
    }

    /// Parse the XAML spelling.
    pub fn parse(value: &str) -> Option<MarkerStyle> {
        Some(match value.trim() {
            "None" => MarkerStyle::None,
            "Disc" => MarkerStyle::Disc,
            "Circle" => MarkerStyle::Circle,
            "Square" => MarkerStyle::Square,
            "Box" => MarkerStyle::Box,
            "LowerRoman" => MarkerStyle::LowerRoman,
            "UpperRoman" => MarkerStyle::UpperRoman,
            "LowerLatin" => MarkerStyle::LowerLatin,
            "UpperLatin" => MarkerStyle::UpperLatin,
            "Decimal" => MarkerStyle::Decimal,
            _ => return None,
        })
    }

    /// Derive the style from a level's number format (`\levelnfcN`) and,
    /// for bullets, its level text.
    pub fn from_number_format(nfc: i32, level_text: &str) -> MarkerStyle {
        match nfc {
            0 => MarkerStyle::Decimal,
            1 => MarkerStyle::UpperRoman,
            2 => MarkerStyle::LowerRoman,
            3 => MarkerStyle::UpperLatin,
            4 => MarkerStyle::LowerLatin,
            23 => match level_text.chars().next() {
                Some('o') => MarkerStyle::Circle,
                Some('\u{25AA}' | '\u{25A0}' | '\u{F0A7}' | '§') => MarkerStyle::Square,
                Some('\u{25A1}') => MarkerStyle::Box,
                _ => MarkerStyle::Disc,
            },
            255 => MarkerStyle::None,
            _ => MarkerStyle::Decimal,
        }
    }

    /// Number format code written as `\levelnfcN`.
    pub fn number_format(self) -> i32 {
        match self {
            MarkerStyle::Decimal => 0,
            MarkerStyle::UpperRoman => 1,
            MarkerStyle::LowerRoman => 2,
            MarkerStyle::UpperLatin => 3,
            MarkerStyle::LowerLatin => 4,
            MarkerStyle::Disc | MarkerStyle::Circle | MarkerStyle::Square | MarkerStyle::Box => 23,
            MarkerStyle::None => 255,
        }
    }

    /// Bullet character of bullet styles.
    pub fn bullet(self) -> Option<char> {
        match self {
            MarkerStyle::Disc => Some('\u{2022}'),
            MarkerStyle::Circle => Some('o'),
            MarkerStyle::Square => Some('\u{25AA}'),
            MarkerStyle::Box => Some('\u{25A1}'),
            _ => None,
        }
    }

    /// Text of the marker for item `number` (1-based), as shown by readers
    /// that do not understand list tables.
    pub fn marker_text(self, number: i32) -> String {
        if let Some(bullet) = self.bullet() {
            return bullet.to_string();
        }
        match self {
            MarkerStyle::None => String::new(),
            MarkerStyle::Decimal => format!("{}.", number),
            MarkerStyle::UpperRoman => format!("{}.", to_roman(number)),
            MarkerStyle::LowerRoman => format!("{}.", to_roman(number).to_ascii_lowercase()),
            MarkerStyle::UpperLatin => format!("{}.", to_latin(number)),
            MarkerStyle::LowerLatin => format!("{}.", to_latin(number).to_ascii_lowercase()),
            _ => String::new(),
        }
    }
}

fn to_roman(mut n: i32) -> String {
    if n <= 0 || n >= 4000 {
        return n.to_string();
    }
    const TABLE: [(i32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}

/// Highest number written as repeated letters (`ZZZ...` thirty times).
const MAX_LATIN: i32 = 26 * 30;

fn to_latin(n: i32) -> String {
    if n <= 0 || n > MAX_LATIN {
        return n.to_string();
    }
    let letter = (b'A' + ((n - 1) % 26) as u8) as char;
    std::iter::repeat_n(letter, ((n - 1) / 26 + 1) as usize).collect()
}

/// A single level in a list (for multi-level lists)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLevel {
    /// Number format (`\levelnfcN`)
    pub number_format: i32,
    /// Start value for numbering
    pub start_at: i32,
    /// Level text without its length prefix and terminator
    pub level_text: String,
}

impl Default for ListLevel {
    fn default() -> Self {
        Self {
            number_format: 0,
            start_at: 1,
            level_text: String::new(),
        }
    }
}

impl ListLevel {
    #[inline]
    pub fn marker_style(&self) -> MarkerStyle {
        MarkerStyle::from_number_format(self.number_format, &self.level_text)
    }

    /// Store the raw `\leveltext` content: a length character, the text,
    /// and a `;` terminator.
    pub fn set_raw_level_text(&mut self, raw: &str) {
        let mut chars = raw.chars();
        let declared = chars.next().map_or(0, |c| c as usize);
        let body: String = chars.take_while(|c| *c != ';').collect();
        self.level_text = if declared > 0 && declared < body.chars().count() {
            body.chars().take(declared).collect()
        } else {
            body
        };
    }
}

/// Levels of one list definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListLevelTable {
    levels: SmallVec<[ListLevel; 9]>,
}

impl ListLevelTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a level and return it.
    pub fn add(&mut self, level: ListLevel) -> &mut ListLevel {
        self.levels.push(level);
        let last = self.levels.len() - 1;
        &mut self.levels[last]
    }

    /// The most recently appended level.
    #[inline]
    pub fn current_entry(&mut self) -> Option<&mut ListLevel> {
        self.levels.last_mut()
    }

    /// Get a level by index
    #[inline]
    pub fn get(&self, level: usize) -> Option<&ListLevel> {
        self.levels.get(level)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// RTF list definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct List {
    /// Unique list identifier
    pub id: i32,
    /// List levels (up to 9 levels)
    pub levels: ListLevelTable,
}

impl List {
    #[inline]
    pub fn new(id: i32) -> Self {
        Self {
            id,
            levels: ListLevelTable::new(),
        }
    }
}

/// List table containing all list definitions
#[derive(Debug, Clone, Default)]
pub struct ListTable {
    lists: Vec<List>,
}

impl ListTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a list to the table
    #[inline]
    pub fn add(&mut self, list: List) {
        self.lists.push(list);
    }

    /// The list whose definition is currently being read.
    #[inline]
    pub fn current_entry(&mut self) -> Option<&mut List> {
        self.lists.last_mut()
    }

    /// Find a list by id.
    #[inline]
    pub fn find_entry(&self, id: i32) -> Option<&List> {
        self.lists.iter().find(|l| l.id == id)
    }

    #[inline]
    pub fn lists(&self) -> &[List] {
        &self.lists
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// List override entry (instance of a list)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOverride {
    /// Override index referenced by `\lsN`
    pub index: i32,
    /// Original list ID this overrides
    pub list_id: i32,
    /// Per-level start values from `\lfolevel` groups, in level order
    pub level_starts: SmallVec<[Option<i32>; 2]>,
}

impl ListOverride {
    #[inline]
    pub fn new(index: i32, list_id: i32) -> Self {
        Self {
            index,
            list_id,
            level_starts: SmallVec::new(),
        }
    }

    /// Start value override for `level`, if any.
    #[inline]
    pub fn start_at(&self, level: usize) -> Option<i32> {
        self.level_starts.get(level).copied().flatten()
    }
}

/// List override table containing list instances
#[derive(Debug, Clone, Default)]
pub struct ListOverrideTable {
    overrides: Vec<ListOverride>,
}

impl ListOverrideTable {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a list override
    #[inline]
    pub fn add(&mut self, entry: ListOverride) {
        self.overrides.push(entry);
    }

    /// The override currently being read.
    #[inline]
    pub fn current_entry(&mut self) -> Option<&mut ListOverride> {
        self.overrides.last_mut()
    }

    /// Find an override by its `\ls` index.
    #[inline]
    pub fn find_entry(&self, index: i32) -> Option<&ListOverride> {
        self.overrides.iter().find(|o| o.index == index)
    }

    #[inline]
    pub fn overrides(&self) -> &[ListOverride] {
        &self.overrides
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Marker and start index for level `level` of override `ls`.
///
/// `None` when the override or its list is missing; callers fall back to
/// default formatting.
pub fn resolve_marker(
    lists: &ListTable,
    overrides: &ListOverrideTable,
    ls: i32,
    level: usize,
) -> Option<(MarkerStyle, i32)> {
    let entry = overrides.find_entry(ls)?;
    let list = lists.find_entry(entry.list_id)?;
    let (style, start) = match list.levels.get(level).or_else(|| list.levels.get(0)) {
        Some(def) => (def.marker_style(), def.start_at),
        None => (MarkerStyle::default(), 1),
    };
    Some((style, entry.start_at(level).unwrap_or(start)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_list() -> (ListTable, ListOverrideTable) {
        let mut lists = ListTable::new();
        let mut list = List::new(7);
        list.levels.add(ListLevel {
            number_format: 2,
            start_at: 3,
            level_text: String::new(),
        });
        list.levels.add(ListLevel {
            number_format: 23,
            start_at: 1,
            level_text: "o".into(),
        });
        lists.add(list);

        let mut overrides = ListOverrideTable::new();
        overrides.add(ListOverride::new(1, 7));
        (lists, overrides)
    }

    #[test]
    fn test_resolve_marker() {
        let (lists, overrides) = numbered_list();
        assert_eq!(
            resolve_marker(&lists, &overrides, 1, 0),
            Some((MarkerStyle::LowerRoman, 3))
        );
        assert_eq!(
            resolve_marker(&lists, &overrides, 1, 1),
            Some((MarkerStyle::Circle, 1))
        );
    }

    #[test]
    fn test_find_entry_miss() {
        let (lists, overrides) = numbered_list();
        assert!(overrides.find_entry(42).is_none());
        assert!(lists.find_entry(42).is_none());
        assert_eq!(resolve_marker(&lists, &overrides, 42, 0), None);
    }

    #[test]
    fn test_override_start() {
        let (lists, mut overrides) = numbered_list();
        let mut entry = ListOverride::new(2, 7);
        entry.level_starts.push(Some(10));
        overrides.add(entry);
        assert_eq!(
            resolve_marker(&lists, &overrides, 2, 0),
            Some((MarkerStyle::LowerRoman, 10))
        );
    }

    #[test]
    fn test_current_entry_is_last_level() {
        let mut levels = ListLevelTable::new();
        levels.add(ListLevel::default());
        levels.add(ListLevel::default());
        levels.current_entry().unwrap().start_at = 5;
        assert_eq!(levels.get(1).unwrap().start_at, 5);
        assert_eq!(levels.get(0).unwrap().start_at, 1);
    }

    #[test]
    fn test_level_text() {
        let mut level = ListLevel::default();
        level.set_raw_level_text("\u{1}\u{2022};");
        assert_eq!(level.level_text, "\u{2022}");
        level.set_raw_level_text("\u{2}\u{0}.;");
        assert_eq!(level.level_text, "\u{0}.");
    }

    #[test]
    fn test_marker_text() {
        assert_eq!(MarkerStyle::Decimal.marker_text(3), "3.");
        assert_eq!(MarkerStyle::LowerRoman.marker_text(4), "iv.");
        assert_eq!(MarkerStyle::UpperLatin.marker_text(28), "BB.");
        assert_eq!(MarkerStyle::LowerLatin.marker_text(780), format!("{}.", "z".repeat(30)));
        assert_eq!(MarkerStyle::UpperLatin.marker_text(781), "781.");
        assert_eq!(MarkerStyle::UpperLatin.marker_text(i32::MAX), "2147483647.");
        assert_eq!(MarkerStyle::Disc.marker_text(1), "\u{2022}");
        assert_eq!(MarkerStyle::parse("Square"), Some(MarkerStyle::Square));
        assert_eq!(MarkerStyle::parse("Star"), None);
    }
}
