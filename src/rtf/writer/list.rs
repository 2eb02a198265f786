//! List definitions generated for `List` elements.
//!
//! Every `List` element gets its own list definition with nine identical
//! levels and an override that points at it, so markers and start values
//! never depend on how deeply the list is nested.

use super::output::RtfOutput;
use crate::rtf::list::{
    List, ListLevel, ListOverride, ListOverrideTable, ListTable, MarkerStyle,
};

/// Number of levels of a list definition.
const LEVELS: usize = 9;

/// Placeholder of the level number in a level text.
const LEVEL_NUMBER: char = '\u{0}';

/// Indent added per list level, in twips.
const LEVEL_INDENT: i32 = 720;

#[derive(Debug, Default)]
pub struct ListRegistry {
    lists: ListTable,
    overrides: ListOverrideTable,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a list and return its override index (`\lsN`).
    pub fn define(&mut self, marker: MarkerStyle, start: i32) -> i32 {
        let index = self.lists.len() as i32 + 1;
        let mut list = List::new(index);
        for _ in 0..LEVELS {
            list.levels.add(ListLevel {
                number_format: marker.number_format(),
                start_at: start,
                level_text: level_text(marker),
            });
        }
        self.lists.add(list);
        self.overrides.add(ListOverride::new(index, index));
        index
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Write `\listtable` and `\listoverridetable`.
    pub fn write(&self, out: &mut RtfOutput) {
        if self.is_empty() {
            return;
        }
        out.ignorable_destination("listtable");
        for list in self.lists.lists() {
            out.open();
            out.control_word("list", None);
            out.control_word("listtemplateid", Some(list.id));
            for level_index in 0..list.levels.len() {
                if let Some(level) = list.levels.get(level_index) {
                    write_level(out, level, level_index);
                }
            }
            out.control_word("listid", Some(list.id));
            out.close();
        }
        out.close();

        out.ignorable_destination("listoverridetable");
        for entry in self.overrides.overrides() {
            out.open();
            out.control_word("listoverride", None);
            out.control_word("listid", Some(entry.list_id));
            out.control_word("listoverridecount", Some(0));
            out.control_word("ls", Some(entry.index));
            out.close();
        }
        out.close();
    }
}

fn write_level(out: &mut RtfOutput, level: &ListLevel, index: usize) {
    let numbered = level.level_text.contains(LEVEL_NUMBER);
    out.open();
    out.control_word("listlevel", None);
    out.control_word("levelnfc", Some(level.number_format));
    out.control_word("levelnfcn", Some(level.number_format));
    out.control_word("levelstartat", Some(level.start_at));

    out.open();
    out.control_word("leveltext", None);
    out.hex_byte(level.level_text.chars().count() as u8);
    for ch in level.level_text.chars() {
        if (ch as u32) < 0x20 {
            out.hex_byte(ch as u8);
        } else {
            let mut buf = [0u8; 4];
            out.text(ch.encode_utf8(&mut buf));
        }
    }
    out.raw(";");
    out.close();

    if numbered {
        out.open();
        out.control_word("levelnumbers", None);
        out.hex_byte(1);
        out.raw(";");
        out.close();
    }
    let indent = LEVEL_INDENT * (index as i32 + 1);
    out.control_word("fi", Some(-LEVEL_INDENT / 2));
    out.control_word("li", Some(indent));
    out.close();
}

/// Level text of a marker: the bullet itself, or the level number and a
/// period.
fn level_text(marker: MarkerStyle) -> String {
    match marker {
        MarkerStyle::None => String::new(),
        _ => match marker.bullet() {
            Some(bullet) => bullet.to_string(),
            None => format!("{}.", LEVEL_NUMBER),
        },
    }
}
