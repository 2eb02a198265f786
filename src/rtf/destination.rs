//! Destinations and the routing of tokens to their handlers.
//!
//! Every group carries the destination its tokens feed. A destination
//! control word at the start of a group switches it; child groups inherit
//! it. When a group closes and the enclosing group has a different
//! destination, the destination is finished (a font entry is stored, a
//! picture is emitted, a field is resolved).

use super::control::Control;

/// Consumer of the tokens of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Destination {
    /// Document content
    #[default]
    Normal,
    ColorTable,
    FontTable,
    /// One `{\fN ...;}` entry inside the font table
    FontName,
    ListTable,
    List,
    ListLevel,
    LevelText,
    ListOverrideTable,
    ListOverride,
    ListOverrideLevel,
    Field,
    FieldInstruction,
    FieldResult,
    Shape,
    ShapeInstruction,
    ShapeResult,
    Picture,
    Object,
    ObjectResult,
    /// Discard everything up to the matching group end
    Skip,
}

/// Handler a destination's tokens are dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Text and formatting become document content
    Content,
    /// Channels and `;` build color entries
    ColorTable,
    /// Font numbers, families, charsets and names
    FontTable,
    /// List definitions and their levels
    ListTable,
    /// List instances
    ListOverrideTable,
    /// Text accumulates as a field instruction
    FieldInstruction,
    /// Picture properties and data
    Picture,
    /// Structural wrapper: only nested destinations matter
    Container,
    /// Everything is dropped
    Skip,
}

impl Destination {
    /// Handler of this destination.
    pub fn handler(self) -> Handler {
        match self {
            Destination::Normal
            | Destination::FieldResult
            | Destination::ShapeResult
            | Destination::ObjectResult => Handler::Content,
            Destination::ColorTable => Handler::ColorTable,
            Destination::FontTable | Destination::FontName => Handler::FontTable,
            Destination::ListTable
            | Destination::List
            | Destination::ListLevel
            | Destination::LevelText => Handler::ListTable,
            Destination::ListOverrideTable
            | Destination::ListOverride
            | Destination::ListOverrideLevel => Handler::ListOverrideTable,
            Destination::FieldInstruction => Handler::FieldInstruction,
            Destination::Picture => Handler::Picture,
            Destination::Field
            | Destination::Shape
            | Destination::ShapeInstruction
            | Destination::Object => Handler::Container,
            Destination::Skip => Handler::Skip,
        }
    }

    /// Whether text in this destination is document content.
    #[inline]
    pub fn is_content(self) -> bool {
        self.handler() == Handler::Content
    }

    /// Destination of a new group opened inside this one.
    #[inline]
    pub fn child_group(self) -> Destination {
        match self {
            Destination::FontTable => Destination::FontName,
            other => other,
        }
    }

    /// Destination selected by a destination control word appearing in a
    /// group whose current destination is `self`.
    ///
    /// Control words that make no sense where they appear select
    /// [`Destination::Skip`].
    pub fn enter(self, control: Control) -> Destination {
        use Destination as D;

        if self == D::Skip {
            return D::Skip;
        }
        let content = self.is_content();
        match control {
            Control::FontTable => D::FontTable,
            Control::ColorTable => D::ColorTable,
            Control::ListTable => D::ListTable,
            Control::List if self == D::ListTable => D::List,
            Control::ListLevel if self == D::List => D::ListLevel,
            Control::LevelText if self == D::ListLevel => D::LevelText,
            Control::ListOverrideTable => D::ListOverrideTable,
            Control::ListOverride if self == D::ListOverrideTable => D::ListOverride,
            Control::ListOverrideLevel if self == D::ListOverride => D::ListOverrideLevel,
            Control::Field if content => D::Field,
            Control::FieldInstruction if self == D::Field => D::FieldInstruction,
            Control::FieldResult if self == D::Field => D::FieldResult,
            Control::Shape if content => D::Shape,
            Control::ShapeInstruction if self == D::Shape => D::ShapeInstruction,
            Control::ShapeResult if self == D::Shape => D::ShapeResult,
            // Transparent wrapper around the picture of a shape
            Control::ShapePicture if content || self == D::ShapeInstruction => self,
            Control::Picture if content || self == D::ShapeInstruction => D::Picture,
            Control::Object if content => D::Object,
            Control::ObjectResult if self == D::Object => D::ObjectResult,
            _ => D::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing() {
        assert_eq!(Destination::Normal.enter(Control::ColorTable), Destination::ColorTable);
        assert_eq!(Destination::Normal.enter(Control::Field), Destination::Field);
        assert_eq!(
            Destination::Field.enter(Control::FieldInstruction),
            Destination::FieldInstruction
        );
        assert_eq!(Destination::Normal.enter(Control::FieldResult), Destination::Skip);
        assert_eq!(Destination::Normal.enter(Control::SkipDestination), Destination::Skip);
        assert_eq!(Destination::Skip.enter(Control::Picture), Destination::Skip);
        assert_eq!(Destination::Normal.enter(Control::ShapePicture), Destination::Normal);
        assert_eq!(Destination::Normal.enter(Control::NonShapePicture), Destination::Skip);
    }

    #[test]
    fn test_handlers() {
        assert!(Destination::FieldResult.is_content());
        assert!(!Destination::FieldInstruction.is_content());
        assert_eq!(Destination::FontName.handler(), Handler::FontTable);
        assert_eq!(Destination::FontTable.child_group(), Destination::FontName);
        assert_eq!(Destination::LevelText.handler(), Handler::ListTable);
    }
}
