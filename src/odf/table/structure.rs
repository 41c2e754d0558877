//! Ordering of a table's direct children.
//!
//! A table's children fall into three disjoint classes: prelude tags that
//! must come first, the data area (rows, columns and their grouping
//! containers), and epilogue tags that must come last. Every insertion at
//! a position-sensitive location asks a [`TagBlock`] or the
//! [`StructureOrganizer`] where the new child belongs.

use crate::common::{Error, Result};
use crate::odf::elements::element::{Element, ElementBase};
use log::{debug, warn};

/// Prelude tags of `table:table`, in schema order
pub const TABLE_PRELUDE: &[&str] = &[
    "table:title",
    "table:desc",
    "table:table-source",
    "office:dde-source",
    "table:scenario",
    "office:forms",
    "table:shapes",
];

/// Epilogue tags of `table:table`, in schema order
pub const TABLE_EPILOGUE: &[&str] = &[
    "table:named-expressions",
    "table:database-ranges",
    "table:data-pilot-tables",
    "table:consolidation",
    "table:dde-links",
];

/// Which end of the parent a block sits at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Prelude,
    Epilogue,
}

/// Where a tag's children sit inside the parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagInfo {
    /// No child carries the tag
    Absent,
    /// One contiguous run of `count` children starting at `start`
    Run { start: usize, count: usize },
    /// The tag appears outside its block or in several runs
    Misplaced,
}

/// An ordered set of tags that must sit together at one end of a parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBlock {
    kind: BlockKind,
    tags: Vec<String>,
}

impl TagBlock {
    /// Create a block from its tags in declared order.
    ///
    /// An empty tag list or a repeated tag is a configuration error.
    pub fn new<I, S>(kind: BlockKind, tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if tags.is_empty() {
            return Err(Error::Structure(format!("{:?} block has no tags", kind)));
        }
        for (i, tag) in tags.iter().enumerate() {
            if tags[..i].contains(tag) {
                return Err(Error::Structure(format!(
                    "{:?} block lists '{}' more than once",
                    kind, tag
                )));
            }
        }
        Ok(Self { kind, tags })
    }

    fn from_static(kind: BlockKind, tags: &[&str]) -> Self {
        Self {
            kind,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    /// Tags in declared order
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether `tag` belongs to the block
    pub fn contains(&self, tag: &str) -> bool {
        self.rank(tag).is_some()
    }

    fn rank(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t == tag)
    }

    fn member_rank(&self, tag: &str) -> Result<usize> {
        self.rank(tag).ok_or_else(|| {
            Error::invalid_argument(format!("'{}' is not a {:?} tag", tag, self.kind))
        })
    }

    /// Index range the block currently occupies in `parent`
    pub fn bounds(&self, parent: &Element) -> (usize, usize) {
        let children = parent.children();
        match self.kind {
            BlockKind::Prelude => {
                let end = children
                    .iter()
                    .position(|c| !self.contains(c.tag_name()))
                    .unwrap_or(children.len());
                (0, end)
            },
            BlockKind::Epilogue => {
                let start = children
                    .iter()
                    .rposition(|c| !self.contains(c.tag_name()))
                    .map_or(0, |i| i + 1);
                (start, children.len())
            },
        }
    }

    /// Locate the children carrying `tag`.
    pub fn tag_info(&self, parent: &Element, tag: &str) -> Result<TagInfo> {
        self.member_rank(tag)?;

        let mut positions = parent
            .children()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.tag_name() == tag)
            .map(|(i, _)| i);

        let Some(start) = positions.next() else {
            return Ok(TagInfo::Absent);
        };
        let mut count = 1;
        for i in positions {
            if i != start + count {
                warn!("<{}> appears in several runs under <{}>", tag, parent.tag_name());
                return Ok(TagInfo::Misplaced);
            }
            count += 1;
        }

        let (block_start, block_end) = self.bounds(parent);
        if start < block_start || start + count > block_end {
            warn!(
                "<{}> sits outside the {:?} block of <{}>",
                tag,
                self.kind,
                parent.tag_name()
            );
            return Ok(TagInfo::Misplaced);
        }
        Ok(TagInfo::Run { start, count })
    }

    /// Index at which a new `tag` child goes in front of the existing ones.
    ///
    /// With `None`, the start of the block.
    pub fn insert_position_before(&self, parent: &Element, tag: Option<&str>) -> Result<usize> {
        self.insert_position(parent, tag, false)
    }

    /// Index at which a new `tag` child goes behind the existing ones.
    ///
    /// With `None`, the end of the block.
    pub fn insert_position_after(&self, parent: &Element, tag: Option<&str>) -> Result<usize> {
        self.insert_position(parent, tag, true)
    }

    fn insert_position(&self, parent: &Element, tag: Option<&str>, after: bool) -> Result<usize> {
        let (block_start, block_end) = self.bounds(parent);
        let Some(tag) = tag else {
            return Ok(if after { block_end } else { block_start });
        };

        match self.tag_info(parent, tag)? {
            TagInfo::Run { start, count } => Ok(if after { start + count } else { start }),
            TagInfo::Misplaced => Err(Error::Structure(format!(
                "<{}> is misplaced under <{}>",
                tag,
                parent.tag_name()
            ))),
            TagInfo::Absent => {
                // First block member declared later than `tag`
                let rank = self.member_rank(tag)?;
                let position = parent.children()[block_start..block_end]
                    .iter()
                    .position(|c| self.rank(c.tag_name()).is_some_and(|r| r > rank))
                    .map_or(block_end, |i| block_start + i);
                Ok(position)
            },
        }
    }
}

/// Prelude / data / epilogue ordering of a parent's children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureOrganizer {
    prelude: TagBlock,
    epilogue: TagBlock,
}

impl Default for StructureOrganizer {
    fn default() -> Self {
        Self::table()
    }
}

impl StructureOrganizer {
    /// Combine two blocks; they must be of the right kinds and share no tag.
    pub fn new(prelude: TagBlock, epilogue: TagBlock) -> Result<Self> {
        if prelude.kind != BlockKind::Prelude || epilogue.kind != BlockKind::Epilogue {
            return Err(Error::Structure(
                "organizer needs one prelude and one epilogue block".to_string(),
            ));
        }
        if let Some(tag) = prelude.tags.iter().find(|t| epilogue.contains(t)) {
            return Err(Error::Structure(format!(
                "'{}' is in both the prelude and the epilogue",
                tag
            )));
        }
        Ok(Self { prelude, epilogue })
    }

    /// Organizer for `table:table`
    pub fn table() -> Self {
        Self {
            prelude: TagBlock::from_static(BlockKind::Prelude, TABLE_PRELUDE),
            epilogue: TagBlock::from_static(BlockKind::Epilogue, TABLE_EPILOGUE),
        }
    }

    pub fn prelude(&self) -> &TagBlock {
        &self.prelude
    }

    pub fn epilogue(&self) -> &TagBlock {
        &self.epilogue
    }

    /// First index after the prelude block
    pub fn data_start(&self, parent: &Element) -> usize {
        self.prelude.bounds(parent).1
    }

    /// First index of the epilogue block
    pub fn data_end(&self, parent: &Element) -> usize {
        self.epilogue.bounds(parent).0.max(self.data_start(parent))
    }

    /// Whether every prelude child precedes the data area and every
    /// epilogue child follows it
    pub fn is_ordered(&self, parent: &Element) -> bool {
        let start = self.data_start(parent);
        let end = self.data_end(parent);
        parent.children()[start..end].iter().all(|c| {
            !self.prelude.contains(c.tag_name()) && !self.epilogue.contains(c.tag_name())
        })
    }

    /// Move prelude children to the front and epilogue children to the
    /// back.
    ///
    /// Prelude and epilogue children are grouped by declared tag order and
    /// keep their document order within a tag. The data area keeps its
    /// relative order. Returns whether anything moved.
    pub fn reorder(&self, parent: &mut Element) -> bool {
        let key = |el: &Element| {
            let tag = el.tag_name();
            if let Some(rank) = self.prelude.rank(tag) {
                (0, rank)
            } else if let Some(rank) = self.epilogue.rank(tag) {
                (2, rank)
            } else {
                (1, 0)
            }
        };

        let mut order: Vec<usize> = (0..parent.child_count()).collect();
        order.sort_by_key(|&i| key(&parent.children()[i]));
        if order.iter().enumerate().all(|(pos, &i)| pos == i) {
            return false;
        }

        let mut slots: Vec<Option<Element>> = parent.take_children().into_iter().map(Some).collect();
        parent
            .children_mut()
            .extend(order.into_iter().filter_map(|i| slots[i].take()));
        debug!("reordered structural children of <{}>", parent.tag_name());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(tags: &[&str]) -> Element {
        tags.iter()
            .fold(Element::new("table:table"), |el, tag| el.with_child(Element::new(tag)))
    }

    fn tags(el: &Element) -> Vec<&str> {
        el.children().iter().map(Element::tag_name).collect()
    }

    #[test]
    fn test_block_construction_errors() {
        assert!(matches!(
            TagBlock::new(BlockKind::Prelude, Vec::<String>::new()),
            Err(Error::Structure(_))
        ));
        assert!(matches!(
            TagBlock::new(BlockKind::Prelude, ["a", "b", "a"]),
            Err(Error::Structure(_))
        ));

        let prelude = TagBlock::new(BlockKind::Prelude, ["x", "y"]).unwrap();
        let epilogue = TagBlock::new(BlockKind::Epilogue, ["y", "z"]).unwrap();
        assert!(StructureOrganizer::new(prelude.clone(), epilogue).is_err());
        let swapped = TagBlock::new(BlockKind::Prelude, ["z"]).unwrap();
        assert!(StructureOrganizer::new(prelude, swapped).is_err());
    }

    #[test]
    fn test_data_bounds() {
        let organizer = StructureOrganizer::table();
        let el = parent(&[
            "table:title",
            "table:desc",
            "table:table-column",
            "table:table-row",
            "table:named-expressions",
        ]);
        assert_eq!(organizer.data_start(&el), 2);
        assert_eq!(organizer.data_end(&el), 4);
        assert!(organizer.is_ordered(&el));

        let empty = parent(&[]);
        assert_eq!(organizer.data_start(&empty), 0);
        assert_eq!(organizer.data_end(&empty), 0);
    }

    #[test]
    fn test_tag_info() {
        let organizer = StructureOrganizer::table();
        let prelude = organizer.prelude();
        let el = parent(&["table:title", "table:desc", "table:desc", "table:table-row"]);

        assert_eq!(
            prelude.tag_info(&el, "table:desc").unwrap(),
            TagInfo::Run { start: 1, count: 2 }
        );
        assert_eq!(prelude.tag_info(&el, "table:shapes").unwrap(), TagInfo::Absent);
        assert!(matches!(
            prelude.tag_info(&el, "table:table-row"),
            Err(Error::InvalidArgument(_))
        ));

        let split = parent(&["table:title", "table:table-row", "table:title"]);
        assert_eq!(prelude.tag_info(&split, "table:title").unwrap(), TagInfo::Misplaced);

        let late = parent(&["table:table-row", "table:desc"]);
        assert_eq!(prelude.tag_info(&late, "table:desc").unwrap(), TagInfo::Misplaced);
    }

    #[test]
    fn test_insert_positions() {
        let organizer = StructureOrganizer::table();
        let prelude = organizer.prelude();
        let epilogue = organizer.epilogue();
        let el = parent(&[
            "table:title",
            "table:shapes",
            "table:table-row",
            "table:database-ranges",
        ]);

        assert_eq!(prelude.insert_position_before(&el, None).unwrap(), 0);
        assert_eq!(prelude.insert_position_after(&el, None).unwrap(), 2);
        assert_eq!(prelude.insert_position_after(&el, Some("table:title")).unwrap(), 1);
        // desc is absent and declared between title and shapes
        assert_eq!(prelude.insert_position_before(&el, Some("table:desc")).unwrap(), 1);

        assert_eq!(epilogue.insert_position_before(&el, None).unwrap(), 3);
        assert_eq!(epilogue.insert_position_after(&el, None).unwrap(), 4);
        assert_eq!(
            epilogue.insert_position_before(&el, Some("table:named-expressions")).unwrap(),
            3
        );
        assert_eq!(epilogue.insert_position_after(&el, Some("table:dde-links")).unwrap(), 4);

        let broken = parent(&["table:table-row", "table:title"]);
        assert!(matches!(
            prelude.insert_position_after(&broken, Some("table:title")),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn test_reorder() {
        let organizer = StructureOrganizer::table();
        let mut el = parent(&[
            "table:table-row",
            "table:desc",
            "table:named-expressions",
            "table:table-column",
            "table:title",
            "table:dde-links",
            "table:database-ranges",
        ]);
        assert!(!organizer.is_ordered(&el));
        assert!(organizer.reorder(&mut el));
        assert_eq!(
            tags(&el),
            vec![
                "table:title",
                "table:desc",
                "table:table-row",
                "table:table-column",
                "table:named-expressions",
                "table:database-ranges",
                "table:dde-links",
            ]
        );
        assert!(organizer.is_ordered(&el));
        assert!(!organizer.reorder(&mut el));
    }
}
