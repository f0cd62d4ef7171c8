//! Argument trees for outgoing commands: message sets, search keys,
//! fetch descriptors and store descriptors. Wire encoding lives in
//! [`crate::builders`].

use chrono::NaiveDate;

use super::{Flag, SectionMsgText, SectionSpec, SectionText};

/// One bound of a set interval. `Largest` is the `*` sentinel, the
/// highest number in use in the mailbox.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeqBound {
    Num(u32),
    Largest,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SetItem {
    pub first: SeqBound,
    pub last: SeqBound,
}

impl SetItem {
    pub fn single(index: u32) -> SetItem {
        SetItem {
            first: SeqBound::Num(index),
            last: SeqBound::Num(index),
        }
    }

    pub fn interval(first: u32, last: u32) -> SetItem {
        SetItem {
            first: SeqBound::Num(first),
            last: SeqBound::Num(last),
        }
    }

    /// `first:*`
    pub fn from(first: u32) -> SetItem {
        SetItem {
            first: SeqBound::Num(first),
            last: SeqBound::Largest,
        }
    }
}

/// A message set: an ordered union of single indices and intervals,
/// addressing messages by sequence number or UID depending on the
/// command it is used with.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SequenceSet {
    pub items: Vec<SetItem>,
}

impl SequenceSet {
    pub fn new(items: Vec<SetItem>) -> SequenceSet {
        SequenceSet { items }
    }

    pub fn empty() -> SequenceSet {
        SequenceSet { items: Vec::new() }
    }

    pub fn single(index: u32) -> SequenceSet {
        SequenceSet {
            items: vec![SetItem::single(index)],
        }
    }

    pub fn interval(first: u32, last: u32) -> SequenceSet {
        SequenceSet {
            items: vec![SetItem::interval(first, last)],
        }
    }

    /// `first:*`
    pub fn from(first: u32) -> SequenceSet {
        SequenceSet {
            items: vec![SetItem::from(first)],
        }
    }

    pub fn add(&mut self, item: SetItem) {
        self.items.push(item);
    }

    pub fn add_single(&mut self, index: u32) {
        self.items.push(SetItem::single(index));
    }

    pub fn add_interval(&mut self, first: u32, last: u32) {
        self.items.push(SetItem::interval(first, last));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The search-key production. `And` is the implicit space-joined
/// conjunction, rendered parenthesized when nested.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SearchKey {
    All,
    Answered,
    Bcc(String),
    Before(NaiveDate),
    Body(String),
    Cc(String),
    Deleted,
    Draft,
    Flagged,
    From(String),
    Header(String, String),
    Keyword(String),
    Larger(u32),
    New,
    Not(Box<SearchKey>),
    Old,
    On(NaiveDate),
    Or(Box<SearchKey>, Box<SearchKey>),
    Recent,
    Seen,
    SentBefore(NaiveDate),
    SentOn(NaiveDate),
    SentSince(NaiveDate),
    Since(NaiveDate),
    Smaller(u32),
    Subject(String),
    Text(String),
    To(String),
    Uid(SequenceSet),
    Unanswered,
    Undeleted,
    Undraft,
    Unflagged,
    Unkeyword(String),
    Unseen,
    And(Vec<SearchKey>),
    SeqSet(SequenceSet),
}

impl SearchKey {
    pub fn not(key: SearchKey) -> SearchKey {
        SearchKey::Not(Box::new(key))
    }

    pub fn or(left: SearchKey, right: SearchKey) -> SearchKey {
        SearchKey::Or(Box::new(left), Box::new(right))
    }
}

/// What FETCH should return: one of the three macros, a single
/// attribute, or an explicit attribute list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchType {
    All,
    Full,
    Fast,
    Att(FetchAtt),
    AttList(Vec<FetchAtt>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum FetchAtt {
    Envelope,
    Flags,
    InternalDate,
    Rfc822,
    Rfc822Header,
    Rfc822Size,
    Rfc822Text,
    Body,
    BodyStructure,
    Uid,
    BodySection {
        peek: bool,
        section: Option<SectionSpec>,
        /// `<origin.count>` partial-range suffix.
        partial: Option<(u32, u32)>,
    },
}

impl FetchAtt {
    pub fn body_section(section: Option<SectionSpec>, partial: Option<(u32, u32)>) -> FetchAtt {
        FetchAtt::BodySection {
            peek: false,
            section,
            partial,
        }
    }

    pub fn body_peek_section(
        section: Option<SectionSpec>,
        partial: Option<(u32, u32)>,
    ) -> FetchAtt {
        FetchAtt::BodySection {
            peek: true,
            section,
            partial,
        }
    }
}

impl SectionSpec {
    pub fn header() -> SectionSpec {
        SectionSpec::MsgText(SectionMsgText::Header)
    }

    pub fn header_fields(fields: Vec<String>) -> SectionSpec {
        SectionSpec::MsgText(SectionMsgText::HeaderFields(fields))
    }

    pub fn header_fields_not(fields: Vec<String>) -> SectionSpec {
        SectionSpec::MsgText(SectionMsgText::HeaderFieldsNot(fields))
    }

    pub fn text() -> SectionSpec {
        SectionSpec::MsgText(SectionMsgText::Text)
    }

    pub fn part(part: Vec<u32>) -> SectionSpec {
        SectionSpec::Part(part, None)
    }

    pub fn part_mime(part: Vec<u32>) -> SectionSpec {
        SectionSpec::Part(part, Some(SectionText::Mime))
    }

    pub fn part_text(part: Vec<u32>, text: SectionMsgText) -> SectionSpec {
        SectionSpec::Part(part, Some(SectionText::MsgText(text)))
    }
}

/// Direction of a STORE flag update.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreType {
    Replace,
    Add,
    Remove,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoreAttFlags {
    pub operation: StoreType,
    pub silent: bool,
    pub flags: Vec<Flag>,
}

impl StoreAttFlags {
    pub fn set(flags: Vec<Flag>) -> StoreAttFlags {
        StoreAttFlags {
            operation: StoreType::Replace,
            silent: false,
            flags,
        }
    }

    pub fn set_silent(flags: Vec<Flag>) -> StoreAttFlags {
        StoreAttFlags {
            operation: StoreType::Replace,
            silent: true,
            flags,
        }
    }

    pub fn add(flags: Vec<Flag>) -> StoreAttFlags {
        StoreAttFlags {
            operation: StoreType::Add,
            silent: false,
            flags,
        }
    }

    pub fn add_silent(flags: Vec<Flag>) -> StoreAttFlags {
        StoreAttFlags {
            operation: StoreType::Add,
            silent: true,
            flags,
        }
    }

    pub fn remove(flags: Vec<Flag>) -> StoreAttFlags {
        StoreAttFlags {
            operation: StoreType::Remove,
            silent: false,
            flags,
        }
    }

    pub fn remove_silent(flags: Vec<Flag>) -> StoreAttFlags {
        StoreAttFlags {
            operation: StoreType::Remove,
            silent: true,
            flags,
        }
    }
}

/// Items requestable with STATUS.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusAtt {
    Messages,
    Recent,
    UidNext,
    UidValidity,
    Unseen,
}
