// IMAP UIDPLUS extension data, RFC 4315.

use std::ops::RangeInclusive;

/// One element of a uid-set as returned in APPENDUID/COPYUID codes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UidSetMember {
    UidRange(RangeInclusive<u32>),
    Uid(u32),
}

impl From<RangeInclusive<u32>> for UidSetMember {
    fn from(x: RangeInclusive<u32>) -> Self {
        UidSetMember::UidRange(x)
    }
}

impl From<u32> for UidSetMember {
    fn from(x: u32) -> Self {
        UidSetMember::Uid(x)
    }
}

impl UidSetMember {
    /// First UID covered by this member.
    pub fn start(&self) -> u32 {
        match self {
            UidSetMember::UidRange(r) => *r.start(),
            UidSetMember::Uid(n) => *n,
        }
    }
}

/// The UIDPLUS response codes. Which variant is present is the
/// extension's own sub-type tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UidPlusData {
    AppendUid {
        uid_validity: u32,
        uids: Vec<UidSetMember>,
    },
    CopyUid {
        uid_validity: u32,
        source: Vec<UidSetMember>,
        dest: Vec<UidSetMember>,
    },
    UidNotSticky,
}
