// IMAP4 ACL extension data, RFC 4314 (originally RFC 2086).

/// The three ACL response shapes, as stored in extension data. Which
/// variant is present is the extension's own sub-type tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AclData {
    Acl(Acl),
    ListRights(ListRights),
    MyRights(MyRights),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Acl {
    pub mailbox: String,
    pub acls: Vec<AclEntry>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AclEntry {
    pub identifier: String,
    pub rights: Vec<AclRight>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListRights {
    pub mailbox: String,
    pub identifier: String,
    pub required: Vec<AclRight>,
    pub optional: Vec<AclRight>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MyRights {
    pub mailbox: String,
    pub rights: Vec<AclRight>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AclRight {
    /// l - lookup (mailbox is visible to LIST/LSUB commands, SUBSCRIBE
    /// mailbox)
    Lookup,
    /// r - read (SELECT the mailbox, perform STATUS)
    Read,
    /// s - keep seen/unseen information across sessions
    Seen,
    /// w - write (set or clear flags other than \SEEN and \DELETED)
    Write,
    /// i - insert (perform APPEND, COPY into mailbox)
    Insert,
    /// p - post (send mail to submission address for mailbox)
    Post,
    /// k - create sub-mailboxes
    CreateMailbox,
    /// x - delete mailbox
    DeleteMailbox,
    /// t - delete messages (set or clear \DELETED flag)
    DeleteMessage,
    /// e - perform EXPUNGE and expunge as a part of CLOSE
    Expunge,
    /// a - administer (perform SETACL/DELETEACL/GETACL/LISTRIGHTS)
    Administer,
    /// n - write shared annotation values (RFC 5257)
    Annotation,
    /// c - old (deprecated) create, see RFC 4314 section 2.1.1
    OldCreate,
    /// d - old (deprecated) delete, see RFC 4314 section 2.1.1
    OldDelete,
    /// A custom right
    Custom(char),
}

impl From<char> for AclRight {
    fn from(c: char) -> Self {
        match c {
            'l' => AclRight::Lookup,
            'r' => AclRight::Read,
            's' => AclRight::Seen,
            'w' => AclRight::Write,
            'i' => AclRight::Insert,
            'p' => AclRight::Post,
            'k' => AclRight::CreateMailbox,
            'x' => AclRight::DeleteMailbox,
            't' => AclRight::DeleteMessage,
            'e' => AclRight::Expunge,
            'a' => AclRight::Administer,
            'n' => AclRight::Annotation,
            'c' => AclRight::OldCreate,
            'd' => AclRight::OldDelete,
            _ => AclRight::Custom(c),
        }
    }
}

impl From<AclRight> for char {
    fn from(right: AclRight) -> Self {
        match right {
            AclRight::Lookup => 'l',
            AclRight::Read => 'r',
            AclRight::Seen => 's',
            AclRight::Write => 'w',
            AclRight::Insert => 'i',
            AclRight::Post => 'p',
            AclRight::CreateMailbox => 'k',
            AclRight::DeleteMailbox => 'x',
            AclRight::DeleteMessage => 't',
            AclRight::Expunge => 'e',
            AclRight::Administer => 'a',
            AclRight::Annotation => 'n',
            AclRight::OldCreate => 'c',
            AclRight::OldDelete => 'd',
            AclRight::Custom(c) => c,
        }
    }
}

/// Renders a rights list back to its wire form, e.g. `lrswi`.
pub fn rights_to_string(rights: &[AclRight]) -> String {
    rights.iter().map(|r| char::from(*r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_acl_right() {
        assert_eq!(AclRight::from('l'), AclRight::Lookup);
        assert_eq!(AclRight::from('c'), AclRight::OldCreate);
        assert_eq!(AclRight::from('k'), AclRight::CreateMailbox);
        assert_eq!(AclRight::from('0'), AclRight::Custom('0'));
    }

    #[test]
    fn test_acl_right_to_char() {
        assert_eq!(char::from(AclRight::Lookup), 'l');
        assert_eq!(char::from(AclRight::OldCreate), 'c');
        assert_eq!(char::from(AclRight::CreateMailbox), 'k');
        assert_eq!(char::from(AclRight::Custom('0')), '0');
    }

    #[test]
    fn test_rights_round_trip() {
        let rights: Vec<AclRight> = "lrswi".chars().map(AclRight::from).collect();
        assert_eq!(rights_to_string(&rights), "lrswi");
    }
}
