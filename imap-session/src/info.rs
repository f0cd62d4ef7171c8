//! Per-connection and per-command accumulated response state.

use imap_model::{
    AttributeValue, Capability, ExtensionData, Flag, FlagPerm, MailboxList, StatusData,
};

/// Information about the connection itself, kept for the connection's
/// lifetime and refreshed whenever the server advertises capabilities.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConnectionInfo {
    pub capabilities: Option<Vec<Capability>>,
}

impl ConnectionInfo {
    /// Literal token match against the advertised capability list.
    pub fn has_capability(&self, name: &str) -> bool {
        match &self.capabilities {
            Some(caps) => caps.iter().any(|cap| match cap {
                Capability::Imap4rev1 => name == "IMAP4rev1",
                Capability::Atom(atom) => atom == name,
                Capability::Auth(_) => false,
            }),
            None => false,
        }
    }
}

/// Mailbox access mode reported at selection time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

/// Information about the currently selected mailbox. Created fresh on
/// SELECT/EXAMINE and updated in place by untagged data afterwards.
///
/// `perm_flags` distinguishes a `PERMANENTFLAGS ()` code (present,
/// empty) from the code never having been sent (`None`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionInfo {
    pub perm_flags: Option<Vec<FlagPerm>>,
    pub access: Option<Access>,
    pub uid_next: Option<u32>,
    pub uid_validity: Option<u32>,
    pub first_unseen: Option<u32>,
    pub flags: Option<Vec<Flag>>,
    pub exists: Option<u32>,
    pub recent: Option<u32>,
    pub unseen: Option<u32>,
}

/// One FETCH response line.
#[derive(Debug, PartialEq)]
pub struct FetchedMessage {
    pub number: u32,
    pub attributes: Vec<AttributeValue>,
}

/// Everything else the last command returned. Replaced wholesale at
/// the start of every command so nothing leaks across commands.
#[derive(Debug, Default)]
pub struct ResponseInfo {
    pub alert: Option<String>,
    pub parse: Option<String>,
    /// `Some(vec![])` when the server sent BADCHARSET without a list.
    pub badcharset: Option<Vec<String>>,
    pub trycreate: bool,
    pub mailbox_list: Vec<MailboxList>,
    pub mailbox_lsub: Vec<MailboxList>,
    pub search_result: Vec<u32>,
    pub status: Option<StatusData>,
    pub expunged: Vec<u32>,
    pub fetch_list: Vec<FetchedMessage>,
    /// Extension data no command-specific helper has claimed yet, in
    /// wire order.
    pub extension_list: Vec<ExtensionData>,
    /// Unrecognized resp-text-code atom, kept verbatim.
    pub atom: Option<String>,
    pub value: Option<String>,
}
