use std::borrow::Cow;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset};

use crate::extension::ExtensionData;

mod acl;
mod body;
mod command;
mod uidplus;

pub use self::acl::*;
pub use self::body::*;
pub use self::command::*;
pub use self::uidplus::*;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Protocol state of a connection, per RFC 3501 section 3.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Disconnected,
    NotAuthenticated,
    Authenticated,
    Selected,
    Logout,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,
    No,
    Bad,
    PreAuth,
    Bye,
}

/// One parsed unit of server output: a single untagged data line, a
/// continuation request, or a tagged completion (each including any
/// literals it carries).
#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum Response {
    Capabilities(Vec<Capability>),
    Continue(ContinueReq),
    Done(TaggedDone),
    Data {
        status: Status,
        code: Option<ResponseCode>,
        information: Option<String>,
    },
    Expunge(u32),
    Fetch(u32, Vec<AttributeValue>),
    MailboxData(MailboxDatum),
    /// Response data claimed by a registered extension.
    Extension(ExtensionData),
}

impl Response {
    /// Parses one response unit with the process-wide default registry.
    pub fn from_bytes(buf: &[u8]) -> crate::ParseResult<'_> {
        crate::parser::parse_response(buf, crate::extension::default_registry())
    }
}

#[derive(Debug, PartialEq)]
pub struct ContinueReq {
    pub code: Option<ResponseCode>,
    pub information: Option<String>,
}

#[derive(Debug, PartialEq)]
pub struct TaggedDone {
    pub tag: RequestId,
    pub status: Status,
    pub code: Option<ResponseCode>,
    pub information: Option<String>,
}

/// Untagged BYE, standing alone as the terminal element of a response
/// when the server closes the connection instead of completing the
/// command.
#[derive(Debug, PartialEq)]
pub struct Bye {
    pub code: Option<ResponseCode>,
    pub information: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum ResponseDone {
    Tagged(TaggedDone),
    Fatal(Bye),
}

/// Everything the server sent in reply to one command: data and
/// continuation units in wire order, then exactly one terminal element.
#[derive(Debug, PartialEq)]
pub struct CommandResponse {
    pub data: Vec<Response>,
    pub done: ResponseDone,
}

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum ResponseCode {
    Alert,
    /// `None` when the server did not list any charsets; `Some(vec![])`
    /// cannot occur on the wire (the list is non-empty when present).
    BadCharset(Option<Vec<String>>),
    Capabilities(Vec<Capability>),
    Parse,
    PermanentFlags(Vec<FlagPerm>),
    ReadOnly,
    ReadWrite,
    TryCreate,
    UidNext(u32),
    UidValidity(u32),
    Unseen(u32),
    /// A code claimed by a registered extension (APPENDUID, COPYUID, ...).
    Extension(ExtensionData),
    /// An unrecognized `atom [SP text]` code, kept verbatim.
    Other { atom: String, value: Option<String> },
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Capability {
    Imap4rev1,
    Auth(String),
    Atom(String),
}

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum MailboxDatum {
    Exists(u32),
    Recent(u32),
    Flags(Vec<Flag>),
    List(MailboxList),
    Lsub(MailboxList),
    Search(Vec<u32>),
    Status(StatusData),
    /// Mailbox data claimed by a registered extension.
    Extension(ExtensionData),
}

/// One `LIST`/`LSUB` line. `flags` is `None` when the server sent an
/// empty parenthesized list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MailboxList {
    pub flags: Option<MailboxListFlags>,
    pub delimiter: Option<char>,
    pub name: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MailboxListFlags {
    pub sflag: Option<MailboxSFlag>,
    pub oflags: Vec<MailboxOFlag>,
}

/// At most one selectability flag appears per mailbox.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MailboxSFlag {
    NoSelect,
    Marked,
    Unmarked,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MailboxOFlag {
    NoInferiors,
    Extension(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusData {
    pub mailbox: String,
    pub attributes: Vec<StatusAttribute>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum StatusAttribute {
    Messages(u32),
    Recent(u32),
    UidNext(u32),
    UidValidity(u32),
    Unseen(u32),
}

/// A system or keyword flag as it appears in `FLAGS`, store arguments
/// and permanent-flag lists.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Flag {
    Answered,
    Flagged,
    Deleted,
    Seen,
    Draft,
    Keyword(String),
    Extension(String),
}

impl Flag {
    /// Wire spelling, e.g. `\Answered` or a bare keyword atom.
    pub fn to_wire(&self) -> Cow<'_, str> {
        match self {
            Flag::Answered => Cow::Borrowed("\\Answered"),
            Flag::Flagged => Cow::Borrowed("\\Flagged"),
            Flag::Deleted => Cow::Borrowed("\\Deleted"),
            Flag::Seen => Cow::Borrowed("\\Seen"),
            Flag::Draft => Cow::Borrowed("\\Draft"),
            Flag::Keyword(kw) => Cow::Borrowed(kw),
            Flag::Extension(name) => Cow::Borrowed(name),
        }
    }
}

/// Flag as returned by FETCH; `\Recent` is valid here but not in store
/// arguments.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FlagFetch {
    Flag(Flag),
    Recent,
}

/// Flag as listed in a `PERMANENTFLAGS` code; `\*` means the server
/// accepts new keywords.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FlagPerm {
    Flag(Flag),
    All,
}

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum AttributeValue {
    /// msg-att-dynamic
    Flags(Vec<FlagFetch>),
    Envelope(Box<Envelope>),
    InternalDate(DateTime<FixedOffset>),
    Rfc822(Option<Bytes>),
    Rfc822Header(Option<Bytes>),
    Rfc822Size(u32),
    Rfc822Text(Option<Bytes>),
    Body(BodyStructure),
    BodyStructure(BodyStructure),
    BodySection {
        section: Option<SectionSpec>,
        origin: Option<u32>,
        data: Option<Bytes>,
    },
    Uid(u32),
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Envelope {
    pub date: Option<Vec<u8>>,
    pub subject: Option<Vec<u8>>,
    pub from: Option<Vec<Address>>,
    pub sender: Option<Vec<Address>>,
    pub reply_to: Option<Vec<Address>>,
    pub to: Option<Vec<Address>>,
    pub cc: Option<Vec<Address>>,
    pub bcc: Option<Vec<Address>>,
    pub in_reply_to: Option<Vec<u8>>,
    pub message_id: Option<Vec<u8>>,
}

/// One address in an envelope address list. A `None` mailbox ends a
/// mail group; a `Some` mailbox with `None` host starts one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Address {
    pub name: Option<Vec<u8>>,
    pub adl: Option<Vec<u8>>,
    pub mailbox: Option<Vec<u8>>,
    pub host: Option<Vec<u8>>,
}

/// Section path inside a `BODY[...]` fetch attribute or response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SectionSpec {
    MsgText(SectionMsgText),
    Part(Vec<u32>, Option<SectionText>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SectionMsgText {
    Header,
    HeaderFields(Vec<String>),
    HeaderFieldsNot(Vec<String>),
    Text,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SectionText {
    MsgText(SectionMsgText),
    Mime,
}
