//! Wire encoding for outgoing command arguments.

use std::borrow::Cow;
use std::fmt::{self, Write as _};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::parser::core::is_astring_char;
use crate::types::*;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum EncodeError {
    /// CR and LF can never appear in a command argument, not even in a
    /// quoted string or literal-free encoding.
    #[error("string contains a character illegal in a command argument: {0:?}")]
    IllegalChar(char),
}

/// Returns an escaped string if necessary for use as a "quoted" string per
/// the IMAPv4 RFC. Return value does not include surrounding quote characters.
/// Will return Err if the argument contains illegal characters.
///
/// Relevant definitions from RFC 3501 formal syntax:
///
/// string = quoted / literal [literal elided here]
/// quoted = DQUOTE *QUOTED-CHAR DQUOTE
/// QUOTED-CHAR = <any TEXT-CHAR except quoted-specials> / "\" quoted-specials
/// quoted-specials = DQUOTE / "\"
/// TEXT-CHAR = <any CHAR except CR and LF>
pub fn quoted_string(s: &str) -> Result<Cow<'_, str>, EncodeError> {
    let bytes = s.as_bytes();
    let (mut start, mut new) = (0, String::new());
    for (i, b) in bytes.iter().enumerate() {
        match *b {
            b'\r' | b'\n' => {
                return Err(EncodeError::IllegalChar(*b as char));
            }
            b'"' | b'\\' => {
                if start < i {
                    new.push_str(&s[start..i]);
                }
                new.push('\\');
                new.push(*b as char);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start == 0 {
        Ok(Cow::Borrowed(s))
    } else {
        if start < bytes.len() {
            new.push_str(&s[start..]);
        }
        Ok(Cow::Owned(new))
    }
}

/// Appends a mailbox name, always in quoted form.
pub fn mailbox(out: &mut Vec<u8>, name: &str) -> Result<(), EncodeError> {
    out.push(b'"');
    out.extend(quoted_string(name)?.as_bytes());
    out.push(b'"');
    Ok(())
}

/// Appends an astring: a bare atom when the characters allow it,
/// otherwise a quoted string.
pub fn astring(out: &mut Vec<u8>, s: &str) -> Result<(), EncodeError> {
    if !s.is_empty() && s.bytes().all(is_astring_char) {
        out.extend(s.as_bytes());
        Ok(())
    } else {
        out.push(b'"');
        out.extend(quoted_string(s)?.as_bytes());
        out.push(b'"');
        Ok(())
    }
}

/// `d-MMM-yyyy`, e.g. `7-Feb-2009`.
pub fn date(d: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    format!(
        "{}-{}-{}",
        d.day(),
        MONTHS[d.month0() as usize],
        d.year()
    )
}

impl fmt::Display for SeqBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeqBound::Num(n) => write!(f, "{n}"),
            SeqBound::Largest => f.write_char('*'),
        }
    }
}

impl fmt::Display for SetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

impl fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_char(',')?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

pub fn search_key(out: &mut Vec<u8>, key: &SearchKey) -> Result<(), EncodeError> {
    use SearchKey::*;
    match key {
        All => out.extend(b"ALL"),
        Answered => out.extend(b"ANSWERED"),
        Bcc(s) => keyed_astring(out, b"BCC", s)?,
        Before(d) => keyed_date(out, b"BEFORE", *d),
        Body(s) => keyed_astring(out, b"BODY", s)?,
        Cc(s) => keyed_astring(out, b"CC", s)?,
        Deleted => out.extend(b"DELETED"),
        Draft => out.extend(b"DRAFT"),
        Flagged => out.extend(b"FLAGGED"),
        From(s) => keyed_astring(out, b"FROM", s)?,
        Header(field, value) => {
            out.extend(b"HEADER ");
            astring(out, field)?;
            out.push(b' ');
            astring(out, value)?;
        }
        Keyword(s) => keyed_astring(out, b"KEYWORD", s)?,
        Larger(n) => {
            out.extend(b"LARGER ");
            out.extend(n.to_string().as_bytes());
        }
        New => out.extend(b"NEW"),
        Not(inner) => {
            out.extend(b"NOT ");
            search_key(out, inner)?;
        }
        Old => out.extend(b"OLD"),
        On(d) => keyed_date(out, b"ON", *d),
        Or(left, right) => {
            out.extend(b"OR ");
            search_key(out, left)?;
            out.push(b' ');
            search_key(out, right)?;
        }
        Recent => out.extend(b"RECENT"),
        Seen => out.extend(b"SEEN"),
        SentBefore(d) => keyed_date(out, b"SENTBEFORE", *d),
        SentOn(d) => keyed_date(out, b"SENTON", *d),
        SentSince(d) => keyed_date(out, b"SENTSINCE", *d),
        Since(d) => keyed_date(out, b"SINCE", *d),
        Smaller(n) => {
            out.extend(b"SMALLER ");
            out.extend(n.to_string().as_bytes());
        }
        Subject(s) => keyed_astring(out, b"SUBJECT", s)?,
        Text(s) => keyed_astring(out, b"TEXT", s)?,
        To(s) => keyed_astring(out, b"TO", s)?,
        Uid(set) => {
            out.extend(b"UID ");
            out.extend(set.to_string().as_bytes());
        }
        Unanswered => out.extend(b"UNANSWERED"),
        Undeleted => out.extend(b"UNDELETED"),
        Undraft => out.extend(b"UNDRAFT"),
        Unflagged => out.extend(b"UNFLAGGED"),
        Unkeyword(s) => keyed_astring(out, b"UNKEYWORD", s)?,
        Unseen => out.extend(b"UNSEEN"),
        And(keys) => {
            // a parenthesized list is itself a search-key, so the
            // conjunction nests anywhere
            out.push(b'(');
            for (idx, key) in keys.iter().enumerate() {
                if idx > 0 {
                    out.push(b' ');
                }
                search_key(out, key)?;
            }
            out.push(b')');
        }
        SeqSet(set) => out.extend(set.to_string().as_bytes()),
    }
    Ok(())
}

fn keyed_astring(out: &mut Vec<u8>, key: &[u8], value: &str) -> Result<(), EncodeError> {
    out.extend(key);
    out.push(b' ');
    astring(out, value)
}

fn keyed_date(out: &mut Vec<u8>, key: &[u8], value: NaiveDate) {
    out.extend(key);
    out.push(b' ');
    out.extend(date(value).as_bytes());
}

fn section_msgtext(out: &mut Vec<u8>, text: &SectionMsgText) -> Result<(), EncodeError> {
    match text {
        SectionMsgText::Header => out.extend(b"HEADER"),
        SectionMsgText::HeaderFields(fields) => {
            out.extend(b"HEADER.FIELDS (");
            append_fields(out, fields)?;
            out.push(b')');
        }
        SectionMsgText::HeaderFieldsNot(fields) => {
            out.extend(b"HEADER.FIELDS.NOT (");
            append_fields(out, fields)?;
            out.push(b')');
        }
        SectionMsgText::Text => out.extend(b"TEXT"),
    }
    Ok(())
}

fn append_fields(out: &mut Vec<u8>, fields: &[String]) -> Result<(), EncodeError> {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(b' ');
        }
        astring(out, field)?;
    }
    Ok(())
}

pub fn section(out: &mut Vec<u8>, spec: &Option<SectionSpec>) -> Result<(), EncodeError> {
    out.push(b'[');
    match spec {
        None => {}
        Some(SectionSpec::MsgText(text)) => section_msgtext(out, text)?,
        Some(SectionSpec::Part(part, text)) => {
            for (idx, num) in part.iter().enumerate() {
                if idx > 0 {
                    out.push(b'.');
                }
                out.extend(num.to_string().as_bytes());
            }
            match text {
                None => {}
                Some(SectionText::Mime) => out.extend(b".MIME"),
                Some(SectionText::MsgText(text)) => {
                    out.push(b'.');
                    section_msgtext(out, text)?;
                }
            }
        }
    }
    out.push(b']');
    Ok(())
}

pub fn fetch_att(out: &mut Vec<u8>, att: &FetchAtt) -> Result<(), EncodeError> {
    match att {
        FetchAtt::Envelope => out.extend(b"ENVELOPE"),
        FetchAtt::Flags => out.extend(b"FLAGS"),
        FetchAtt::InternalDate => out.extend(b"INTERNALDATE"),
        FetchAtt::Rfc822 => out.extend(b"RFC822"),
        FetchAtt::Rfc822Header => out.extend(b"RFC822.HEADER"),
        FetchAtt::Rfc822Size => out.extend(b"RFC822.SIZE"),
        FetchAtt::Rfc822Text => out.extend(b"RFC822.TEXT"),
        FetchAtt::Body => out.extend(b"BODY"),
        FetchAtt::BodyStructure => out.extend(b"BODYSTRUCTURE"),
        FetchAtt::Uid => out.extend(b"UID"),
        FetchAtt::BodySection {
            peek,
            section: spec,
            partial,
        } => {
            out.extend(if *peek {
                &b"BODY.PEEK"[..]
            } else {
                &b"BODY"[..]
            });
            section(out, spec)?;
            if let Some((origin, count)) = partial {
                out.push(b'<');
                out.extend(origin.to_string().as_bytes());
                out.push(b'.');
                out.extend(count.to_string().as_bytes());
                out.push(b'>');
            }
        }
    }
    Ok(())
}

pub fn fetch_type(out: &mut Vec<u8>, ty: &FetchType) -> Result<(), EncodeError> {
    match ty {
        FetchType::All => out.extend(b"ALL"),
        FetchType::Full => out.extend(b"FULL"),
        FetchType::Fast => out.extend(b"FAST"),
        FetchType::Att(att) => fetch_att(out, att)?,
        FetchType::AttList(atts) => {
            out.push(b'(');
            for (idx, att) in atts.iter().enumerate() {
                if idx > 0 {
                    out.push(b' ');
                }
                fetch_att(out, att)?;
            }
            out.push(b')');
        }
    }
    Ok(())
}

pub fn store_att_flags(out: &mut Vec<u8>, store: &StoreAttFlags) {
    match store.operation {
        StoreType::Replace => {}
        StoreType::Add => out.push(b'+'),
        StoreType::Remove => out.push(b'-'),
    }
    out.extend(b"FLAGS");
    if store.silent {
        out.extend(b".SILENT");
    }
    out.extend(b" (");
    for (idx, flag) in store.flags.iter().enumerate() {
        if idx > 0 {
            out.push(b' ');
        }
        out.extend(flag.to_wire().as_bytes());
    }
    out.push(b')');
}

pub fn status_att(out: &mut Vec<u8>, atts: &[StatusAtt]) {
    out.push(b'(');
    for (idx, att) in atts.iter().enumerate() {
        if idx > 0 {
            out.push(b' ');
        }
        out.extend(match att {
            StatusAtt::Messages => &b"MESSAGES"[..],
            StatusAtt::Recent => &b"RECENT"[..],
            StatusAtt::UidNext => &b"UIDNEXT"[..],
            StatusAtt::UidValidity => &b"UIDVALIDITY"[..],
            StatusAtt::Unseen => &b"UNSEEN"[..],
        });
    }
    out.push(b')');
}

/// Appends a flag list in parenthesized form, as used by APPEND.
pub fn flag_list(out: &mut Vec<u8>, flags: &[Flag]) {
    out.push(b'(');
    for (idx, flag) in flags.iter().enumerate() {
        if idx > 0 {
            out.push(b' ');
        }
        out.extend(flag.to_wire().as_bytes());
    }
    out.push(b')');
}
