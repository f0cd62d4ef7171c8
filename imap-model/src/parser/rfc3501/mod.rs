//!
//! <https://tools.ietf.org/html/rfc3501>
//!
//! INTERNET MESSAGE ACCESS PROTOCOL
//!

use std::str;

use chrono::{DateTime, FixedOffset};
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take_while, take_while1},
    character::streaming::{char, none_of, one_of},
    combinator::{map, map_res, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::{
    extension::{CallingProduction, Registry},
    parser::{
        core::*,
        rfc3501::{body::*, body_structure::*},
        ParseResult,
    },
    types::*,
};

pub mod body;
pub mod body_structure;

fn is_tag_char(c: u8) -> bool {
    c != b'+' && is_astring_char(c)
}

fn status_ok(i: &[u8]) -> IResult<&[u8], Status> {
    map(tag_no_case("OK"), |_s| Status::Ok)(i)
}

fn status_no(i: &[u8]) -> IResult<&[u8], Status> {
    map(tag_no_case("NO"), |_s| Status::No)(i)
}

fn status_bad(i: &[u8]) -> IResult<&[u8], Status> {
    map(tag_no_case("BAD"), |_s| Status::Bad)(i)
}

fn status_preauth(i: &[u8]) -> IResult<&[u8], Status> {
    map(tag_no_case("PREAUTH"), |_s| Status::PreAuth)(i)
}

fn status_bye(i: &[u8]) -> IResult<&[u8], Status> {
    map(tag_no_case("BYE"), |_s| Status::Bye)(i)
}

fn status(i: &[u8]) -> IResult<&[u8], Status> {
    alt((status_ok, status_no, status_bad, status_preauth, status_bye))(i)
}

pub(crate) fn mailbox(i: &[u8]) -> IResult<&[u8], &str> {
    map(astring_utf8, |s| {
        if s.eq_ignore_ascii_case("INBOX") {
            "INBOX"
        } else {
            s
        }
    })(i)
}

fn flag_extension_str(i: &[u8]) -> IResult<&[u8], &str> {
    map_res(
        recognize(pair(tag("\\"), take_while(is_atom_char))),
        str::from_utf8,
    )(i)
}

pub(crate) fn flag(i: &[u8]) -> IResult<&[u8], Flag> {
    alt((
        map(tag_no_case("\\Answered"), |_| Flag::Answered),
        map(tag_no_case("\\Flagged"), |_| Flag::Flagged),
        map(tag_no_case("\\Deleted"), |_| Flag::Deleted),
        map(tag_no_case("\\Seen"), |_| Flag::Seen),
        map(tag_no_case("\\Draft"), |_| Flag::Draft),
        map(flag_extension_str, |s| Flag::Extension(s.to_owned())),
        map(atom, |s| Flag::Keyword(s.to_owned())),
    ))(i)
}

pub(crate) fn flag_list(i: &[u8]) -> IResult<&[u8], Vec<Flag>> {
    parenthesized_list(flag)(i)
}

pub(crate) fn flag_fetch(i: &[u8]) -> IResult<&[u8], FlagFetch> {
    alt((
        map(tag_no_case("\\Recent"), |_| FlagFetch::Recent),
        map(flag, FlagFetch::Flag),
    ))(i)
}

pub(crate) fn flag_perm(i: &[u8]) -> IResult<&[u8], FlagPerm> {
    alt((
        map(tag("\\*"), |_| FlagPerm::All),
        map(flag, FlagPerm::Flag),
    ))(i)
}

// date-time = DQUOTE date-day-fixed "-" date-month "-" date-year SP time SP zone DQUOTE
pub(crate) fn date_time(i: &[u8]) -> IResult<&[u8], DateTime<FixedOffset>> {
    map_res(quoted_utf8, |s| {
        DateTime::parse_from_str(s, "%e-%b-%Y %H:%M:%S %z")
    })(i)
}

// ----- resp-text and resp-text-code -----

fn resp_text_code_alert(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(tag_no_case("ALERT"), |_| ResponseCode::Alert)(i)
}

fn resp_text_code_badcharset(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(
        preceded(
            tag_no_case("BADCHARSET"),
            opt(preceded(
                tag(" "),
                parenthesized_nonempty_list(map(astring_utf8, str::to_owned)),
            )),
        ),
        ResponseCode::BadCharset,
    )(i)
}

fn resp_text_code_capability(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(capability_data, ResponseCode::Capabilities)(i)
}

fn resp_text_code_parse(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(tag_no_case("PARSE"), |_| ResponseCode::Parse)(i)
}

fn resp_text_code_permanent_flags(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(
        preceded(
            tag_no_case("PERMANENTFLAGS "),
            parenthesized_list(flag_perm),
        ),
        ResponseCode::PermanentFlags,
    )(i)
}

fn resp_text_code_read_only(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(tag_no_case("READ-ONLY"), |_| ResponseCode::ReadOnly)(i)
}

fn resp_text_code_read_write(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(tag_no_case("READ-WRITE"), |_| ResponseCode::ReadWrite)(i)
}

fn resp_text_code_try_create(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(tag_no_case("TRYCREATE"), |_| ResponseCode::TryCreate)(i)
}

fn resp_text_code_uid_validity(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(
        preceded(tag_no_case("UIDVALIDITY "), number),
        ResponseCode::UidValidity,
    )(i)
}

fn resp_text_code_uid_next(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(
        preceded(tag_no_case("UIDNEXT "), number),
        ResponseCode::UidNext,
    )(i)
}

fn resp_text_code_unseen(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    map(
        preceded(tag_no_case("UNSEEN "), number),
        ResponseCode::Unseen,
    )(i)
}

// resp-text-code =/ atom [SP 1*<any TEXT-CHAR except "]">]
fn resp_text_code_other(i: &[u8]) -> IResult<&[u8], ResponseCode> {
    let (i, a) = atom(i)?;
    let (i, value) = opt(preceded(
        tag(" "),
        map_res(
            take_while1(|c| is_text_char(c) && c != b']'),
            str::from_utf8,
        ),
    ))(i)?;
    Ok((
        i,
        ResponseCode::Other {
            atom: a.to_owned(),
            value: value.map(str::to_owned),
        },
    ))
}

fn resp_text_code<'a>(i: &'a [u8], registry: &Registry) -> IResult<&'a [u8], ResponseCode> {
    alt((
        resp_text_code_alert,
        resp_text_code_badcharset,
        resp_text_code_capability,
        resp_text_code_parse,
        resp_text_code_permanent_flags,
        resp_text_code_read_only,
        resp_text_code_read_write,
        resp_text_code_try_create,
        resp_text_code_uid_validity,
        resp_text_code_uid_next,
        resp_text_code_unseen,
        |i| {
            map(
                |i| registry.parse(CallingProduction::RespTextCode, i),
                ResponseCode::Extension,
            )(i)
        },
        resp_text_code_other,
    ))(i)
}

// resp-text = ["[" resp-text-code "]" SP] text
fn resp_text<'a>(
    i: &'a [u8],
    registry: &Registry,
) -> IResult<&'a [u8], (Option<ResponseCode>, Option<String>)> {
    let (i, code) = opt(delimited(
        tag("["),
        |i| resp_text_code(i, registry),
        pair(tag("]"), opt(tag(" "))),
    ))(i)?;
    let (i, info) = text(i)?;
    let information = if info.is_empty() {
        None
    } else {
        Some(info.to_owned())
    };
    Ok((i, (code, information)))
}

// ----- capability-data -----

fn capability(i: &[u8]) -> IResult<&[u8], Capability> {
    alt((
        map(tag_no_case("IMAP4rev1"), |_| Capability::Imap4rev1),
        map(preceded(tag_no_case("AUTH="), atom), |a| {
            Capability::Auth(a.to_owned())
        }),
        map(atom, |a| Capability::Atom(a.to_owned())),
    ))(i)
}

pub(crate) fn capability_data(i: &[u8]) -> IResult<&[u8], Vec<Capability>> {
    preceded(
        tag_no_case("CAPABILITY"),
        many0(preceded(char(' '), capability)),
    )(i)
}

// ----- mailbox-data -----

fn mailbox_data_flags(i: &[u8]) -> IResult<&[u8], MailboxDatum> {
    map(preceded(tag_no_case("FLAGS "), flag_list), MailboxDatum::Flags)(i)
}

fn mailbox_data_exists(i: &[u8]) -> IResult<&[u8], MailboxDatum> {
    map(
        tuple((number, tag_no_case(" EXISTS"))),
        |(num, _)| MailboxDatum::Exists(num),
    )(i)
}

fn mailbox_data_recent(i: &[u8]) -> IResult<&[u8], MailboxDatum> {
    map(
        tuple((number, tag_no_case(" RECENT"))),
        |(num, _)| MailboxDatum::Recent(num),
    )(i)
}

enum RawMbxListFlag {
    SFlag(MailboxSFlag),
    OFlag(MailboxOFlag),
}

fn mbx_list_flag(i: &[u8]) -> IResult<&[u8], RawMbxListFlag> {
    alt((
        map(tag_no_case("\\Noselect"), |_| {
            RawMbxListFlag::SFlag(MailboxSFlag::NoSelect)
        }),
        map(tag_no_case("\\Marked"), |_| {
            RawMbxListFlag::SFlag(MailboxSFlag::Marked)
        }),
        map(tag_no_case("\\Unmarked"), |_| {
            RawMbxListFlag::SFlag(MailboxSFlag::Unmarked)
        }),
        map(tag_no_case("\\Noinferiors"), |_| {
            RawMbxListFlag::OFlag(MailboxOFlag::NoInferiors)
        }),
        map(flag_extension_str, |s| {
            RawMbxListFlag::OFlag(MailboxOFlag::Extension(s.to_owned()))
        }),
    ))(i)
}

// mbx-list-flags = *(mbx-list-oflag SP) mbx-list-sflag *(SP mbx-list-oflag)
//                  / mbx-list-oflag *(SP mbx-list-oflag)
fn mbx_list_flags(i: &[u8]) -> IResult<&[u8], MailboxListFlags> {
    let (i, raw) = separated_list1(char(' '), mbx_list_flag)(i)?;
    let mut sflag = None;
    let mut oflags = Vec::new();
    for item in raw {
        match item {
            RawMbxListFlag::SFlag(s) => {
                if sflag.is_none() {
                    sflag = Some(s);
                }
            }
            RawMbxListFlag::OFlag(o) => oflags.push(o),
        }
    }
    Ok((i, MailboxListFlags { sflag, oflags }))
}

// single QUOTED-CHAR between double quotes
fn quoted_delimiter(i: &[u8]) -> IResult<&[u8], char> {
    delimited(
        char('"'),
        alt((preceded(char('\\'), one_of("\\\"")), none_of("\\\""))),
        char('"'),
    )(i)
}

// mailbox-list = "(" [mbx-list-flags] ")" SP (DQUOTE QUOTED-CHAR DQUOTE / nil)
//                SP mailbox
pub(crate) fn mailbox_list(i: &[u8]) -> IResult<&[u8], MailboxList> {
    let (i, (flags, _, delimiter, _, name)) = tuple((
        delimited(char('('), opt(mbx_list_flags), char(')')),
        char(' '),
        alt((map(nil, |_| None), map(quoted_delimiter, Some))),
        char(' '),
        mailbox,
    ))(i)?;
    Ok((
        i,
        MailboxList {
            flags,
            delimiter,
            name: name.to_owned(),
        },
    ))
}

fn mailbox_data_list(i: &[u8]) -> IResult<&[u8], MailboxDatum> {
    map(preceded(tag_no_case("LIST "), mailbox_list), MailboxDatum::List)(i)
}

fn mailbox_data_lsub(i: &[u8]) -> IResult<&[u8], MailboxDatum> {
    map(preceded(tag_no_case("LSUB "), mailbox_list), MailboxDatum::Lsub)(i)
}

fn mailbox_data_search(i: &[u8]) -> IResult<&[u8], MailboxDatum> {
    map(
        preceded(tag_no_case("SEARCH"), many0(preceded(char(' '), number))),
        MailboxDatum::Search,
    )(i)
}

fn status_att(i: &[u8]) -> IResult<&[u8], StatusAttribute> {
    alt((
        map(
            preceded(tag_no_case("MESSAGES "), number),
            StatusAttribute::Messages,
        ),
        map(
            preceded(tag_no_case("RECENT "), number),
            StatusAttribute::Recent,
        ),
        map(
            preceded(tag_no_case("UIDNEXT "), number),
            StatusAttribute::UidNext,
        ),
        map(
            preceded(tag_no_case("UIDVALIDITY "), number),
            StatusAttribute::UidValidity,
        ),
        map(
            preceded(tag_no_case("UNSEEN "), number),
            StatusAttribute::Unseen,
        ),
    ))(i)
}

fn mailbox_data_status(i: &[u8]) -> IResult<&[u8], MailboxDatum> {
    map(
        tuple((
            tag_no_case("STATUS "),
            mailbox,
            tag(" "),
            parenthesized_list(status_att),
        )),
        |(_, mailbox, _, attributes)| {
            MailboxDatum::Status(StatusData {
                mailbox: mailbox.to_owned(),
                attributes,
            })
        },
    )(i)
}

fn mailbox_data<'a>(i: &'a [u8], registry: &Registry) -> IResult<&'a [u8], MailboxDatum> {
    alt((
        mailbox_data_flags,
        mailbox_data_exists,
        mailbox_data_recent,
        mailbox_data_list,
        mailbox_data_lsub,
        mailbox_data_search,
        mailbox_data_status,
        |i| {
            map(
                |i| registry.parse(CallingProduction::MailboxData, i),
                MailboxDatum::Extension,
            )(i)
        },
    ))(i)
}

// ----- message-data -----

fn message_data_expunge(i: &[u8]) -> IResult<&[u8], Response> {
    map(
        tuple((number, tag_no_case(" EXPUNGE"))),
        |(num, _)| Response::Expunge(num),
    )(i)
}

fn message_data_fetch(i: &[u8]) -> IResult<&[u8], Response> {
    map(
        tuple((number, tag_no_case(" FETCH "), msg_att)),
        |(num, _, attrs)| Response::Fetch(num, attrs),
    )(i)
}

// ----- msg-att -----

fn msg_att_envelope(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(preceded(tag_no_case("ENVELOPE "), envelope), |env| {
        AttributeValue::Envelope(Box::new(env))
    })(i)
}

fn msg_att_internal_date(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(
        preceded(tag_no_case("INTERNALDATE "), date_time),
        AttributeValue::InternalDate,
    )(i)
}

fn msg_att_flags(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(
        preceded(tag_no_case("FLAGS "), parenthesized_list(flag_fetch)),
        AttributeValue::Flags,
    )(i)
}

fn msg_att_rfc822(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(preceded(tag_no_case("RFC822 "), nstring_bytes), AttributeValue::Rfc822)(i)
}

fn msg_att_rfc822_header(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(
        preceded(tag_no_case("RFC822.HEADER "), nstring_bytes),
        AttributeValue::Rfc822Header,
    )(i)
}

fn msg_att_rfc822_size(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(
        preceded(tag_no_case("RFC822.SIZE "), number),
        AttributeValue::Rfc822Size,
    )(i)
}

fn msg_att_rfc822_text(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(
        preceded(tag_no_case("RFC822.TEXT "), nstring_bytes),
        AttributeValue::Rfc822Text,
    )(i)
}

fn msg_att_uid(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(preceded(tag_no_case("UID "), number), AttributeValue::Uid)(i)
}

fn msg_att_item(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    alt((
        msg_att_flags,
        msg_att_envelope,
        msg_att_internal_date,
        msg_att_rfc822_size,
        msg_att_rfc822_header,
        msg_att_rfc822_text,
        msg_att_rfc822,
        msg_att_body_structure,
        msg_att_body_section,
        msg_att_body,
        msg_att_uid,
    ))(i)
}

fn msg_att(i: &[u8]) -> IResult<&[u8], Vec<AttributeValue>> {
    parenthesized_nonempty_list(msg_att_item)(i)
}

// ----- envelope -----

fn nstring_owned(i: &[u8]) -> IResult<&[u8], Option<Vec<u8>>> {
    map(nstring, |o| o.map(<[u8]>::to_vec))(i)
}

pub(crate) fn nstring_bytes(i: &[u8]) -> IResult<&[u8], Option<bytes::Bytes>> {
    map(nstring, |o| o.map(bytes::Bytes::copy_from_slice))(i)
}

// address = "(" addr-name SP addr-adl SP addr-mailbox SP addr-host ")"
fn address(i: &[u8]) -> IResult<&[u8], Address> {
    paren_delimited(map(
        tuple((
            nstring_owned,
            tag(" "),
            nstring_owned,
            tag(" "),
            nstring_owned,
            tag(" "),
            nstring_owned,
        )),
        |(name, _, adl, _, mailbox, _, host)| Address {
            name,
            adl,
            mailbox,
            host,
        },
    ))(i)
}

fn opt_addresses(i: &[u8]) -> IResult<&[u8], Option<Vec<Address>>> {
    alt((
        map(nil, |_| None),
        map(
            paren_delimited(many0(preceded(opt(char(' ')), address))),
            Some,
        ),
    ))(i)
}

pub(crate) fn envelope(i: &[u8]) -> IResult<&[u8], Envelope> {
    paren_delimited(map(
        tuple((
            nstring_owned, // date
            tag(" "),
            nstring_owned, // subject
            tag(" "),
            opt_addresses, // from
            tag(" "),
            opt_addresses, // sender
            tag(" "),
            opt_addresses, // reply-to
            tag(" "),
            opt_addresses, // to
            tag(" "),
            opt_addresses, // cc
            tag(" "),
            opt_addresses, // bcc
            tag(" "),
            nstring_owned, // in-reply-to
            tag(" "),
            nstring_owned, // message-id
        )),
        |(date, _, subject, _, from, _, sender, _, reply_to, _, to, _, cc, _, bcc, _, in_reply_to, _, message_id)| {
            Envelope {
                date,
                subject,
                from,
                sender,
                reply_to,
                to,
                cc,
                bcc,
                in_reply_to,
                message_id,
            }
        },
    ))(i)
}

// ----- response units -----

fn continue_req<'a>(i: &'a [u8], registry: &Registry) -> IResult<&'a [u8], Response> {
    let (i, _) = tag("+")(i)?;
    let (i, txt) = opt(preceded(char(' '), |i| resp_text(i, registry)))(i)?;
    let (i, _) = tag("\r\n")(i)?;
    let (code, information) = txt.unwrap_or((None, None));
    Ok((i, Response::Continue(ContinueReq { code, information })))
}

fn resp_cond<'a>(i: &'a [u8], registry: &Registry) -> IResult<&'a [u8], Response> {
    let (i, status) = status(i)?;
    let (i, txt) = opt(preceded(char(' '), |i| resp_text(i, registry)))(i)?;
    let (code, information) = txt.unwrap_or((None, None));
    Ok((
        i,
        Response::Data {
            status,
            code,
            information,
        },
    ))
}

pub fn response_data<'a>(i: &'a [u8], registry: &Registry) -> IResult<&'a [u8], Response> {
    let (i, _) = tag("* ")(i)?;
    let (i, response) = alt((
        |i| resp_cond(i, registry),
        |i| map(|i| mailbox_data(i, registry), Response::MailboxData)(i),
        message_data_expunge,
        message_data_fetch,
        map(capability_data, Response::Capabilities),
        |i| {
            map(
                |i| registry.parse(CallingProduction::ResponseData, i),
                Response::Extension,
            )(i)
        },
    ))(i)?;
    let (i, _) = tag("\r\n")(i)?;
    Ok((i, response))
}

fn imap_tag(i: &[u8]) -> IResult<&[u8], RequestId> {
    map(map_res(take_while1(is_tag_char), str::from_utf8), |s| {
        RequestId(s.to_owned())
    })(i)
}

fn response_done<'a>(i: &'a [u8], registry: &Registry) -> IResult<&'a [u8], Response> {
    let (i, (tag_id, _, status)) = tuple((imap_tag, char(' '), status))(i)?;
    let (i, txt) = opt(preceded(char(' '), |i| resp_text(i, registry)))(i)?;
    let (i, _) = tag("\r\n")(i)?;
    let (code, information) = txt.unwrap_or((None, None));
    Ok((
        i,
        Response::Done(TaggedDone {
            tag: tag_id,
            status,
            code,
            information,
        }),
    ))
}

pub fn response<'a>(i: &'a [u8], registry: &Registry) -> ParseResult<'a> {
    alt((
        |i| continue_req(i, registry),
        |i| response_data(i, registry),
        |i| response_done(i, registry),
    ))(i)
}
