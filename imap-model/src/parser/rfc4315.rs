//!
//! <https://tools.ietf.org/html/rfc4315>
//!
//! The IMAP UIDPLUS Extension
//!

use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::map,
    multi::separated_list1,
    sequence::{preceded, tuple},
    IResult,
};

use crate::extension::{CallingProduction, Extension, ExtensionData, ExtensionId};
use crate::parser::core::number;
use crate::types::*;

/// Parser half of the shipped UIDPLUS extension. Claims the
/// resp-text-code production only.
pub struct UidPlusExtension;

impl Extension for UidPlusExtension {
    fn id(&self) -> ExtensionId {
        ExtensionId::UidPlus
    }

    fn parse<'a>(
        &self,
        production: CallingProduction,
        i: &'a [u8],
    ) -> IResult<&'a [u8], ExtensionData> {
        if production != CallingProduction::RespTextCode {
            return Err(nom::Err::Error(nom::error::Error::new(
                i,
                nom::error::ErrorKind::Tag,
            )));
        }
        map(
            alt((
                resp_text_code_append_uid,
                resp_text_code_copy_uid,
                resp_text_code_uid_not_sticky,
            )),
            ExtensionData::uidplus,
        )(i)
    }
}

/// Extends resp-text-code as follows:
///
/// ```ignore
///     resp-text-code =/ resp-code-apnd
///     resp-code-apnd = "APPENDUID" SP nz-number SP append-uid
///     append-uid      =/ uid-set
///                       ; only permitted if client uses [MULTIAPPEND]
///                       ; to append multiple messages.
/// ```
///
/// [RFC4315 - 3 Additional Response Codes](https://tools.ietf.org/html/rfc4315#section-3)
pub(crate) fn resp_text_code_append_uid(i: &[u8]) -> IResult<&[u8], UidPlusData> {
    map(
        preceded(
            tag_no_case("APPENDUID "),
            tuple((number, tag(" "), uid_set)),
        ),
        |(uid_validity, _, uids)| UidPlusData::AppendUid { uid_validity, uids },
    )(i)
}

/// Extends resp-text-code as follows:
///
/// ```ignore
///     resp-text-code =/ resp-code-copy
///     resp-code-copy = "COPYUID" SP nz-number SP uid-set SP uid-set
/// ```
///
/// [RFC4315 - 3 Additional Response Codes](https://tools.ietf.org/html/rfc4315#section-3)
pub(crate) fn resp_text_code_copy_uid(i: &[u8]) -> IResult<&[u8], UidPlusData> {
    map(
        preceded(
            tag_no_case("COPYUID "),
            tuple((number, tag(" "), uid_set, tag(" "), uid_set)),
        ),
        |(uid_validity, _, source, _, dest)| UidPlusData::CopyUid {
            uid_validity,
            source,
            dest,
        },
    )(i)
}

/// Extends resp-text-code as follows:
///
/// ```ignore
///     resp-text-code =/ "UIDNOTSTICKY"
/// ```
///
/// [RFC4315 - 3 Additional Response Codes](https://tools.ietf.org/html/rfc4315#section-3)
pub(crate) fn resp_text_code_uid_not_sticky(i: &[u8]) -> IResult<&[u8], UidPlusData> {
    map(tag_no_case("UIDNOTSTICKY"), |_| UidPlusData::UidNotSticky)(i)
}

/// Parses the uid-set nonterminal:
///
/// ```ignore
///     uid-set = (uniqueid / uid-range) *("," uid-set)
/// ```
///
/// [RFC4315 - 4 Formal Syntax](https://tools.ietf.org/html/rfc4315#section-4)
fn uid_set(i: &[u8]) -> IResult<&[u8], Vec<UidSetMember>> {
    separated_list1(tag(","), alt((uid_range, map(number, From::from))))(i)
}

/// Parses the uid-range nonterminal:
///
/// ```ignore
///    uid-range = (uniqueid ":" uniqueid)
///                ; two uniqueid values and all values
///                ; between these two regardless of order.
///                ; Example: 2:4 and 4:2 are equivalent.
/// ```
///
/// [RFC4315 - 4 Formal Syntax](https://tools.ietf.org/html/rfc4315#section-4)
fn uid_range(i: &[u8]) -> IResult<&[u8], UidSetMember> {
    map(
        nom::sequence::separated_pair(number, tag(":"), number),
        |(fst, snd)| if fst <= snd { fst..=snd } else { snd..=fst }.into(),
    )(i)
}
