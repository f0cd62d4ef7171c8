use nom::{
    branch::alt,
    bytes::streaming::tag_no_case,
    character::streaming::char,
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::{
    parser::{core::*, rfc3501::nstring_bytes},
    types::*,
};

pub fn section_part(i: &[u8]) -> IResult<&[u8], Vec<u32>> {
    let (i, (part, mut rest)) = tuple((number, many0(preceded(char('.'), number))))(i)?;
    rest.insert(0, part);
    Ok((i, rest))
}

fn header_field_names(i: &[u8]) -> IResult<&[u8], Vec<String>> {
    parenthesized_nonempty_list(map(astring_utf8, str::to_owned))(i)
}

pub fn section_msgtext(i: &[u8]) -> IResult<&[u8], SectionMsgText> {
    alt((
        map(
            preceded(tag_no_case("HEADER.FIELDS.NOT "), header_field_names),
            SectionMsgText::HeaderFieldsNot,
        ),
        map(
            preceded(tag_no_case("HEADER.FIELDS "), header_field_names),
            SectionMsgText::HeaderFields,
        ),
        map(tag_no_case("HEADER"), |_| SectionMsgText::Header),
        map(tag_no_case("TEXT"), |_| SectionMsgText::Text),
    ))(i)
}

pub fn section_text(i: &[u8]) -> IResult<&[u8], SectionText> {
    alt((
        map(tag_no_case("MIME"), |_| SectionText::Mime),
        map(section_msgtext, SectionText::MsgText),
    ))(i)
}

pub fn section_spec(i: &[u8]) -> IResult<&[u8], SectionSpec> {
    alt((
        map(section_msgtext, SectionSpec::MsgText),
        map(
            tuple((section_part, opt(preceded(char('.'), section_text)))),
            |(part, text)| SectionSpec::Part(part, text),
        ),
    ))(i)
}

pub fn section(i: &[u8]) -> IResult<&[u8], Option<SectionSpec>> {
    delimited(char('['), opt(section_spec), char(']'))(i)
}

pub fn msg_att_body_section(i: &[u8]) -> IResult<&[u8], AttributeValue> {
    map(
        tuple((
            tag_no_case("BODY"),
            section,
            opt(delimited(char('<'), number, char('>'))),
            nom::bytes::streaming::tag(" "),
            nstring_bytes,
        )),
        |(_, section, origin, _, data)| AttributeValue::BodySection {
            section,
            origin,
            data,
        },
    )(i)
}
