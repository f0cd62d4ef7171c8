use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take, take_while1},
    character::streaming::{char, digit1},
    combinator::{map, map_res},
    error::Error,
    multi::{separated_list0, separated_list1},
    sequence::delimited,
    IResult, Parser,
};

use std::str;

// ----- number -----

// number          = 1*DIGIT
//                    ; Unsigned 32-bit integer
//                    ; (0 <= n < 4,294,967,296)
pub fn number(i: &[u8]) -> IResult<&[u8], u32> {
    map_res(map_res(digit1, str::from_utf8), str::parse)(i)
}

// same as `number` but 64-bit
pub fn number_64(i: &[u8]) -> IResult<&[u8], u64> {
    map_res(map_res(digit1, str::from_utf8), str::parse)(i)
}

// ----- string -----

// string = quoted / literal
pub fn string(i: &[u8]) -> IResult<&[u8], &[u8]> {
    alt((quoted, literal))(i)
}

// string bytes as utf8
pub fn string_utf8(i: &[u8]) -> IResult<&[u8], &str> {
    map_res(string, str::from_utf8)(i)
}

// quoted = DQUOTE *QUOTED-CHAR DQUOTE
pub fn quoted(i: &[u8]) -> IResult<&[u8], &[u8]> {
    delimited(char('"'), quoted_data, char('"'))(i)
}

// quoted bytes as utf8
pub fn quoted_utf8(i: &[u8]) -> IResult<&[u8], &str> {
    map_res(quoted, str::from_utf8)(i)
}

// QUOTED-CHAR = <any TEXT-CHAR except quoted-specials> / "\" quoted-specials
pub fn quoted_data(i: &[u8]) -> IResult<&[u8], &[u8]> {
    // Ideally this should use nom's `escaped` combinator, but it suffers from
    // broken type inference unless compiled with the verbose-errors feature.
    let mut escape = false;
    let mut len = 0;
    for c in i {
        if *c == b'"' && !escape {
            break;
        }
        len += 1;
        if *c == b'\\' && !escape {
            escape = true
        } else if escape {
            escape = false;
        }
    }
    Ok((&i[len..], &i[..len]))
}

// quoted-specials = DQUOTE / "\"
pub fn is_quoted_specials(c: u8) -> bool {
    c == b'"' || c == b'\\'
}

// literal = "{" number "}" CRLF *CHAR8
//            ; Number represents the number of CHAR8s
pub fn literal(i: &[u8]) -> IResult<&[u8], &[u8]> {
    let (i, len) = delimited(tag("{"), number, tag("}"))(i)?;
    let (i, _) = tag("\r\n")(i)?;
    take(len)(i)
}

// ----- astring ----- atom (roughly) or string

// astring = 1*ASTRING-CHAR / string
pub fn astring(i: &[u8]) -> IResult<&[u8], &[u8]> {
    alt((take_while1(is_astring_char), string))(i)
}

// astring bytes as utf8
pub fn astring_utf8(i: &[u8]) -> IResult<&[u8], &str> {
    map_res(astring, str::from_utf8)(i)
}

// ASTRING-CHAR = ATOM-CHAR / resp-specials
pub fn is_astring_char(c: u8) -> bool {
    is_atom_char(c) || is_resp_specials(c)
}

// ATOM-CHAR = <any CHAR except atom-specials>
pub fn is_atom_char(c: u8) -> bool {
    !is_atom_specials(c)
}

// atom-specials = "(" / ")" / "{" / SP / CTL / list-wildcards /
//                 quoted-specials / resp-specials
pub fn is_atom_specials(c: u8) -> bool {
    c == b'('
        || c == b')'
        || c == b'{'
        || c == b' '
        || c < 32
        || is_list_wildcards(c)
        || is_quoted_specials(c)
        || is_resp_specials(c)
}

// resp-specials = "]"
pub fn is_resp_specials(c: u8) -> bool {
    c == b']'
}

// atom = 1*ATOM-CHAR
pub fn atom(i: &[u8]) -> IResult<&[u8], &str> {
    map_res(take_while1(is_atom_char), str::from_utf8)(i)
}

// ----- nstring ----- nil or string

// nstring = string / nil
pub fn nstring(i: &[u8]) -> IResult<&[u8], Option<&[u8]>> {
    alt((map(nil, |_| None), map(string, Some)))(i)
}

// nstring bytes as utf8
pub fn nstring_utf8(i: &[u8]) -> IResult<&[u8], Option<&str>> {
    alt((map(nil, |_| None), map(string_utf8, Some)))(i)
}

// nil = "NIL"
pub fn nil(i: &[u8]) -> IResult<&[u8], &[u8]> {
    tag_no_case("NIL")(i)
}

// ----- text -----

// text = 1*TEXT-CHAR
pub fn text(i: &[u8]) -> IResult<&[u8], &str> {
    map_res(nom::bytes::streaming::take_while(is_text_char), str::from_utf8)(i)
}

// TEXT-CHAR = <any CHAR except CR and LF>
pub fn is_text_char(c: u8) -> bool {
    c != b'\r' && c != b'\n'
}

// ----- others -----

// list-wildcards = "%" / "*"
pub fn is_list_wildcards(c: u8) -> bool {
    c == b'%' || c == b'*'
}

// ----- combinators shared by the grammar modules -----

pub(crate) fn paren_delimited<'a, O, F>(f: F) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], O>
where
    F: Parser<&'a [u8], O, Error<&'a [u8]>>,
{
    delimited(char('('), f, char(')'))
}

pub(crate) fn parenthesized_list<'a, O, F>(
    f: F,
) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], Vec<O>>
where
    F: Parser<&'a [u8], O, Error<&'a [u8]>>,
{
    paren_delimited(separated_list0(char(' '), f))
}

pub(crate) fn parenthesized_nonempty_list<'a, O, F>(
    f: F,
) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], Vec<O>>
where
    F: Parser<&'a [u8], O, Error<&'a [u8]>>,
{
    paren_delimited(separated_list1(char(' '), f))
}

// Runs a parser that already yields an `Option`, mapping a recoverable
// miss to `None` instead of an error. Used for the nested optional
// chains in body extension fields.
pub(crate) fn opt_opt<'a, O, F>(mut f: F) -> impl FnMut(&'a [u8]) -> IResult<&'a [u8], Option<O>>
where
    F: Parser<&'a [u8], Option<O>, Error<&'a [u8]>>,
{
    move |i| match f.parse(i) {
        Ok((i, o)) => Ok((i, o)),
        Err(nom::Err::Error(_)) => Ok((i, None)),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal() {
        match string(b"{3}\r\nXYZ") {
            Ok((_, value)) => {
                assert_eq!(value, b"XYZ");
            }
            rsp => panic!("unexpected response {rsp:?}"),
        }
    }

    #[test]
    fn test_astring() {
        match astring(b"text ") {
            Ok((_, value)) => {
                assert_eq!(value, b"text");
            }
            rsp => panic!("unexpected response {rsp:?}"),
        }
    }

    #[test]
    fn test_quoted_with_escapes() {
        match quoted(br#""a \"b\" c""#) {
            Ok((_, value)) => {
                assert_eq!(value, br#"a \"b\" c"#);
            }
            rsp => panic!("unexpected response {rsp:?}"),
        }
    }

    #[test]
    fn test_incomplete_literal() {
        assert!(matches!(string(b"{8}\r\nabc"), Err(nom::Err::Incomplete(_))));
    }
}
