use nom::IResult;

use crate::extension::Registry;
use crate::types::Response;

pub mod core;
pub mod rfc3501;
pub mod rfc4314;
pub mod rfc4315;


pub type ParseResult<'a> = IResult<&'a [u8], Response>;

/// Parses one full response unit (a line plus any literals it carries),
/// dispatching unknown productions to the given extension registry.
pub fn parse_response<'a>(i: &'a [u8], registry: &Registry) -> ParseResult<'a> {
    rfc3501::response(i, registry)
}
