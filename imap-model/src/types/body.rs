use super::Envelope;

/// Parsed BODY/BODYSTRUCTURE data.
#[allow(clippy::large_enum_variant)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BodyStructure {
    Basic {
        common: BodyContentCommon,
        other: BodyContentSinglePart,
        extension: Option<BodyExtension>,
    },
    Text {
        common: BodyContentCommon,
        other: BodyContentSinglePart,
        lines: u32,
        extension: Option<BodyExtension>,
    },
    Message {
        common: BodyContentCommon,
        other: BodyContentSinglePart,
        envelope: Envelope,
        body: Box<BodyStructure>,
        lines: u32,
        extension: Option<BodyExtension>,
    },
    Multipart {
        common: BodyContentCommon,
        /// Non-empty; a multipart body has at least one child part.
        bodies: Vec<BodyStructure>,
        extension: Option<BodyExtension>,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BodyContentCommon {
    pub ty: ContentType,
    pub disposition: Option<ContentDisposition>,
    pub language: Option<Vec<String>>,
    pub location: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BodyContentSinglePart {
    pub id: Option<String>,
    pub md5: Option<String>,
    pub description: Option<String>,
    pub transfer_encoding: ContentEncoding,
    pub octets: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentType {
    pub ty: String,
    pub subtype: String,
    pub params: BodyParams,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentDisposition {
    pub ty: String,
    pub params: BodyParams,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ContentEncoding {
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    Other(String),
}

/// Forward-compatibility slot for MIME fields this crate does not
/// interpret; round-trips opaquely.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BodyExtension {
    Num(u32),
    Str(Option<String>),
    List(Vec<BodyExtension>),
}

/// `NIL` on the wire parses to `None`; an explicit empty parameter
/// list cannot occur (the parenthesized form is non-empty).
pub type BodyParams = Option<Vec<(String, String)>>;

/// Intermediate carrier for body-fields while assembling a part.
pub struct BodyFields {
    pub param: BodyParams,
    pub id: Option<String>,
    pub description: Option<String>,
    pub transfer_encoding: ContentEncoding,
    pub octets: u32,
}

pub struct BodyExt1Part {
    pub md5: Option<String>,
    pub disposition: Option<ContentDisposition>,
    pub language: Option<Vec<String>>,
    pub location: Option<String>,
    pub extension: Option<BodyExtension>,
}

pub struct BodyExtMPart {
    pub param: BodyParams,
    pub disposition: Option<ContentDisposition>,
    pub language: Option<Vec<String>>,
    pub location: Option<String>,
    pub extension: Option<BodyExtension>,
}
