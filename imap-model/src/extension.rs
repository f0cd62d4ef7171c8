//! Registry of grammar extensions and the dispatch run when the base
//! grammar reaches a production it cannot parse on its own.

use std::any::Any;
use std::fmt;

use lazy_static::lazy_static;
use nom::IResult;

use crate::parser::{rfc4314::AclExtension, rfc4315::UidPlusExtension};
use crate::types::{AclData, UidPlusData};

/// Identity of the extension that produced a piece of extension data.
/// The back-link is non-owning; registry entries outlive every node
/// built from them.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ExtensionId {
    Acl,
    UidPlus,
    /// An extension registered from outside this crate, identified by
    /// its capability token.
    Foreign(&'static str),
}

impl ExtensionId {
    pub fn capability(&self) -> &'static str {
        match self {
            ExtensionId::Acl => "ACL",
            ExtensionId::UidPlus => "UIDPLUS",
            ExtensionId::Foreign(name) => name,
        }
    }
}

/// Which production the base grammar was parsing when it handed
/// control to the registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CallingProduction {
    ResponseData,
    RespTextCode,
    MailboxData,
}

/// Payload of an extension registered from outside this crate. Only
/// the producing extension may interpret it; everyone else carries it
/// opaquely and drops it with the tree.
pub trait ForeignData: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> ForeignData for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The shipped extensions are closed variants so their payloads can be
/// matched exhaustively; anything else rides in `Foreign`.
#[derive(Debug)]
pub enum ExtensionPayload {
    Acl(AclData),
    UidPlus(UidPlusData),
    Foreign(Box<dyn ForeignData>),
}

impl ExtensionPayload {
    /// Borrows a foreign payload back as the concrete type its
    /// extension registered.
    pub fn downcast_foreign<P: Any>(&self) -> Option<&P> {
        match self {
            ExtensionPayload::Foreign(payload) => payload.as_ref().as_any().downcast_ref(),
            _ => None,
        }
    }
}

impl PartialEq for ExtensionPayload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExtensionPayload::Acl(a), ExtensionPayload::Acl(b)) => a == b,
            (ExtensionPayload::UidPlus(a), ExtensionPayload::UidPlus(b)) => a == b,
            // Foreign payloads are opaque and never compare equal.
            _ => false,
        }
    }
}

/// A foreign grammar construct threaded into the standard response
/// tree.
#[derive(Debug, PartialEq)]
pub struct ExtensionData {
    pub id: ExtensionId,
    pub payload: ExtensionPayload,
}

impl ExtensionData {
    pub fn acl(data: AclData) -> ExtensionData {
        ExtensionData {
            id: ExtensionId::Acl,
            payload: ExtensionPayload::Acl(data),
        }
    }

    pub fn uidplus(data: UidPlusData) -> ExtensionData {
        ExtensionData {
            id: ExtensionId::UidPlus,
            payload: ExtensionPayload::UidPlus(data),
        }
    }

    pub fn foreign(name: &'static str, payload: Box<dyn ForeignData>) -> ExtensionData {
        ExtensionData {
            id: ExtensionId::Foreign(name),
            payload: ExtensionPayload::Foreign(payload),
        }
    }

    pub fn as_acl(&self) -> Option<&AclData> {
        match &self.payload {
            ExtensionPayload::Acl(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_acl(self) -> Option<AclData> {
        match self.payload {
            ExtensionPayload::Acl(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_uidplus(&self) -> Option<&UidPlusData> {
        match &self.payload {
            ExtensionPayload::UidPlus(data) => Some(data),
            _ => None,
        }
    }

    pub fn into_uidplus(self) -> Option<UidPlusData> {
        match self.payload {
            ExtensionPayload::UidPlus(data) => Some(data),
            _ => None,
        }
    }
}

/// A pluggable grammar extension.
///
/// `parse` is called with the production being parsed and the
/// remaining input. Returning `nom::Err::Error` means "not mine" and
/// must leave no side effects so the dispatcher can try the next
/// candidate; `nom::Err::Failure` means the construct was recognized
/// but malformed; `Incomplete` propagates to the transport loop.
pub trait Extension: Send + Sync {
    fn id(&self) -> ExtensionId;

    fn capability(&self) -> &'static str {
        self.id().capability()
    }

    fn parse<'a>(
        &self,
        production: CallingProduction,
        i: &'a [u8],
    ) -> IResult<&'a [u8], ExtensionData>;
}

/// Ordered collection of extensions. Built once, read-only afterwards;
/// dispatch tries candidates in registration order and commits on the
/// first success.
pub struct Registry {
    extensions: Vec<Box<dyn Extension>>,
}

impl Registry {
    pub fn empty() -> Registry {
        Registry {
            extensions: Vec::new(),
        }
    }

    /// Registry with the shipped extensions: ACL, then UIDPLUS.
    pub fn standard() -> Registry {
        let mut registry = Registry::empty();
        registry.register(Box::new(AclExtension));
        registry.register(Box::new(UidPlusExtension));
        registry
    }

    pub fn register(&mut self, extension: Box<dyn Extension>) {
        self.extensions.push(extension);
    }

    pub fn extensions(&self) -> impl Iterator<Item = &dyn Extension> {
        self.extensions.iter().map(|e| e.as_ref())
    }

    /// Tries every registered extension against the current input.
    pub fn parse<'a>(
        &self,
        production: CallingProduction,
        i: &'a [u8],
    ) -> IResult<&'a [u8], ExtensionData> {
        for extension in &self.extensions {
            match extension.parse(production, i) {
                Ok(parsed) => return Ok(parsed),
                Err(nom::Err::Error(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Err(nom::Err::Error(nom::error::Error::new(
            i,
            nom::error::ErrorKind::Alt,
        )))
    }
}

impl Default for Registry {
    fn default() -> Registry {
        Registry::standard()
    }
}

lazy_static! {
    static ref DEFAULT_REGISTRY: Registry = Registry::standard();
}

/// Process-wide registry with the shipped extensions, initialized on
/// first use and never mutated afterwards.
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}
