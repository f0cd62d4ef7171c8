//! ACL (RFC 4314) operations: the five ACL commands plus accessors
//! that read the parsed ACL payloads out of the last response.

use std::io::{Read, Write};

use imap_model::builders;
use imap_model::{Acl, AclData, ExtensionPayload, ListRights, MyRights, State};

use crate::error::Result;
use crate::session::Session;

impl<T: Read + Write> Session<T> {
    /// Whether the server advertised the literal `ACL` capability.
    pub fn has_acl(&self) -> bool {
        self.connection_info().has_capability("ACL")
    }

    /// `SETACL <mailbox> <identifier> <rights>`. The rights argument
    /// uses the wire form, e.g. `lrswi` or `+a`.
    pub fn setacl(&mut self, mailbox_name: &str, identifier: &str, rights: &str) -> Result<()> {
        self.check_state("SETACL", &[State::Authenticated, State::Selected])?;
        let mut args = b"SETACL ".to_vec();
        builders::mailbox(&mut args, mailbox_name)?;
        args.push(b' ');
        builders::astring(&mut args, identifier)?;
        args.push(b' ');
        builders::astring(&mut args, rights)?;
        self.execute("SETACL", args)
    }

    /// `DELETEACL <mailbox> <identifier>`.
    pub fn deleteacl(&mut self, mailbox_name: &str, identifier: &str) -> Result<()> {
        self.check_state("DELETEACL", &[State::Authenticated, State::Selected])?;
        let mut args = b"DELETEACL ".to_vec();
        builders::mailbox(&mut args, mailbox_name)?;
        args.push(b' ');
        builders::astring(&mut args, identifier)?;
        self.execute("DELETEACL", args)
    }

    /// `GETACL <mailbox>`: the mailbox's identifier/rights pairs, or
    /// `None` if the server did not include an ACL response.
    pub fn getacl(&mut self, mailbox_name: &str) -> Result<Option<Acl>> {
        self.check_state("GETACL", &[State::Authenticated, State::Selected])?;
        let mut args = b"GETACL ".to_vec();
        builders::mailbox(&mut args, mailbox_name)?;
        self.execute("GETACL", args)?;
        Ok(self.take_acl_data(|data| match data {
            AclData::Acl(acl) => Some(acl),
            _ => None,
        }))
    }

    /// `LISTRIGHTS <mailbox> <identifier>`.
    pub fn listrights(
        &mut self,
        mailbox_name: &str,
        identifier: &str,
    ) -> Result<Option<ListRights>> {
        self.check_state("LISTRIGHTS", &[State::Authenticated, State::Selected])?;
        let mut args = b"LISTRIGHTS ".to_vec();
        builders::mailbox(&mut args, mailbox_name)?;
        args.push(b' ');
        builders::astring(&mut args, identifier)?;
        self.execute("LISTRIGHTS", args)?;
        Ok(self.take_acl_data(|data| match data {
            AclData::ListRights(rights) => Some(rights),
            _ => None,
        }))
    }

    /// `MYRIGHTS <mailbox>`.
    pub fn myrights(&mut self, mailbox_name: &str) -> Result<Option<MyRights>> {
        self.check_state("MYRIGHTS", &[State::Authenticated, State::Selected])?;
        let mut args = b"MYRIGHTS ".to_vec();
        builders::mailbox(&mut args, mailbox_name)?;
        self.execute("MYRIGHTS", args)?;
        Ok(self.take_acl_data(|data| match data {
            AclData::MyRights(rights) => Some(rights),
            _ => None,
        }))
    }

    fn take_acl_data<R, F>(&mut self, select: F) -> Option<R>
    where
        F: Fn(AclData) -> Option<R>,
    {
        let extensions = &mut self.response_info_mut().extension_list;
        for pos in 0..extensions.len() {
            if matches!(extensions[pos].payload, ExtensionPayload::Acl(_)) {
                let data = extensions.remove(pos);
                return match data.payload {
                    ExtensionPayload::Acl(acl) => select(acl),
                    _ => None,
                };
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mock_stream::MockStream;
    use imap_model::AclRight;

    fn authenticated(response: &str) -> Session<MockStream> {
        let mut session = Session::new(MockStream::new(response.as_bytes().to_vec()));
        session.set_state(State::Authenticated);
        session
    }

    fn written(session: &Session<MockStream>) -> String {
        String::from_utf8(session.stream_ref().written_buf.clone()).unwrap()
    }

    #[test]
    fn getacl_detaches_the_acl_payload() {
        let response = "* ACL INBOX chris lrswi fred lr\r\na1 OK Getacl complete\r\n";
        let mut session = authenticated(response);
        let acl = session.getacl("INBOX").unwrap().unwrap();
        assert_eq!(acl.mailbox, "INBOX");
        assert_eq!(acl.acls.len(), 2);
        assert_eq!(acl.acls[0].identifier, "chris");
        assert_eq!(acl.acls[1].identifier, "fred");
        assert_eq!(acl.acls[1].rights, vec![AclRight::Lookup, AclRight::Read]);
        assert_eq!(written(&session), "a1 GETACL \"INBOX\"\r\n");
        assert!(session.response_info().extension_list.is_empty());
    }

    #[test]
    fn getacl_without_response_data_yields_none() {
        let mut session = authenticated("a1 OK Getacl complete\r\n");
        assert_eq!(session.getacl("INBOX").unwrap(), None);
    }

    #[test]
    fn myrights_returns_rights() {
        let response = "* MYRIGHTS INBOX rwipslda\r\na1 OK Myrights complete\r\n";
        let mut session = authenticated(response);
        let rights = session.myrights("INBOX").unwrap().unwrap();
        assert_eq!(rights.mailbox, "INBOX");
        assert_eq!(rights.rights.len(), 8);
    }

    #[test]
    fn listrights_returns_required_and_optional() {
        let response = "* LISTRIGHTS INBOX smith la r w i\r\na1 OK done\r\n";
        let mut session = authenticated(response);
        let rights = session.listrights("INBOX", "smith").unwrap().unwrap();
        assert_eq!(rights.required, vec![AclRight::Lookup, AclRight::Administer]);
        assert_eq!(
            rights.optional,
            vec![AclRight::Read, AclRight::Write, AclRight::Insert]
        );
        assert_eq!(written(&session), "a1 LISTRIGHTS \"INBOX\" smith\r\n");
    }

    #[test]
    fn setacl_sends_rights_verbatim() {
        let mut session = authenticated("a1 OK Setacl complete\r\n");
        session.setacl("INBOX", "fred", "+lrswi").unwrap();
        assert_eq!(written(&session), "a1 SETACL \"INBOX\" fred +lrswi\r\n");
    }

    #[test]
    fn deleteacl_failure_propagates() {
        let mut session = authenticated("a1 NO not an administrator\r\n");
        assert!(matches!(
            session.deleteacl("INBOX", "fred"),
            Err(Error::No {
                command: "DELETEACL",
                ..
            })
        ));
    }
}
