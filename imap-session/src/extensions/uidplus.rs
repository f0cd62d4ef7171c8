//! UIDPLUS (RFC 4315) operations: UID EXPUNGE plus COPY/APPEND
//! wrappers that surface the APPENDUID/COPYUID response codes.

use std::io::{Read, Write};

use imap_model::{
    ExtensionPayload, Flag, SequenceSet, State, UidPlusData, UidSetMember,
};

use crate::error::Result;
use crate::session::Session;

/// The COPYUID triple, detached from the response tree so the sets
/// outlive it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CopyUidResult {
    pub uid_validity: u32,
    pub source: Vec<UidSetMember>,
    pub dest: Vec<UidSetMember>,
}

/// The APPENDUID pair for a single-message append.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AppendUidResult {
    pub uid_validity: u32,
    pub uid: u32,
}

impl<T: Read + Write> Session<T> {
    /// Whether the server advertised the literal `UIDPLUS` capability.
    pub fn has_uidplus(&self) -> bool {
        self.connection_info().has_capability("UIDPLUS")
    }

    /// `UID EXPUNGE <set>`: expunges only the \Deleted messages in the
    /// given UID set. Requires the selected state; in any other state
    /// the command fails locally and nothing reaches the wire.
    pub fn uid_expunge(&mut self, set: &SequenceSet) -> Result<Vec<u32>> {
        self.check_state("UID EXPUNGE", &[State::Selected])?;
        let mut args = b"UID EXPUNGE ".to_vec();
        args.extend(set.to_string().into_bytes());
        self.execute("UID EXPUNGE", args)?;
        Ok(std::mem::take(&mut self.response_info_mut().expunged))
    }

    /// COPY, then the COPYUID code if the server sent one. A missing
    /// code is not an error; the result is simply `None`.
    pub fn uidplus_copy(
        &mut self,
        set: &SequenceSet,
        mailbox_name: &str,
    ) -> Result<Option<CopyUidResult>> {
        self.copy(set, mailbox_name)?;
        Ok(self.take_copy_uid())
    }

    /// UID COPY variant of [`Session::uidplus_copy`].
    pub fn uidplus_uid_copy(
        &mut self,
        set: &SequenceSet,
        mailbox_name: &str,
    ) -> Result<Option<CopyUidResult>> {
        self.uid_copy(set, mailbox_name)?;
        Ok(self.take_copy_uid())
    }

    /// APPEND, then the APPENDUID code if the server sent one. The
    /// returned UID is the first UID of the reported set; the set
    /// itself is consumed.
    pub fn uidplus_append(
        &mut self,
        mailbox_name: &str,
        flags: &[Flag],
        content: &[u8],
    ) -> Result<Option<AppendUidResult>> {
        self.append(mailbox_name, flags, content)?;
        Ok(self.take_append_uid())
    }

    /// [`Session::uidplus_append`] without a flag list.
    pub fn uidplus_append_simple(
        &mut self,
        mailbox_name: &str,
        content: &[u8],
    ) -> Result<Option<AppendUidResult>> {
        self.uidplus_append(mailbox_name, &[], content)
    }

    fn take_copy_uid(&mut self) -> Option<CopyUidResult> {
        let extensions = &mut self.response_info_mut().extension_list;
        let pos = extensions.iter().position(|data| {
            matches!(
                data.payload,
                ExtensionPayload::UidPlus(UidPlusData::CopyUid { .. })
            )
        })?;
        // detach the node so the sets move out before the response
        // info is replaced
        match extensions.remove(pos).payload {
            ExtensionPayload::UidPlus(UidPlusData::CopyUid {
                uid_validity,
                source,
                dest,
            }) => Some(CopyUidResult {
                uid_validity,
                source,
                dest,
            }),
            _ => None,
        }
    }

    fn take_append_uid(&mut self) -> Option<AppendUidResult> {
        let extensions = &mut self.response_info_mut().extension_list;
        let pos = extensions.iter().position(|data| {
            matches!(
                data.payload,
                ExtensionPayload::UidPlus(UidPlusData::AppendUid { .. })
            )
        })?;
        match extensions.remove(pos).payload {
            ExtensionPayload::UidPlus(UidPlusData::AppendUid { uid_validity, uids }) => {
                let uid = uids.first().map(UidSetMember::start)?;
                Some(AppendUidResult { uid_validity, uid })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mock_stream::MockStream;
    use crate::SelectionInfo;

    fn selected(response: &str) -> Session<MockStream> {
        let mut session = Session::new(MockStream::new(response.as_bytes().to_vec()));
        session.set_state(State::Selected);
        session.set_selection_for_tests(SelectionInfo::default());
        session
    }

    fn written(session: &Session<MockStream>) -> String {
        String::from_utf8(session.stream_ref().written_buf.clone()).unwrap()
    }

    #[test]
    fn uid_expunge_requires_selected_state() {
        let mut session = Session::new(MockStream::new(Vec::new()));
        session.set_state(State::Authenticated);
        assert!(matches!(
            session.uid_expunge(&SequenceSet::interval(1, 10)),
            Err(Error::BadState {
                command: "UID EXPUNGE"
            })
        ));
        // nothing was sent and nothing was read
        assert!(session.stream_ref().written_buf.is_empty());
        assert_eq!(session.stream_ref().read_pos, 0);
    }

    #[test]
    fn uid_expunge_sends_set_and_collects_expunges() {
        let response = "* 3 EXPUNGE\r\n* 3 EXPUNGE\r\na1 OK expunged\r\n";
        let mut session = selected(response);
        let expunged = session.uid_expunge(&SequenceSet::interval(1, 10)).unwrap();
        assert_eq!(expunged, vec![3, 3]);
        assert_eq!(written(&session), "a1 UID EXPUNGE 1:10\r\n");
    }

    #[test]
    fn uid_expunge_failure_maps_to_command_error() {
        let mut session = selected("a1 NO expunge not permitted\r\n");
        assert!(matches!(
            session.uid_expunge(&SequenceSet::single(4)),
            Err(Error::No {
                command: "UID EXPUNGE",
                ..
            })
        ));
    }

    #[test]
    fn copyuid_round_trip() {
        let response = "a1 OK [COPYUID 42 1:3 100:102] COPY completed\r\n";
        let mut session = selected(response);
        let result = session
            .uidplus_copy(&SequenceSet::interval(1, 3), "archive")
            .unwrap()
            .unwrap();
        assert_eq!(result.uid_validity, 42);
        assert_eq!(result.source, vec![UidSetMember::UidRange(1..=3)]);
        assert_eq!(result.dest, vec![UidSetMember::UidRange(100..=102)]);
        assert_eq!(written(&session), "a1 COPY 1:3 \"archive\"\r\n");
        // the node was detached: nothing remains in the leftover list,
        // and the sets stay usable on their own
        assert!(session.response_info().extension_list.is_empty());
        drop(session);
        assert_eq!(result.source[0], UidSetMember::UidRange(1..=3));
    }

    #[test]
    fn copy_without_copyuid_yields_none() {
        let mut session = selected("a1 OK COPY completed\r\n");
        let result = session
            .uidplus_uid_copy(&SequenceSet::single(7), "archive")
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(written(&session), "a1 UID COPY 7 \"archive\"\r\n");
    }

    #[test]
    fn copy_failure_skips_extraction() {
        let mut session = selected("a1 NO [TRYCREATE] no such mailbox\r\n");
        assert!(matches!(
            session.uidplus_copy(&SequenceSet::single(1), "missing"),
            Err(Error::No {
                command: "COPY",
                ..
            })
        ));
    }

    #[test]
    fn appenduid_single_uid_extraction() {
        let response = "+ go ahead\r\na1 OK [APPENDUID 7 55] APPEND completed\r\n";
        let mut session = selected(response);
        let result = session
            .uidplus_append("INBOX", &[], b"Subject: x\r\n\r\n.")
            .unwrap()
            .unwrap();
        assert_eq!(result.uid_validity, 7);
        assert_eq!(result.uid, 55);
        assert!(session.response_info().extension_list.is_empty());
    }

    #[test]
    fn appenduid_range_reports_first_uid() {
        let response = "+ go\r\na1 OK [APPENDUID 9 55:57] done\r\n";
        let mut session = selected(response);
        let result = session
            .uidplus_append_simple("INBOX", b"x")
            .unwrap()
            .unwrap();
        assert_eq!(result.uid, 55);
    }

    #[test]
    fn append_without_appenduid_yields_none() {
        let response = "+ go\r\na1 OK APPEND completed\r\n";
        let mut session = selected(response);
        let result = session.uidplus_append("INBOX", &[], b"x").unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn capability_probe_is_literal() {
        let response = "* OK [CAPABILITY IMAP4rev1 UIDPLUS] ready\r\n";
        let mut session = Session::new(MockStream::new(response.as_bytes().to_vec()));
        session.connect().unwrap();
        assert!(session.has_uidplus());

        let response = "* OK [CAPABILITY IMAP4rev1 ACL] ready\r\n";
        let mut session = Session::new(MockStream::new(response.as_bytes().to_vec()));
        session.connect().unwrap();
        assert!(!session.has_uidplus());
    }
}
