use std::io::{BufRead, Read, Write};
use std::sync::Arc;

use bufstream::BufStream;
use log::{debug, trace};

use imap_model::builders;
use imap_model::parser::parse_response;
use imap_model::{
    Bye, CommandResponse, MailboxDatum, Registry, Response, ResponseCode, ResponseDone,
    SearchKey, SequenceSet, State, Status, StatusAtt, StoreAttFlags, TaggedDone,
};
use imap_model::{Capability, FetchType, Flag};

use crate::error::{Error, Result};
use crate::info::{Access, ConnectionInfo, FetchedMessage, ResponseInfo, SelectionInfo};

const TAG_PREFIX: &str = "a";

type ProgressCallback = Box<dyn FnMut(usize) + Send>;

struct Progress {
    rate: usize,
    callback: ProgressCallback,
    total: usize,
    since_report: usize,
}

/// One IMAP connection: protocol state, tag counter, and the
/// information accumulated from the last command's response.
///
/// The transport is caller-supplied; this layer never opens sockets or
/// negotiates TLS.
pub struct Session<T: Read + Write> {
    stream: BufStream<T>,
    tag: u32,
    state: State,
    registry: Arc<Registry>,
    connection_info: ConnectionInfo,
    selection_info: Option<SelectionInfo>,
    response_info: ResponseInfo,
    last_response: Option<String>,
    progress: Option<Progress>,
}

impl<T: Read + Write> Session<T> {
    /// Wraps a transport. The session starts disconnected; call
    /// [`Session::connect`] to read the server greeting.
    pub fn new(stream: T) -> Session<T> {
        Session::with_registry(stream, Arc::new(Registry::standard()))
    }

    /// Same as [`Session::new`] with a caller-built extension
    /// registry.
    pub fn with_registry(stream: T, registry: Arc<Registry>) -> Session<T> {
        Session {
            stream: BufStream::new(stream),
            tag: 0,
            state: State::Disconnected,
            registry,
            connection_info: ConnectionInfo::default(),
            selection_info: None,
            response_info: ResponseInfo::default(),
            last_response: None,
            progress: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.connection_info
    }

    pub fn selection_info(&self) -> Option<&SelectionInfo> {
        self.selection_info.as_ref()
    }

    pub fn response_info(&self) -> &ResponseInfo {
        &self.response_info
    }

    pub(crate) fn response_info_mut(&mut self) -> &mut ResponseInfo {
        &mut self.response_info
    }

    /// Human-readable text of the last tagged completion.
    pub fn last_response_text(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    /// Installs an observational progress callback, invoked with the
    /// total bytes read for the current response roughly every `rate`
    /// bytes. Has no effect on parsing.
    pub fn set_progress_callback(&mut self, rate: usize, callback: ProgressCallback) {
        self.progress = Some(Progress {
            rate,
            callback,
            total: 0,
            since_report: 0,
        });
    }

    // ----- greeting -----

    /// Reads the server greeting and leaves the session in
    /// non-authenticated (OK), authenticated (PREAUTH), or errors out
    /// (BYE).
    pub fn connect(&mut self) -> Result<()> {
        if self.state != State::Disconnected {
            return Err(Error::BadState {
                command: "greeting",
            });
        }
        match self.read_unit()? {
            Response::Data {
                status,
                code,
                information,
            } => {
                if let Some(code) = code {
                    self.apply_code(code, &information);
                }
                self.last_response = information;
                match status {
                    Status::Ok => {
                        self.state = State::NotAuthenticated;
                        debug!("greeting accepted, not authenticated");
                        Ok(())
                    }
                    Status::PreAuth => {
                        self.state = State::Authenticated;
                        debug!("greeting accepted, pre-authenticated");
                        Ok(())
                    }
                    _ => Err(Error::ConnectionRefused),
                }
            }
            _ => Err(Error::Parse(Vec::new())),
        }
    }

    // ----- any-state commands -----

    pub fn capability(&mut self) -> Result<Vec<Capability>> {
        self.check_state("CAPABILITY", &[State::NotAuthenticated, State::Authenticated, State::Selected])?;
        self.execute("CAPABILITY", b"CAPABILITY".to_vec())?;
        Ok(self
            .connection_info
            .capabilities
            .clone()
            .unwrap_or_default())
    }

    pub fn noop(&mut self) -> Result<()> {
        self.check_state("NOOP", &[State::NotAuthenticated, State::Authenticated, State::Selected])?;
        self.execute("NOOP", b"NOOP".to_vec())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.check_state("LOGOUT", &[State::NotAuthenticated, State::Authenticated, State::Selected])?;
        let result = self.execute("LOGOUT", b"LOGOUT".to_vec());
        self.state = State::Logout;
        self.selection_info = None;
        result
    }

    // ----- not-authenticated commands -----

    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.check_state("LOGIN", &[State::NotAuthenticated])?;
        let mut args = b"LOGIN ".to_vec();
        builders::astring(&mut args, username)?;
        args.push(b' ');
        builders::astring(&mut args, password)?;
        self.execute("LOGIN", args)?;
        self.state = State::Authenticated;
        debug!("logged in, state now authenticated");
        Ok(())
    }

    // ----- authenticated commands -----

    pub fn select(&mut self, mailbox_name: &str) -> Result<()> {
        self.select_or_examine("SELECT", mailbox_name)
    }

    pub fn examine(&mut self, mailbox_name: &str) -> Result<()> {
        self.select_or_examine("EXAMINE", mailbox_name)
    }

    fn select_or_examine(&mut self, command: &'static str, mailbox_name: &str) -> Result<()> {
        self.check_state(command, &[State::Authenticated, State::Selected])?;
        let mut args = command.as_bytes().to_vec();
        args.push(b' ');
        builders::mailbox(&mut args, mailbox_name)?;
        // selection info is rebuilt from this response alone
        self.selection_info = Some(SelectionInfo::default());
        match self.execute(command, args) {
            Ok(()) => {
                self.state = State::Selected;
                debug!("{command} succeeded, state now selected");
                Ok(())
            }
            Err(err) => {
                self.selection_info = None;
                self.state = State::Authenticated;
                Err(err)
            }
        }
    }

    pub fn create(&mut self, mailbox_name: &str) -> Result<()> {
        self.simple_mailbox_command("CREATE", mailbox_name)
    }

    pub fn delete(&mut self, mailbox_name: &str) -> Result<()> {
        self.simple_mailbox_command("DELETE", mailbox_name)
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.check_state("RENAME", &[State::Authenticated, State::Selected])?;
        let mut args = b"RENAME ".to_vec();
        builders::mailbox(&mut args, from)?;
        args.push(b' ');
        builders::mailbox(&mut args, to)?;
        self.execute("RENAME", args)
    }

    pub fn subscribe(&mut self, mailbox_name: &str) -> Result<()> {
        self.simple_mailbox_command("SUBSCRIBE", mailbox_name)
    }

    pub fn unsubscribe(&mut self, mailbox_name: &str) -> Result<()> {
        self.simple_mailbox_command("UNSUBSCRIBE", mailbox_name)
    }

    fn simple_mailbox_command(&mut self, command: &'static str, mailbox_name: &str) -> Result<()> {
        self.check_state(command, &[State::Authenticated, State::Selected])?;
        let mut args = command.as_bytes().to_vec();
        args.push(b' ');
        builders::mailbox(&mut args, mailbox_name)?;
        self.execute(command, args)
    }

    pub fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<imap_model::MailboxList>> {
        self.list_or_lsub("LIST", reference, pattern)?;
        Ok(std::mem::take(&mut self.response_info.mailbox_list))
    }

    pub fn lsub(&mut self, reference: &str, pattern: &str) -> Result<Vec<imap_model::MailboxList>> {
        self.list_or_lsub("LSUB", reference, pattern)?;
        Ok(std::mem::take(&mut self.response_info.mailbox_lsub))
    }

    fn list_or_lsub(&mut self, command: &'static str, reference: &str, pattern: &str) -> Result<()> {
        self.check_state(command, &[State::Authenticated, State::Selected])?;
        let mut args = command.as_bytes().to_vec();
        args.push(b' ');
        builders::mailbox(&mut args, reference)?;
        args.push(b' ');
        builders::mailbox(&mut args, pattern)?;
        self.execute(command, args)
    }

    pub fn status(
        &mut self,
        mailbox_name: &str,
        items: &[StatusAtt],
    ) -> Result<Option<imap_model::StatusData>> {
        self.check_state("STATUS", &[State::Authenticated, State::Selected])?;
        let mut args = b"STATUS ".to_vec();
        builders::mailbox(&mut args, mailbox_name)?;
        args.push(b' ');
        builders::status_att(&mut args, items);
        self.execute("STATUS", args)?;
        Ok(self.response_info.status.take())
    }

    /// Appends a message. `flags` may be empty for no flag list.
    pub fn append(&mut self, mailbox_name: &str, flags: &[Flag], content: &[u8]) -> Result<()> {
        self.check_state("APPEND", &[State::Authenticated, State::Selected])?;
        let mut args = b"APPEND ".to_vec();
        builders::mailbox(&mut args, mailbox_name)?;
        if !flags.is_empty() {
            args.push(b' ');
            builders::flag_list(&mut args, flags);
        }
        args.extend(format!(" {{{}}}", content.len()).into_bytes());
        self.run_command(&args)?;

        // data before the continuation request still belongs to this
        // command's response
        let mut pre_data = Vec::new();
        loop {
            match self.read_unit()? {
                Response::Continue(_) => break,
                Response::Done(done) => {
                    // server rejected the literal up front
                    return self.apply_response(
                        CommandResponse {
                            data: pre_data,
                            done: ResponseDone::Tagged(done),
                        },
                        "APPEND",
                    );
                }
                unit => pre_data.push(unit),
            }
        }
        self.stream.write_all(content)?;
        self.stream.write_all(b"\r\n")?;
        self.stream.flush()?;

        let CommandResponse { data, done } = self.read_command_response()?;
        let mut all = pre_data;
        all.extend(data);
        self.apply_response(CommandResponse { data: all, done }, "APPEND")
    }

    // ----- selected-state commands -----

    pub fn check(&mut self) -> Result<()> {
        self.check_state("CHECK", &[State::Selected])?;
        self.execute("CHECK", b"CHECK".to_vec())
    }

    pub fn close(&mut self) -> Result<()> {
        self.check_state("CLOSE", &[State::Selected])?;
        self.execute("CLOSE", b"CLOSE".to_vec())?;
        self.state = State::Authenticated;
        self.selection_info = None;
        Ok(())
    }

    pub fn expunge(&mut self) -> Result<Vec<u32>> {
        self.check_state("EXPUNGE", &[State::Selected])?;
        self.execute("EXPUNGE", b"EXPUNGE".to_vec())?;
        Ok(std::mem::take(&mut self.response_info.expunged))
    }

    pub fn search(&mut self, charset: Option<&str>, key: &SearchKey) -> Result<Vec<u32>> {
        self.search_command("SEARCH", charset, key)
    }

    pub fn uid_search(&mut self, charset: Option<&str>, key: &SearchKey) -> Result<Vec<u32>> {
        self.search_command("UID SEARCH", charset, key)
    }

    fn search_command(
        &mut self,
        command: &'static str,
        charset: Option<&str>,
        key: &SearchKey,
    ) -> Result<Vec<u32>> {
        self.check_state(command, &[State::Selected])?;
        let mut args = command.as_bytes().to_vec();
        if let Some(charset) = charset {
            args.extend(b" CHARSET ");
            builders::astring(&mut args, charset)?;
        }
        args.push(b' ');
        builders::search_key(&mut args, key)?;
        self.execute(command, args)?;
        Ok(std::mem::take(&mut self.response_info.search_result))
    }

    pub fn fetch(&mut self, set: &SequenceSet, what: &FetchType) -> Result<Vec<FetchedMessage>> {
        self.fetch_command("FETCH", set, what)
    }

    pub fn uid_fetch(
        &mut self,
        set: &SequenceSet,
        what: &FetchType,
    ) -> Result<Vec<FetchedMessage>> {
        self.fetch_command("UID FETCH", set, what)
    }

    fn fetch_command(
        &mut self,
        command: &'static str,
        set: &SequenceSet,
        what: &FetchType,
    ) -> Result<Vec<FetchedMessage>> {
        self.check_state(command, &[State::Selected])?;
        let mut args = command.as_bytes().to_vec();
        args.push(b' ');
        args.extend(set.to_string().into_bytes());
        args.push(b' ');
        builders::fetch_type(&mut args, what)?;
        self.execute(command, args)?;
        Ok(std::mem::take(&mut self.response_info.fetch_list))
    }

    pub fn store(
        &mut self,
        set: &SequenceSet,
        flags: &StoreAttFlags,
    ) -> Result<Vec<FetchedMessage>> {
        self.store_command("STORE", set, flags)
    }

    pub fn uid_store(
        &mut self,
        set: &SequenceSet,
        flags: &StoreAttFlags,
    ) -> Result<Vec<FetchedMessage>> {
        self.store_command("UID STORE", set, flags)
    }

    fn store_command(
        &mut self,
        command: &'static str,
        set: &SequenceSet,
        flags: &StoreAttFlags,
    ) -> Result<Vec<FetchedMessage>> {
        self.check_state(command, &[State::Selected])?;
        let mut args = command.as_bytes().to_vec();
        args.push(b' ');
        args.extend(set.to_string().into_bytes());
        args.push(b' ');
        builders::store_att_flags(&mut args, flags);
        self.execute(command, args)?;
        Ok(std::mem::take(&mut self.response_info.fetch_list))
    }

    pub fn copy(&mut self, set: &SequenceSet, mailbox_name: &str) -> Result<()> {
        self.copy_command("COPY", set, mailbox_name)
    }

    pub fn uid_copy(&mut self, set: &SequenceSet, mailbox_name: &str) -> Result<()> {
        self.copy_command("UID COPY", set, mailbox_name)
    }

    fn copy_command(
        &mut self,
        command: &'static str,
        set: &SequenceSet,
        mailbox_name: &str,
    ) -> Result<()> {
        self.check_state(command, &[State::Selected])?;
        let mut args = command.as_bytes().to_vec();
        args.push(b' ');
        args.extend(set.to_string().into_bytes());
        args.push(b' ');
        builders::mailbox(&mut args, mailbox_name)?;
        self.execute(command, args)
    }

    // ----- command plumbing -----

    pub(crate) fn check_state(&self, command: &'static str, allowed: &[State]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::BadState { command })
        }
    }

    /// Sends one tagged command and folds the full response into the
    /// session state.
    pub(crate) fn execute(&mut self, command: &'static str, args: Vec<u8>) -> Result<()> {
        self.run_command(&args)?;
        let response = self.read_command_response()?;
        self.apply_response(response, command)
    }

    fn run_command(&mut self, untagged: &[u8]) -> Result<()> {
        self.tag += 1;
        if let Some(progress) = &mut self.progress {
            progress.total = 0;
            progress.since_report = 0;
        }
        let mut line = format!("{}{} ", TAG_PREFIX, self.tag).into_bytes();
        line.extend(untagged);
        debug!("C: {}", String::from_utf8_lossy(&line));
        line.extend(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()?;
        Ok(())
    }

    fn readline(&mut self, into: &mut Vec<u8>) -> Result<()> {
        let read = self.stream.read_until(b'\n', into)?;
        if read == 0 {
            return Err(Error::ConnectionLost);
        }
        if let Some(progress) = &mut self.progress {
            progress.total += read;
            progress.since_report += read;
            if progress.since_report >= progress.rate {
                progress.since_report = 0;
                (progress.callback)(progress.total);
            }
        }
        Ok(())
    }

    /// Reads one full response unit, pulling more lines while a
    /// literal keeps the unit incomplete.
    pub(crate) fn read_unit(&mut self) -> Result<Response> {
        enum Step {
            Complete(usize, Response),
            NeedMore,
            Failed,
        }
        let mut data = Vec::new();
        loop {
            self.readline(&mut data)?;
            // convert the borrowed parse result before `data` moves
            let step = match parse_response(&data, &self.registry) {
                Ok((rest, response)) => Step::Complete(rest.len(), response),
                Err(nom::Err::Incomplete(_)) => Step::NeedMore,
                Err(_) => Step::Failed,
            };
            match step {
                Step::Complete(0, response) => {
                    trace!("S: {}", String::from_utf8_lossy(&data));
                    return Ok(response);
                }
                // a unit must end exactly at a line boundary
                Step::Complete(..) | Step::Failed => return Err(Error::Parse(data)),
                Step::NeedMore => {}
            }
        }
    }

    fn read_command_response(&mut self) -> Result<CommandResponse> {
        let mut data_items = Vec::new();
        loop {
            match self.read_unit() {
                Ok(Response::Done(done)) => {
                    let expected = format!("{}{}", TAG_PREFIX, self.tag);
                    if done.tag.0 != expected {
                        return Err(Error::TagMismatch);
                    }
                    return Ok(CommandResponse {
                        data: data_items,
                        done: ResponseDone::Tagged(done),
                    });
                }
                Ok(unit) => data_items.push(unit),
                Err(Error::ConnectionLost) => {
                    return match extract_fatal(&mut data_items) {
                        Some(bye) => Ok(CommandResponse {
                            data: data_items,
                            done: ResponseDone::Fatal(bye),
                        }),
                        None => Err(Error::ConnectionLost),
                    };
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Replaces the per-command response info and routes every unit of
    /// the response into the session state.
    pub(crate) fn apply_response(
        &mut self,
        response: CommandResponse,
        command: &'static str,
    ) -> Result<()> {
        self.response_info = ResponseInfo::default();
        let CommandResponse { data, done } = response;
        for unit in data {
            self.apply_unit(unit);
        }
        match done {
            ResponseDone::Tagged(TaggedDone {
                status,
                code,
                information,
                ..
            }) => {
                if let Some(code) = code {
                    self.apply_code(code, &information);
                }
                self.last_response = information;
                match status {
                    Status::Ok => Ok(()),
                    Status::No => Err(Error::No {
                        command,
                        information: self.last_response.clone(),
                    }),
                    Status::Bad => Err(Error::Bad {
                        command,
                        information: self.last_response.clone(),
                    }),
                    // PREAUTH/BYE are not valid tagged conditions
                    _ => Err(Error::Parse(Vec::new())),
                }
            }
            ResponseDone::Fatal(Bye { code, information }) => {
                if let Some(code) = code {
                    self.apply_code(code, &information);
                }
                self.last_response = information;
                self.state = State::Logout;
                if command == "LOGOUT" {
                    Ok(())
                } else {
                    Err(Error::ConnectionLost)
                }
            }
        }
    }

    fn apply_unit(&mut self, unit: Response) {
        match unit {
            Response::Capabilities(caps) => {
                self.connection_info.capabilities = Some(caps);
            }
            Response::Data {
                code, information, ..
            } => {
                if let Some(code) = code {
                    self.apply_code(code, &information);
                }
            }
            Response::Expunge(number) => self.response_info.expunged.push(number),
            Response::Fetch(number, attributes) => {
                self.response_info.fetch_list.push(FetchedMessage {
                    number,
                    attributes,
                });
            }
            Response::MailboxData(datum) => self.apply_mailbox_data(datum),
            Response::Extension(data) => self.response_info.extension_list.push(data),
            // continuation requests and tagged completions never end
            // up in the data list
            _ => {}
        }
    }

    fn apply_mailbox_data(&mut self, datum: MailboxDatum) {
        match datum {
            MailboxDatum::Exists(n) => {
                if let Some(sel) = &mut self.selection_info {
                    sel.exists = Some(n);
                }
            }
            MailboxDatum::Recent(n) => {
                if let Some(sel) = &mut self.selection_info {
                    sel.recent = Some(n);
                }
            }
            MailboxDatum::Flags(flags) => {
                if let Some(sel) = &mut self.selection_info {
                    sel.flags = Some(flags);
                }
            }
            MailboxDatum::List(list) => self.response_info.mailbox_list.push(list),
            MailboxDatum::Lsub(list) => self.response_info.mailbox_lsub.push(list),
            MailboxDatum::Search(ids) => self.response_info.search_result = ids,
            MailboxDatum::Status(status) => self.response_info.status = Some(status),
            MailboxDatum::Extension(data) => self.response_info.extension_list.push(data),
            _ => {}
        }
    }

    fn apply_code(&mut self, code: ResponseCode, information: &Option<String>) {
        match code {
            ResponseCode::Alert => self.response_info.alert = information.clone(),
            ResponseCode::Parse => self.response_info.parse = information.clone(),
            ResponseCode::BadCharset(charsets) => {
                self.response_info.badcharset = Some(charsets.unwrap_or_default());
            }
            ResponseCode::Capabilities(caps) => {
                self.connection_info.capabilities = Some(caps);
            }
            ResponseCode::PermanentFlags(flags) => {
                if let Some(sel) = &mut self.selection_info {
                    sel.perm_flags = Some(flags);
                }
            }
            ResponseCode::ReadOnly => {
                if let Some(sel) = &mut self.selection_info {
                    sel.access = Some(Access::ReadOnly);
                }
            }
            ResponseCode::ReadWrite => {
                if let Some(sel) = &mut self.selection_info {
                    sel.access = Some(Access::ReadWrite);
                }
            }
            ResponseCode::TryCreate => self.response_info.trycreate = true,
            ResponseCode::UidNext(n) => {
                if let Some(sel) = &mut self.selection_info {
                    sel.uid_next = Some(n);
                }
            }
            ResponseCode::UidValidity(n) => {
                if let Some(sel) = &mut self.selection_info {
                    sel.uid_validity = Some(n);
                }
            }
            ResponseCode::Unseen(n) => {
                if let Some(sel) = &mut self.selection_info {
                    sel.first_unseen = Some(n);
                }
            }
            ResponseCode::Extension(data) => self.response_info.extension_list.push(data),
            ResponseCode::Other { atom, value } => {
                self.response_info.atom = Some(atom);
                self.response_info.value = value;
            }
            _ => {}
        }
    }

    #[cfg(test)]
    pub(crate) fn stream_ref(&self) -> &T {
        self.stream.get_ref()
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: State) {
        self.state = state;
    }

    #[cfg(test)]
    pub(crate) fn set_selection_for_tests(&mut self, info: SelectionInfo) {
        self.selection_info = Some(info);
    }
}

fn extract_fatal(items: &mut Vec<Response>) -> Option<Bye> {
    let pos = items.iter().rposition(|unit| {
        matches!(
            unit,
            Response::Data {
                status: Status::Bye,
                ..
            }
        )
    })?;
    match items.remove(pos) {
        Response::Data {
            code, information, ..
        } => Some(Bye { code, information }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_stream::MockStream;
    use imap_model::{
        Flag, FlagPerm, MailboxSFlag, SearchKey, SequenceSet, StatusAttribute, StoreAttFlags,
    };

    fn session_with(response: &str) -> Session<MockStream> {
        Session::new(MockStream::new(response.as_bytes().to_vec()))
    }

    fn authenticated(response: &str) -> Session<MockStream> {
        let mut session = session_with(response);
        session.set_state(State::Authenticated);
        session
    }

    fn selected(response: &str) -> Session<MockStream> {
        let mut session = session_with(response);
        session.set_state(State::Selected);
        session.selection_info = Some(SelectionInfo::default());
        session
    }

    fn written(session: &Session<MockStream>) -> String {
        String::from_utf8(session.stream_ref().written_buf.clone()).unwrap()
    }

    #[test]
    fn connect_moves_to_not_authenticated() {
        let mut session = session_with("* OK [CAPABILITY IMAP4rev1 UIDPLUS] ready\r\n");
        session.connect().unwrap();
        assert_eq!(session.state(), State::NotAuthenticated);
        assert!(session.connection_info().has_capability("UIDPLUS"));
    }

    #[test]
    fn connect_preauth_moves_to_authenticated() {
        let mut session = session_with("* PREAUTH welcome back\r\n");
        session.connect().unwrap();
        assert_eq!(session.state(), State::Authenticated);
    }

    #[test]
    fn connect_bye_is_refused() {
        let mut session = session_with("* BYE overloaded\r\n");
        assert!(matches!(session.connect(), Err(Error::ConnectionRefused)));
        assert_eq!(session.state(), State::Disconnected);
    }

    #[test]
    fn login_sends_quoted_arguments_and_transitions() {
        let mut session = session_with("a1 OK LOGIN completed\r\n");
        session.set_state(State::NotAuthenticated);
        session.login("user", "pass word").unwrap();
        assert_eq!(session.state(), State::Authenticated);
        assert_eq!(written(&session), "a1 LOGIN user \"pass word\"\r\n");
    }

    #[test]
    fn login_failure_reports_server_text() {
        let mut session = session_with("a1 NO [AUTHENTICATIONFAILED] bad creds\r\n");
        session.set_state(State::NotAuthenticated);
        match session.login("user", "pass") {
            Err(Error::No {
                command: "LOGIN",
                information,
            }) => {
                assert_eq!(information.as_deref(), Some("bad creds"));
            }
            result => panic!("unexpected result {result:?}"),
        }
        assert_eq!(session.state(), State::NotAuthenticated);
        // the unknown code is still kept for inspection
        assert_eq!(
            session.response_info().atom.as_deref(),
            Some("AUTHENTICATIONFAILED")
        );
    }

    #[test]
    fn login_in_wrong_state_fails_without_writing() {
        let mut session = session_with("");
        session.set_state(State::Selected);
        assert!(matches!(
            session.login("user", "pass"),
            Err(Error::BadState { command: "LOGIN" })
        ));
        assert!(session.stream_ref().written_buf.is_empty());
    }

    #[test]
    fn select_populates_selection_info() {
        let response = "* 172 EXISTS\r\n\
                        * 1 RECENT\r\n\
                        * OK [UNSEEN 12] Message 12 is first unseen\r\n\
                        * OK [UIDVALIDITY 3857529045] UIDs valid\r\n\
                        * OK [UIDNEXT 4392] Predicted next UID\r\n\
                        * FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)\r\n\
                        * OK [PERMANENTFLAGS (\\Deleted \\Seen \\*)] Limited\r\n\
                        a1 OK [READ-WRITE] SELECT completed\r\n";
        let mut session = authenticated(response);
        session.select("INBOX").unwrap();
        assert_eq!(session.state(), State::Selected);
        let sel = session.selection_info().unwrap();
        assert_eq!(sel.exists, Some(172));
        assert_eq!(sel.recent, Some(1));
        assert_eq!(sel.first_unseen, Some(12));
        assert_eq!(sel.uid_validity, Some(3857529045));
        assert_eq!(sel.uid_next, Some(4392));
        assert_eq!(sel.access, Some(Access::ReadWrite));
        assert_eq!(sel.flags.as_ref().unwrap().len(), 5);
        assert_eq!(
            sel.perm_flags,
            Some(vec![
                FlagPerm::Flag(Flag::Deleted),
                FlagPerm::Flag(Flag::Seen),
                FlagPerm::All,
            ])
        );
        assert_eq!(written(&session), "a1 SELECT \"INBOX\"\r\n");
    }

    #[test]
    fn failed_select_clears_selection_and_returns_to_authenticated() {
        let mut session = selected("a1 NO no such mailbox\r\n");
        assert!(session.select("missing").is_err());
        assert_eq!(session.state(), State::Authenticated);
        assert!(session.selection_info().is_none());
    }

    #[test]
    fn permanent_flags_absent_when_code_missing() {
        let mut session = authenticated("* 3 EXISTS\r\na1 OK done\r\n");
        session.select("INBOX").unwrap();
        let sel = session.selection_info().unwrap();
        assert_eq!(sel.perm_flags, None);
    }

    #[test]
    fn search_returns_hits_and_clears_between_commands() {
        let mut session = selected("* SEARCH 2 84 882\r\na1 OK SEARCH completed\r\n");
        let hits = session
            .search(None, &SearchKey::Keyword("todo".to_owned()))
            .unwrap();
        assert_eq!(hits, vec![2, 84, 882]);
        assert_eq!(written(&session), "a1 SEARCH KEYWORD todo\r\n");
        assert!(session.response_info().search_result.is_empty());
    }

    #[test]
    fn uid_search_with_charset() {
        let mut session = selected("* SEARCH 5\r\na1 OK done\r\n");
        let hits = session
            .uid_search(Some("UTF-8"), &SearchKey::Unseen)
            .unwrap();
        assert_eq!(hits, vec![5]);
        assert_eq!(written(&session), "a1 UID SEARCH CHARSET UTF-8 UNSEEN\r\n");
    }

    #[test]
    fn fetch_collects_message_attributes() {
        let response = "* 2 FETCH (FLAGS (\\Seen) UID 350)\r\n\
                        * 3 FETCH (BODY[TEXT] {3}\r\nfoo)\r\n\
                        a1 OK FETCH completed\r\n";
        let mut session = selected(response);
        let messages = session
            .fetch(
                &SequenceSet::interval(2, 3),
                &FetchType::AttList(vec![
                    imap_model::FetchAtt::Flags,
                    imap_model::FetchAtt::Uid,
                ]),
            )
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].number, 2);
        assert_eq!(messages[1].number, 3);
        assert_eq!(written(&session), "a1 FETCH 2:3 (FLAGS UID)\r\n");
    }

    #[test]
    fn store_returns_updated_fetches() {
        let response = "* 7 FETCH (FLAGS (\\Deleted \\Seen))\r\na1 OK STORE completed\r\n";
        let mut session = selected(response);
        let updated = session
            .store(
                &SequenceSet::single(7),
                &StoreAttFlags::add(vec![Flag::Deleted]),
            )
            .unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(written(&session), "a1 STORE 7 +FLAGS (\\Deleted)\r\n");
    }

    #[test]
    fn expunge_collects_message_numbers() {
        let response = "* 3 EXPUNGE\r\n* 3 EXPUNGE\r\n* 5 EXPUNGE\r\na1 OK done\r\n";
        let mut session = selected(response);
        assert_eq!(session.expunge().unwrap(), vec![3, 3, 5]);
    }

    #[test]
    fn status_returns_status_data() {
        let response =
            "* STATUS blurdybloop (MESSAGES 231 UIDNEXT 44292)\r\na1 OK STATUS completed\r\n";
        let mut session = authenticated(response);
        let status = session
            .status("blurdybloop", &[StatusAtt::Messages, StatusAtt::UidNext])
            .unwrap()
            .unwrap();
        assert_eq!(status.mailbox, "blurdybloop");
        assert_eq!(
            status.attributes,
            vec![
                StatusAttribute::Messages(231),
                StatusAttribute::UidNext(44292),
            ]
        );
        assert_eq!(
            written(&session),
            "a1 STATUS \"blurdybloop\" (MESSAGES UIDNEXT)\r\n"
        );
    }

    #[test]
    fn list_returns_mailboxes() {
        let response = "* LIST (\\Noselect) \"/\" foo\r\n\
                        * LIST () \"/\" foo/bar\r\n\
                        a1 OK LIST completed\r\n";
        let mut session = authenticated(response);
        let boxes = session.list("", "*").unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(
            boxes[0].flags.as_ref().unwrap().sflag,
            Some(MailboxSFlag::NoSelect)
        );
        assert_eq!(boxes[1].name, "foo/bar");
        assert_eq!(written(&session), "a1 LIST \"\" \"*\"\r\n");
    }

    #[test]
    fn append_waits_for_continuation() {
        let response = "+ Ready for literal data\r\na1 OK APPEND completed\r\n";
        let mut session = authenticated(response);
        session
            .append("outbox", &[Flag::Seen], b"Subject: hi\r\n\r\nbody")
            .unwrap();
        assert_eq!(
            written(&session),
            "a1 APPEND \"outbox\" (\\Seen) {19}\r\nSubject: hi\r\n\r\nbody\r\n"
        );
    }

    #[test]
    fn append_rejected_before_literal() {
        let response = "a1 NO [TRYCREATE] no such mailbox\r\n";
        let mut session = authenticated(response);
        let result = session.append("missing", &[], b"data");
        assert!(matches!(result, Err(Error::No { .. })));
        assert!(session.response_info().trycreate);
        // the literal body was never sent
        assert!(!written(&session).contains("data"));
    }

    #[test]
    fn logout_accepts_bye_then_tagged_ok() {
        let response = "* BYE IMAP4rev1 Server logging out\r\na1 OK LOGOUT completed\r\n";
        let mut session = authenticated(response);
        session.logout().unwrap();
        assert_eq!(session.state(), State::Logout);
    }

    #[test]
    fn close_returns_to_authenticated() {
        let mut session = selected("a1 OK CLOSE completed\r\n");
        session.close().unwrap();
        assert_eq!(session.state(), State::Authenticated);
        assert!(session.selection_info().is_none());
    }

    #[test]
    fn alert_text_is_captured() {
        let response = "* OK [ALERT] System shutdown in 10 minutes\r\na1 OK done\r\n";
        let mut session = authenticated(response);
        session.noop().unwrap();
        assert_eq!(
            session.response_info().alert.as_deref(),
            Some("System shutdown in 10 minutes")
        );
    }

    #[test]
    fn response_info_is_replaced_every_command() {
        let response = "* 4 EXPUNGE\r\na1 OK done\r\na2 OK done\r\n";
        let mut session = selected(response);
        session.expunge().unwrap();
        session.check().unwrap();
        // nothing from the first command leaks into the second
        assert!(session.response_info().expunged.is_empty());
    }

    #[test]
    fn connection_lost_mid_response() {
        let mut session = selected("* 1 EXISTS\r\n");
        assert!(matches!(session.check(), Err(Error::ConnectionLost)));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let mut session = selected("!!! not imap\r\n");
        assert!(matches!(session.check(), Err(Error::Parse(_))));
    }

    #[test]
    fn delayed_reads_still_assemble_a_unit() {
        let stream = MockStream::default()
            .with_buf(b"* OK ready\r\n".to_vec())
            .with_delay();
        let mut session = Session::new(stream);
        session.connect().unwrap();
        assert_eq!(session.state(), State::NotAuthenticated);
    }

    #[test]
    fn read_errors_surface_as_io() {
        let stream = MockStream::default().with_err();
        let mut session = Session::new(stream);
        assert!(matches!(session.connect(), Err(Error::Io(_))));
    }
}
