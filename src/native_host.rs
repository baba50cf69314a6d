//! Chrome native messaging endpoint for the extension.
//!
//! Each message is a 4-byte little-endian length followed by a UTF-8 JSON
//! body. Navigation events are answered with a decision; UI requests are
//! answered with the resulting records or an error message.

use crate::commands;
use crate::constants::{MAX_ECHOED_URL_LEN, MAX_MESSAGE_SIZE};
use crate::db::Database;
use crate::error::AppError;
use crate::gatekeeper::{BlockReason, Decision, Gatekeeper, NavigationEvent, RedirectSink};
use crate::models::{BlockedSite, BlockedWord, Settings, SettingsUpdate};
use crate::pause::PauseStatus;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum IncomingMessage {
    Navigation(NavigationEvent),
    /// Sent by the options page after an edit. Lists are read fresh on every
    /// navigation, so this is only acknowledged.
    RefreshBlocklist,
    ListSites {
        #[serde(default)]
        search: Option<String>,
    },
    AddSite { url: String },
    UpdateSite { id: String, url: String },
    DeleteSite { id: String },
    CheckSite { url: String },
    BlockSite { url: String },
    ListWords {
        #[serde(default)]
        search: Option<String>,
    },
    AddWord { word: String },
    DeleteWord { id: String },
    StartPause { duration: f64 },
    Resume,
    PauseStatus,
    GetSettings,
    UpdateSettings(SettingsUpdate),
    ResetSettings,
}

/// Messages keyed by `action` instead of `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionMessage {
    OpenOptions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Typed(IncomingMessage),
    Action(ActionMessage),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutgoingMessage {
    Allow { tab_id: i64 },
    Ignored { tab_id: i64 },
    Redirect {
        tab_id: i64,
        url: String,
        blocked_url: String,
        reason: BlockReason,
    },
    Ack,
    Sites { sites: Vec<BlockedSite> },
    Site { site: BlockedSite },
    SiteCheck(commands::SiteCheck),
    Words { words: Vec<BlockedWord> },
    Word { word: BlockedWord },
    Deleted { id: String },
    Pause(PauseStatus),
    Settings(Settings),
    Error { message: String },
}

/// Read one length-prefixed frame.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"),
        ));
    }

    let mut buffer = vec![0u8; len];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

/// Serialize `message` and write it as one frame.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    let json = serde_json::to_vec(message)?;
    if json.len() > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Response too large: {} bytes", json.len()),
        ));
    }
    let len = u32::try_from(json.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()
}

/// Carries out redirects by writing a `redirect` frame to the extension.
struct FrameSink<'a, W: Write> {
    writer: &'a mut W,
}

impl<W: Write> RedirectSink for FrameSink<'_, W> {
    fn redirect(
        &mut self,
        tab_id: i64,
        target: &str,
        blocked_url: &str,
        reason: &BlockReason,
    ) -> Result<(), AppError> {
        let message = OutgoingMessage::Redirect {
            tab_id,
            url: target.to_string(),
            blocked_url: truncate_url(blocked_url, MAX_ECHOED_URL_LEN).to_string(),
            reason: reason.clone(),
        };
        write_message(&mut *self.writer, &message)?;
        Ok(())
    }
}

/// Cut `url` to at most `max` bytes on a char boundary, so an echoed URL
/// cannot push a frame over the size limit.
fn truncate_url(url: &str, max: usize) -> &str {
    if url.len() <= max {
        return url;
    }
    let end = url
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max)
        .last()
        .unwrap_or(0);
    url.get(..end).unwrap_or_default()
}

fn respond<T>(result: Result<T, AppError>, ok: impl FnOnce(T) -> OutgoingMessage) -> OutgoingMessage {
    match result {
        Ok(value) => ok(value),
        Err(e) => {
            warn!("Request failed: {e}");
            OutgoingMessage::Error { message: e.to_string() }
        }
    }
}

pub struct NativeHost {
    db: Arc<Mutex<Database>>,
    gatekeeper: Gatekeeper,
}

impl NativeHost {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        let gatekeeper = Gatekeeper::new(Arc::clone(&db));
        Self { db, gatekeeper }
    }

    /// Serve frames until the reader is exhausted.
    ///
    /// Returns `UnexpectedEof` when the browser closes the pipe.
    pub fn run<R: Read, W: Write>(&self, reader: &mut R, writer: &mut W) -> io::Result<()> {
        loop {
            let frame = read_frame(reader)?;
            self.process_frame(&frame, Utc::now(), writer)?;
        }
    }

    /// Handle one frame body and write the response(s). Only I/O errors on
    /// `writer` are returned; a bad message gets an `error` response.
    pub fn process_frame<W: Write>(&self, frame: &[u8], now: DateTime<Utc>, writer: &mut W) -> io::Result<()> {
        let envelope = match serde_json::from_slice::<Envelope>(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Ignoring malformed message: {e}");
                return write_message(writer, &OutgoingMessage::Error {
                    message: format!("Invalid message: {e}"),
                });
            }
        };

        let response = match envelope {
            Envelope::Typed(message) => {
                let mut sink = FrameSink { writer: &mut *writer };
                self.handle_message(message, now, &mut sink)
            }
            Envelope::Action(ActionMessage::OpenOptions) => {
                info!("Options page requested");
                Some(OutgoingMessage::Ack)
            }
        };

        match response {
            Some(response) => write_message(writer, &response),
            None => Ok(()),
        }
    }

    /// Dispatch one message. Returns `None` when the reply was already sent
    /// through `sink` (a redirect).
    pub fn handle_message(
        &self,
        message: IncomingMessage,
        now: DateTime<Utc>,
        sink: &mut dyn RedirectSink,
    ) -> Option<OutgoingMessage> {
        let db = &self.db;
        let response = match message {
            IncomingMessage::Navigation(event) => {
                return match self.gatekeeper.handle_navigation(&event, now, sink) {
                    Decision::Redirect { .. } => None,
                    Decision::Allow => Some(OutgoingMessage::Allow { tab_id: event.tab_id }),
                    Decision::Ignored => Some(OutgoingMessage::Ignored { tab_id: event.tab_id }),
                };
            }
            IncomingMessage::RefreshBlocklist => {
                debug!("Blocklist refresh requested");
                OutgoingMessage::Ack
            }
            IncomingMessage::ListSites { search } => {
                respond(commands::list_sites(db, search.as_deref()), |sites| OutgoingMessage::Sites { sites })
            }
            IncomingMessage::AddSite { url } => {
                respond(commands::add_site(db, &url, now), |site| OutgoingMessage::Site { site })
            }
            IncomingMessage::UpdateSite { id, url } => {
                respond(commands::update_site(db, &id, &url), |site| OutgoingMessage::Site { site })
            }
            IncomingMessage::DeleteSite { id } => {
                respond(commands::delete_site(db, &id), |()| OutgoingMessage::Deleted { id })
            }
            IncomingMessage::CheckSite { url } => {
                respond(commands::check_site(db, &url), OutgoingMessage::SiteCheck)
            }
            IncomingMessage::BlockSite { url } => {
                respond(commands::block_current_site(db, &url, now), |site| OutgoingMessage::Site { site })
            }
            IncomingMessage::ListWords { search } => {
                respond(commands::list_words(db, search.as_deref()), |words| OutgoingMessage::Words { words })
            }
            IncomingMessage::AddWord { word } => {
                respond(commands::add_word(db, &word, now), |word| OutgoingMessage::Word { word })
            }
            IncomingMessage::DeleteWord { id } => {
                respond(commands::delete_word(db, &id), |()| OutgoingMessage::Deleted { id })
            }
            IncomingMessage::StartPause { duration } => respond(
                commands::start_pause(db, duration, now).and_then(|_| commands::pause_status(db, now)),
                OutgoingMessage::Pause,
            ),
            IncomingMessage::Resume => respond(
                commands::resume(db).and_then(|_| commands::pause_status(db, now)),
                OutgoingMessage::Pause,
            ),
            IncomingMessage::PauseStatus => respond(commands::pause_status(db, now), OutgoingMessage::Pause),
            IncomingMessage::GetSettings => respond(commands::get_settings(db, now), OutgoingMessage::Settings),
            IncomingMessage::UpdateSettings(update) => {
                respond(commands::update_settings(db, update, now), OutgoingMessage::Settings)
            }
            IncomingMessage::ResetSettings => {
                respond(commands::reset_settings(db, now), OutgoingMessage::Settings)
            }
        };
        Some(response)
    }
}
