//! Streaming rewrite of the `<scm>` block of a Maven descriptor.

use super::error::PomError;
use crate::urls::RepositoryPath;
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

const PROJECT: &[u8] = b"project";
const SCM: &[u8] = b"scm";

/// The three SCM fields written into the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScmCoordinates {
    pub connection: String,
    pub developer_connection: String,
    pub url: String,
}

impl ScmCoordinates {
    /// Coordinates of a repository on GitHub.
    #[must_use]
    pub fn for_github(path: &RepositoryPath) -> Self {
        let ssh = format!("scm:git:git@github.com:{path}.git");
        Self {
            connection: ssh.clone(),
            developer_connection: ssh,
            url: format!("https://github.com/{path}"),
        }
    }

    fn value_for(&self, field: &[u8]) -> Option<(&'static str, &str)> {
        match field {
            b"connection" => Some(("connection", &self.connection)),
            b"developerConnection" => Some(("developerConnection", &self.developer_connection)),
            b"url" => Some(("url", &self.url)),
            _ => None,
        }
    }
}

/// A rewritten descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomRewrite {
    /// Full document text after the rewrite.
    pub content: String,
    /// False when every field already held its target value.
    pub changed: bool,
}

/// Field currently being replaced, with the text it held.
struct OpenField {
    depth: usize,
    previous: Vec<u8>,
    target: String,
}

/// Replaces `connection`, `developerConnection` and `url` under
/// `/project/scm` with `coordinates`.
///
/// Every other event is copied through untouched, so comments, whitespace
/// and namespace declarations survive. All three fields must be present.
pub fn rewrite_scm(xml: &str, coordinates: &ScmCoordinates) -> Result<PomRewrite, PomError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut scm_found = false;
    let mut written: Vec<&'static str> = Vec::new();
    let mut changed = false;
    let mut open: Option<OpenField> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| PomError::Parse {
                position: reader.error_position(),
                message: e.to_string(),
            })?;

        if let Some(field) = open.as_mut() {
            match event {
                Event::Start(_) => {
                    stack.push(Vec::new());
                    field.previous.push(b'<');
                }
                Event::Text(text) => field.previous.extend_from_slice(&text),
                Event::End(end) if stack.len() == field.depth => {
                    changed |= field.previous.trim_ascii() != field.target.as_bytes();
                    open = None;
                    stack.pop();
                    write(&mut writer, Event::End(end))?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => field.previous.push(b'&'),
            }
            buf.clear();
            continue;
        }

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                let name = start.local_name().as_ref().to_vec();
                if at_scm(&stack) {
                    if let Some((field, value)) = coordinates.value_for(&name) {
                        written.push(field);
                        write(&mut writer, Event::Start(start))?;
                        write(&mut writer, Event::Text(BytesText::new(value)))?;
                        stack.push(name);
                        open = Some(OpenField {
                            depth: stack.len(),
                            previous: Vec::new(),
                            target: value.to_string(),
                        });
                        buf.clear();
                        continue;
                    }
                }
                if name == SCM && stack.len() == 1 && stack[0] == PROJECT {
                    scm_found = true;
                }
                stack.push(name);
                write(&mut writer, Event::Start(start))?;
            }
            Event::Empty(empty) => {
                let name = empty.local_name().as_ref().to_vec();
                if name == SCM && stack.len() == 1 && stack[0] == PROJECT {
                    scm_found = true;
                }
                match coordinates.value_for(&name).filter(|_| at_scm(&stack)) {
                    Some((field, value)) => {
                        written.push(field);
                        changed = true;
                        let end = empty.to_end().into_owned();
                        write(&mut writer, Event::Start(empty))?;
                        write(&mut writer, Event::Text(BytesText::new(value)))?;
                        write(&mut writer, Event::End(end))?;
                    }
                    None => write(&mut writer, Event::Empty(empty))?,
                }
            }
            Event::End(end) => {
                stack.pop();
                write(&mut writer, Event::End(end))?;
            }
            other => write(&mut writer, other)?,
        }
        buf.clear();
    }

    if !scm_found {
        return Err(PomError::MissingScm);
    }
    for field in ["connection", "developerConnection", "url"] {
        if !written.contains(&field) {
            return Err(PomError::MissingField(field));
        }
    }

    let content = String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| PomError::Write(e.to_string()))?;
    Ok(PomRewrite { content, changed })
}

fn at_scm(stack: &[Vec<u8>]) -> bool {
    stack.len() == 2 && stack[0] == PROJECT && stack[1] == SCM
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<(), PomError> {
    writer
        .write_event(event)
        .map_err(|e| PomError::Write(e.to_string()))
}
