//! HTML rendering of the chat page.

use minijinja::Environment;
use serde::Serialize;

use crate::chat::{ChatError, Severity};
use crate::session::{DisplayOptions, SessionState};
use crate::table::TableSummary;

/// Name of the page template.
const PAGE_TEMPLATE: &str = "index.html";

/// Page template source.
const PAGE_SOURCE: &str = include_str!("../../templates/index.html");

/// Rows of the uploaded table shown on the page.
pub const PREVIEW_ROWS: usize = 50;

/// Kind of banner shown above the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Completed action.
    Success,
    /// Input problem, nothing changed.
    Warning,
    /// Upstream failure.
    Error,
}

/// Banner shown above the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Banner kind.
    pub level: NoticeLevel,
    /// Banner text.
    pub text: String,
}

impl Notice {
    /// Success banner.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    /// Error banner.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl From<&ChatError> for Notice {
    fn from(err: &ChatError) -> Self {
        let level = match err.severity() {
            Severity::Warning => NoticeLevel::Warning,
            Severity::Error => NoticeLevel::Error,
        };
        Self {
            level,
            text: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ConversationOption {
    id: String,
    title: String,
    selected: bool,
}

#[derive(Serialize)]
struct MessageView {
    role: &'static str,
    content: String,
    time: String,
}

#[derive(Serialize)]
struct UploadView {
    file_name: String,
    error: Option<String>,
    row_count: usize,
    column_count: usize,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    stats: Vec<String>,
}

/// Everything the template needs.
#[derive(Serialize)]
pub struct PageView {
    model: String,
    conversations: Vec<ConversationOption>,
    messages: Vec<MessageView>,
    notices: Vec<Notice>,
    upload: Option<UploadView>,
    display: DisplayOptions,
    draft: String,
}

impl PageView {
    /// Build the view from a session state. The uploaded table is parsed
    /// again from its raw bytes; a parse failure becomes an error notice.
    #[must_use]
    pub fn build(state: &SessionState, model: &str, mut notices: Vec<Notice>, draft: String) -> Self {
        let current = state.conversations.current_id();
        let conversations = state
            .conversations
            .list_titles()
            .into_iter()
            .map(|entry| ConversationOption {
                selected: Some(&entry.id) == current,
                id: entry.id.to_string(),
                title: entry.title,
            })
            .collect();

        let messages = state
            .conversations
            .current_messages()
            .iter()
            .map(|m| MessageView {
                role: m.role().as_str(),
                content: m.content().to_string(),
                time: m.created_at().format("%H:%M:%S").to_string(),
            })
            .collect();

        let upload = state.upload.as_ref().map(|upload| match upload.table() {
            Ok(table) => {
                let summary = TableSummary::from_table(&table);
                UploadView {
                    file_name: upload.file_name.clone(),
                    error: None,
                    row_count: summary.row_count,
                    column_count: summary.column_count,
                    columns: summary.column_names,
                    rows: table.preview(PREVIEW_ROWS).to_vec(),
                    stats: summary.stats.iter().map(ToString::to_string).collect(),
                }
            }
            Err(err) => {
                let text = ChatError::from(err).to_string();
                if !notices.iter().any(|n| n.text == text) {
                    notices.push(Notice::error(text.clone()));
                }
                UploadView {
                    file_name: upload.file_name.clone(),
                    error: Some(text),
                    row_count: 0,
                    column_count: 0,
                    columns: Vec::new(),
                    rows: Vec::new(),
                    stats: Vec::new(),
                }
            }
        });

        Self {
            model: model.to_string(),
            conversations,
            messages,
            notices,
            upload,
            display: state.display,
            draft,
        }
    }
}

/// Renders the chat page with an auto-escaping template.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    /// Load the page template.
    ///
    /// # Errors
    /// Returns an error if the template does not compile.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE, PAGE_SOURCE)?;
        Ok(Self { env })
    }

    /// Render the page.
    ///
    /// # Errors
    /// Returns an error if rendering fails.
    pub fn render(&self, view: &PageView) -> Result<String, minijinja::Error> {
        self.env.get_template(PAGE_TEMPLATE)?.render(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Message;
    use crate::session::Upload;

    fn render(state: &SessionState, notices: Vec<Notice>) -> String {
        let renderer = PageRenderer::new();
        assert!(renderer.is_ok());
        renderer
            .ok()
            .and_then(|r| r.render(&PageView::build(state, "fake-model", notices, String::new())).ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_empty_page() {
        let html = render(&SessionState::default(), Vec::new());
        assert!(html.contains("<form"));
        assert!(html.contains("fake-model"));
        assert!(html.contains("No messages yet"));
    }

    #[test]
    fn test_messages_are_escaped() {
        let mut state = SessionState::default();
        state
            .conversations
            .create_conversation(Some(Message::user("<script>alert(1)</script>")));
        let html = render(&state, Vec::new());

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_selector_marks_current() {
        let mut state = SessionState::default();
        state.conversations.create_conversation(Some(Message::user("first topic")));
        state.conversations.create_conversation(None);
        let html = render(&state, Vec::new());

        assert!(html.contains("first topic"));
        assert!(html.contains(r#"<option value="chat_1" selected>"#));
    }

    #[test]
    fn test_warning_notice() {
        let notice = Notice::from(&ChatError::EmptyInput);
        assert_eq!(notice.level, NoticeLevel::Warning);
        let html = render(&SessionState::default(), vec![notice]);
        assert!(html.contains("notice warning"));
    }

    #[test]
    fn test_upload_table_and_stats_toggles() {
        let mut state = SessionState::default();
        state.upload = Some(Upload {
            file_name: "scores.csv".to_string(),
            bytes: b"name,score\nann,1\nben,3\n".to_vec(),
        });

        let hidden = render(&state, Vec::new());
        assert!(hidden.contains("scores.csv"));
        assert!(!hidden.contains("<td>ann</td>"));

        state.display.show_table = true;
        state.display.show_stats = true;
        let shown = render(&state, Vec::new());
        assert!(shown.contains("<td>ann</td>"));
        assert!(shown.contains("score: count=2"));
    }

    #[test]
    fn test_broken_upload_shows_error() {
        let mut state = SessionState::default();
        state.upload = Some(Upload {
            file_name: "broken.csv".to_string(),
            bytes: b"a,b\n1\n".to_vec(),
        });
        let html = render(&state, Vec::new());
        assert!(html.contains("notice error"));
        assert!(html.contains("could not read uploaded table"));
    }
}
