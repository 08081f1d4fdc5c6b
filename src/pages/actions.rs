//! User actions dispatched to the current page.

use crate::models::SortOrder;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    ChangeSort {
        order_by: Option<String>,
        sort_order: SortOrder,
    },
    /// Go to a zero-based page index
    ChangePage(usize),
    /// Answer typed into the ellipsis prompt, one-based
    PromptPage(String),
    AddMessage {
        content: String,
        parent_id: Option<String>,
    },
    EditMessage {
        message_id: String,
        content: String,
    },
    DeleteMessage {
        message_id: String,
    },
    AddComment {
        message_id: String,
        content: String,
    },
    RenameThread {
        name: String,
    },
    DeleteThread,
    RenameAttachment {
        attachment_id: String,
        name: String,
    },
    SendPrivateMessage {
        recipient: String,
        content: String,
    },
    /// Composer content changed
    PreviewMessage {
        content: String,
    },
}

impl PageAction {
    pub fn name(&self) -> &'static str {
        match self {
            PageAction::ChangeSort { .. } => "change-sort",
            PageAction::ChangePage(_) => "change-page",
            PageAction::PromptPage(_) => "prompt-page",
            PageAction::AddMessage { .. } => "add-message",
            PageAction::EditMessage { .. } => "edit-message",
            PageAction::DeleteMessage { .. } => "delete-message",
            PageAction::AddComment { .. } => "add-comment",
            PageAction::RenameThread { .. } => "rename-thread",
            PageAction::DeleteThread => "delete-thread",
            PageAction::RenameAttachment { .. } => "rename-attachment",
            PageAction::SendPrivateMessage { .. } => "send-private-message",
            PageAction::PreviewMessage { .. } => "preview-message",
        }
    }
}

/// What a page did with an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The page does not support this action
    Unhandled,
    Done,
    /// The data changed; show `message` and refresh the list
    Refresh(String),
    /// Done; the page moved away to another location
    Navigate(String),
}
