//! Outbound message assembly: preamble, history, then the new message.
//!
//! ```rust
//! use gchat::{ChatRequest, Preamble, UserInfo};
//!
//! let preamble = Preamble::new("Answer briefly.");
//! let request = ChatRequest::new("hello").with_user_info(UserInfo::new("Ada"));
//! let contents = preamble.contents_for(&request);
//! assert_eq!(contents.len(), 3);
//! ```

use gprovider::{Content, InlineData, Part, Role};

use crate::{ChatRequest, ConversationTurn, ImageAttachment, UserInfo};

pub const INSTRUCTIONS_LEAD: &str = "Follow these instructions in every response:\n\n";
pub const INSTRUCTIONS_ACK: &str = "Got it! I'll follow those instructions.";

/// Fixed instructional prompt sent ahead of every conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preamble {
    instructions: Option<String>,
}

impl Preamble {
    pub fn new(instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        Self {
            instructions: (!instructions.trim().is_empty()).then_some(instructions),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    /// Instruction turn pair, or nothing when there is neither a prompt nor a known name.
    pub fn turns(&self, user: Option<&UserInfo>) -> Vec<Content> {
        let personalisation = user.and_then(UserInfo::display_name).map(|name| {
            format!("The current user's name is {name}. Address them by their first name.")
        });

        let body = match (self.instructions.as_deref(), personalisation) {
            (None, None) => return Vec::new(),
            (Some(instructions), None) => instructions.to_string(),
            (None, Some(line)) => line,
            (Some(instructions), Some(line)) => format!("{instructions}\n\n{line}"),
        };

        vec![
            Content::user_text(format!("{INSTRUCTIONS_LEAD}{body}")),
            Content::model_text(INSTRUCTIONS_ACK),
        ]
    }

    pub fn contents_for(&self, request: &ChatRequest) -> Vec<Content> {
        let mut contents = self.turns(request.user_info.as_ref());
        contents.extend(request.history.iter().filter_map(history_content));
        contents.push(Content::new(
            Role::User,
            message_parts(&request.message, &request.images),
        ));
        contents
    }
}

/// Turns with neither text nor images are dropped.
fn history_content(turn: &ConversationTurn) -> Option<Content> {
    let parts = message_parts(&turn.text, &turn.images);
    (!parts.is_empty()).then(|| Content::new(turn.role.into(), parts))
}

fn message_parts(text: &str, images: &[ImageAttachment]) -> Vec<Part> {
    let mut parts = Vec::with_capacity(images.len() + 1);
    if !text.is_empty() {
        parts.push(Part::text(text));
    }
    parts.extend(
        images
            .iter()
            .map(|image| Part::InlineData(InlineData::new(&image.mime_type, &image.data))),
    );
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_preamble_without_instructions_or_name() {
        let contents = Preamble::empty().contents_for(&ChatRequest::new("Hello"));
        assert_eq!(contents, vec![Content::user_text("Hello")]);
    }

    #[test]
    fn personalisation_line_follows_instructions() {
        let user = UserInfo::new("Ada").with_last_name("Lovelace");
        let turns = Preamble::new("Be terse.").turns(Some(&user));

        assert_eq!(
            turns,
            vec![
                Content::user_text(
                    "Follow these instructions in every response:\n\nBe terse.\n\nThe current user's name is Ada Lovelace. Address them by their first name."
                ),
                Content::model_text("Got it! I'll follow those instructions."),
            ]
        );
    }

    #[test]
    fn history_and_images_keep_order_and_roles() {
        let request = ChatRequest::new("what is this?")
            .with_turn(ConversationTurn::user("hi"))
            .with_turn(ConversationTurn::model(""))
            .with_turn(ConversationTurn::model("hello"))
            .with_image(ImageAttachment::new("image/jpeg", "BASE64"));

        let contents = Preamble::new("rules").contents_for(&request);

        assert_eq!(contents.len(), 5);
        assert_eq!(contents[2], Content::user_text("hi"));
        assert_eq!(contents[3], Content::model_text("hello"));
        assert_eq!(
            contents[4].parts,
            vec![
                Part::text("what is this?"),
                Part::InlineData(InlineData::new("image/jpeg", "BASE64")),
            ]
        );
    }

    #[test]
    fn blank_instructions_count_as_none() {
        assert_eq!(Preamble::new("  ").instructions(), None);
    }
}
