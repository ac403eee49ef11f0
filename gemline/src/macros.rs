/// Creates a single [`ConversationTurn`](crate::ConversationTurn) from a role shorthand.
///
/// ```rust
/// use gemline::{TurnRole, gm_turn};
///
/// let turn = gm_turn!(model => "Hello! How can I help?");
/// assert_eq!(turn.role, TurnRole::Model);
/// assert_eq!(turn.text, "Hello! How can I help?");
/// ```
#[macro_export]
macro_rules! gm_turn {
    (user => $text:expr $(,)?) => {
        $crate::ConversationTurn::user($text)
    };
    (model => $text:expr $(,)?) => {
        $crate::ConversationTurn::model($text)
    };
    ($role:ident => $text:expr $(,)?) => {
        compile_error!("unsupported role: use user or model");
    };
}

/// Creates a `Vec<ConversationTurn>` from role/text pairs.
///
/// ```rust
/// use gemline::{TurnRole, gm_history};
///
/// let history = gm_history![
///     user => "Which video did best?",
///     model => "Your launch video.",
/// ];
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[1].role, TurnRole::Model);
/// ```
#[macro_export]
macro_rules! gm_history {
    () => {
        Vec::<$crate::ConversationTurn>::new()
    };
    ($($role:ident => $text:expr),+ $(,)?) => {
        vec![$($crate::gm_turn!($role => $text)),+]
    };
}
