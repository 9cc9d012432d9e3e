//! User-correctable vote errors.
//!
//! The display text of each [`VoteErrorKind`] is the reply the requester sees,
//! so it is written for them (in Korean, like the rest of the bot's replies).

/// Conditions the requester can fix on their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum VoteErrorKind {
    /// Requested name contains a backtick.
    #[display("이름에는 `가 포함될 수 없어요.")]
    NameContainsBacktick,

    /// Requested name is longer than the platform allows.
    #[display("이름은 {}자 이내여야 해요.", _0)]
    NameTooLong(usize),

    /// Guild has no announcement channel.
    #[display("투표 기능이 설정되어있지 않습니다.")]
    ChannelNotConfigured,

    /// Configured announcement channel is gone or cannot receive messages.
    #[display("올바르지 않은 투표 채널이 설정되어 있습니다.")]
    InvalidChannel,

    /// Channel offered to the configuration command cannot receive messages.
    #[display("올바르지 않은 채널이에요.")]
    UnsendableChannel,

    /// Role is not on the guild's cosmetic allowlist.
    #[display("<@&{}> 역할은 투표로 추가 가능한 역할이 아닙니다.", _0)]
    RoleNotAllowed(u64),

    /// Requester is still cooling down; carries the rendered remaining time.
    #[display("아직 투표를 시작할 수 없어요. 남은 대기 시간: {}", _0)]
    CooldownActive(String),

    /// Target user is not a member of the guild.
    #[display("해당 유저는 이 서버에 존재하지 않아요.")]
    TargetNotInGuild,

    /// Role is already on the allowlist.
    #[display("해당 역할은 이미 추가되어 있습니다.")]
    RoleAlreadyAllowed,

    /// Role to remove is not on the allowlist.
    #[display("해당 역할은 치장 역할로 추가되어있지 않습니다.")]
    RoleNotListed,

    /// Free-form input could not be parsed (e.g. a role id).
    #[display("올바르지 않은 입력이에요: {}", _0)]
    InvalidInput(String),
}

/// User-correctable error with source location tracking.
///
/// # Examples
///
/// ```
/// use plebiscite_error::{VoteError, VoteErrorKind};
///
/// let err = VoteError::new(VoteErrorKind::NameTooLong(32));
/// assert_eq!(err.kind.to_string(), "이름은 32자 이내여야 해요.");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Vote Error: {} at line {} in {}", kind, line, file)]
pub struct VoteError {
    /// The kind of error that occurred
    pub kind: VoteErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl VoteError {
    /// Create a new VoteError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: VoteErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
