//! Slash command definitions, parsing and execution.
//!
//! Parsing happens in two steps: Serenity's resolved option tree is first
//! flattened into a subcommand path plus plain [`OptionArg`] values, then
//! [`PlebisciteCommand::from_parts`] turns that into a typed command. The
//! second step has no Serenity types in it.

use plebiscite_error::{PlebisciteResult, VoteError, VoteErrorKind};
use plebiscite_interface::{
    ChannelId, ChatPlatform, GuildId, RoleId, UserId, VotePayload, VoteStore,
};
use plebiscite_vote::{VoteRequest, VoteService};
use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, Permissions, ResolvedOption,
    ResolvedValue,
};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// `/투표`: start a vote.
pub const VOTE_COMMAND: &str = "투표";
/// `/설정`: administrator configuration.
pub const SETTINGS_COMMAND: &str = "설정";

/// Application commands to register on ready.
pub fn definitions() -> Vec<CreateCommand> {
    let vote = CreateCommand::new(VOTE_COMMAND)
        .description("투표")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "이름",
                "특정 유저의 이름을 바꾸는 투표를 시작합니다.",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "유저", "이름을 바꿀 유저")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "이름", "바꿀 이름")
                    .required(true)
                    .max_length(32),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "역할",
                "특정 유저에게 역할을 주거나 뺏는 투표를 시작합니다.",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::User, "유저", "역할을 바꿀 유저")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Role, "역할", "부여할 역할")
                    .required(true),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "제거",
                "역할을 부여하는 대신 제거할지 여부",
            )),
        );

    let settings = CreateCommand::new(SETTINGS_COMMAND)
        .description("설정")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "투표-채널",
                "투표 채널을 설정합니다.",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Channel, "채널", "투표를 진행할 채널")
                    .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(CommandOptionType::SubCommandGroup, "치장-역할", "치장 역할")
                .add_sub_option(CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    "목록",
                    "설정된 치장 역할을 나열합니다.",
                ))
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::SubCommand,
                        "추가",
                        "치장 역할을 추가합니다.",
                    )
                    .add_sub_option(
                        CreateCommandOption::new(CommandOptionType::Role, "역할", "추가할 역할")
                            .required(true),
                    ),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::SubCommand,
                        "삭제",
                        "치장 역할을 삭제합니다.",
                    )
                    .add_sub_option(
                        CreateCommandOption::new(CommandOptionType::Role, "역할", "삭제할 역할")
                            .required(true),
                    ),
                )
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::SubCommand,
                        "삭제-아이디",
                        "치장 역할을 아이디로 삭제합니다.",
                    )
                    .add_sub_option(
                        CreateCommandOption::new(
                            CommandOptionType::String,
                            "역할-아이디",
                            "삭제할 역할의 아이디",
                        )
                        .required(true),
                    ),
                ),
        );

    vec![vote, settings]
}

/// A leaf option value with the Serenity types stripped off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionArg {
    /// User option.
    User(UserId),
    /// Role option.
    Role(RoleId),
    /// Channel option.
    Channel(ChannelId),
    /// String option.
    Text(String),
    /// Boolean option.
    Flag(bool),
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlebisciteCommand {
    /// `/투표 이름`
    RenameVote {
        /// Member to rename.
        target: UserId,
        /// Requested name.
        name: String,
    },
    /// `/투표 역할`
    RoleVote {
        /// Member whose roles change.
        target: UserId,
        /// Cosmetic role.
        role: RoleId,
        /// Revoke instead of grant.
        remove: bool,
    },
    /// `/설정 투표-채널`
    SetVoteChannel {
        /// New announcement channel.
        channel: ChannelId,
    },
    /// `/설정 치장-역할 목록`
    ListCosmeticRoles,
    /// `/설정 치장-역할 추가`
    AddCosmeticRole {
        /// Role to allow.
        role: RoleId,
    },
    /// `/설정 치장-역할 삭제` and `/설정 치장-역할 삭제-아이디`
    RemoveCosmeticRole {
        /// Role to disallow.
        role: RoleId,
    },
}

impl PlebisciteCommand {
    /// Build a command from its name, subcommand path and leaf arguments.
    ///
    /// Returns `Ok(None)` for shapes this bot never registered, and a
    /// user-correctable error for a role id that does not parse.
    pub fn from_parts(
        command: &str,
        path: &[&str],
        args: &HashMap<String, OptionArg>,
    ) -> Result<Option<Self>, VoteError> {
        let user = |name: &str| match args.get(name) {
            Some(OptionArg::User(id)) => Some(*id),
            _ => None,
        };
        let role = |name: &str| match args.get(name) {
            Some(OptionArg::Role(id)) => Some(*id),
            _ => None,
        };
        let text = |name: &str| match args.get(name) {
            Some(OptionArg::Text(value)) => Some(value.clone()),
            _ => None,
        };

        let parsed = match (command, path) {
            (VOTE_COMMAND, ["이름"]) => user("유저")
                .zip(text("이름"))
                .map(|(target, name)| Self::RenameVote { target, name }),
            (VOTE_COMMAND, ["역할"]) => {
                let remove = matches!(args.get("제거"), Some(OptionArg::Flag(true)));
                user("유저")
                    .zip(role("역할"))
                    .map(|(target, role)| Self::RoleVote {
                        target,
                        role,
                        remove,
                    })
            }
            (SETTINGS_COMMAND, ["투표-채널"]) => match args.get("채널") {
                Some(OptionArg::Channel(channel)) => Some(Self::SetVoteChannel { channel: *channel }),
                _ => None,
            },
            (SETTINGS_COMMAND, ["치장-역할", "목록"]) => Some(Self::ListCosmeticRoles),
            (SETTINGS_COMMAND, ["치장-역할", "추가"]) => {
                role("역할").map(|role| Self::AddCosmeticRole { role })
            }
            (SETTINGS_COMMAND, ["치장-역할", "삭제"]) => {
                role("역할").map(|role| Self::RemoveCosmeticRole { role })
            }
            (SETTINGS_COMMAND, ["치장-역할", "삭제-아이디"]) => match text("역할-아이디") {
                Some(raw) => Some(Self::RemoveCosmeticRole {
                    role: parse_role_id(&raw)?,
                }),
                None => None,
            },
            _ => None,
        };
        Ok(parsed)
    }

    /// Parse an interaction's resolved options.
    pub fn parse(command: &str, options: &[ResolvedOption<'_>]) -> Result<Option<Self>, VoteError> {
        let mut path = Vec::new();
        let mut args = HashMap::new();
        flatten(options, &mut path, &mut args);
        Self::from_parts(command, &path, &args)
    }
}

fn flatten<'a>(
    options: &'a [ResolvedOption<'a>],
    path: &mut Vec<&'a str>,
    args: &mut HashMap<String, OptionArg>,
) {
    for option in options {
        let arg = match &option.value {
            ResolvedValue::SubCommand(children) | ResolvedValue::SubCommandGroup(children) => {
                path.push(option.name);
                flatten(children, path, args);
                continue;
            }
            ResolvedValue::User(user, _) => OptionArg::User(UserId(user.id.get())),
            ResolvedValue::Role(role) => OptionArg::Role(RoleId(role.id.get())),
            ResolvedValue::Channel(channel) => OptionArg::Channel(ChannelId(channel.id.get())),
            ResolvedValue::String(value) => OptionArg::Text((*value).to_string()),
            ResolvedValue::Boolean(value) => OptionArg::Flag(*value),
            _ => continue,
        };
        args.insert(option.name.to_string(), arg);
    }
}

/// Parse a raw role id typed by an administrator. Accepts a bare id or a
/// `<@&id>` mention.
fn parse_role_id(raw: &str) -> Result<RoleId, VoteError> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix("<@&")
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(trimmed);
    match digits.parse::<u64>() {
        Ok(id) if id > 0 => Ok(RoleId(id)),
        _ => Err(VoteError::new(VoteErrorKind::InvalidInput(raw.to_string()))),
    }
}

/// Run a command on behalf of `invoker` in `guild_id` and return the reply.
#[instrument(skip(service))]
pub async fn execute<S, P>(
    service: &VoteService<S, P>,
    guild_id: GuildId,
    invoker: UserId,
    command: PlebisciteCommand,
) -> PlebisciteResult<String>
where
    S: VoteStore + 'static,
    P: ChatPlatform + 'static,
{
    let reply = match command {
        PlebisciteCommand::RenameVote { target, name } => {
            let started = service
                .request_vote(
                    invoker,
                    VoteRequest {
                        guild_id,
                        target_user_id: target,
                        requester_id: Some(invoker),
                        change: VotePayload::Rename { new_name: name },
                    },
                )
                .await?;
            started_reply(&started.link())
        }
        PlebisciteCommand::RoleVote {
            target,
            role,
            remove,
        } => {
            let started = service
                .request_vote(
                    invoker,
                    VoteRequest {
                        guild_id,
                        target_user_id: target,
                        requester_id: Some(invoker),
                        change: VotePayload::Role {
                            role_id: role,
                            remove,
                        },
                    },
                )
                .await?;
            started_reply(&started.link())
        }
        PlebisciteCommand::SetVoteChannel { channel } => {
            service.set_vote_channel(guild_id, channel).await?;
            "투표 채널 설정 완료.".to_string()
        }
        PlebisciteCommand::ListCosmeticRoles => {
            role_list_reply(&service.cosmetic_role_ids(guild_id).await?)
        }
        PlebisciteCommand::AddCosmeticRole { role } => {
            service.add_cosmetic_role(guild_id, role).await?;
            "역할이 추가되었습니다.".to_string()
        }
        PlebisciteCommand::RemoveCosmeticRole { role } => {
            service.remove_cosmetic_role(guild_id, role).await?;
            "역할이 삭제되었습니다.".to_string()
        }
    };
    debug!("Command handled");
    Ok(reply)
}

fn started_reply(link: &str) -> String {
    format!("투표가 개시되었습니다: {link}")
}

fn role_list_reply(roles: &[RoleId]) -> String {
    let lines: Vec<String> = roles.iter().map(|id| format!("- <@&{id}>")).collect();
    format!("치장 역할 목록:\n{}", lines.join("\n"))
}
