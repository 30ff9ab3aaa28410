use thiserror::Error;

/// Errors raised while serving a signup command or web request.
///
/// The first group is "ask the admin to reconfigure" territory and is shown to
/// the invoking user verbatim. Storage and transport failures are not recovered
/// locally; they bubble up to the handler which logs them.
#[derive(Debug, Error)]
pub enum BotError {
    #[error(
        "No post selected. Select a post via 'More' -> 'Apps' -> 'Signup Analyze: Select Post'."
    )]
    NoSignupPost,

    #[error("Management channel required. Use /set_gvg_management_channel.")]
    NoManagementChannel,

    #[error("This command must be used in a server.")]
    NotInGuild,

    #[error("This must be done in the management channel: {0}.")]
    WrongChannel(String),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),

    #[error(transparent)]
    Discord(#[from] serenity::Error),
}

impl BotError {
    /// True when the message is an actionable instruction rather than a failure.
    pub fn is_not_configured(&self) -> bool {
        matches!(
            self,
            Self::NoSignupPost | Self::NoManagementChannel | Self::NotInGuild | Self::WrongChannel(_)
        )
    }
}

pub type BotResult<T> = Result<T, BotError>;
