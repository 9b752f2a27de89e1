//! [`ChatPlatform`] over the Discord REST API.

use std::{future::Future, num::NonZeroU64, sync::Arc};

use serenity::all::{
  ChannelId, ChannelType, CreateMessage, CreateThread, GuildId, Http, Mentionable as _,
  MessageId, ReactionType, RoleId, UserId,
};
use warden_core::{
  application::{ApplicantId, Snowflake},
  platform::{ChatPlatform, Discussion, Error, Result},
  tally::Tally,
};

use crate::BotConfig;

pub const APPROVE: &str = "👍";
pub const DENY: &str = "👎";

/// Discord-backed chat platform.
///
/// Holds its own REST client so the engine never depends on the gateway
/// connection being up.
pub struct DiscordPlatform {
  http:                 Arc<Http>,
  guild:                GuildId,
  applications_channel: ChannelId,
  status_channel:       ChannelId,
  reviewer_role:        String,
  member_role:          String,
}

impl DiscordPlatform {
  pub fn new(http: Arc<Http>, config: &BotConfig) -> Result<Self> {
    Ok(Self {
      http,
      guild: GuildId::from(non_zero(config.guild_id, "guild")?),
      applications_channel: ChannelId::from(non_zero(
        config.applications_channel_id,
        "applications channel",
      )?),
      status_channel: ChannelId::from(non_zero(config.status_channel_id, "status channel")?),
      reviewer_role: config.reviewer_role.clone(),
      member_role: config.member_role.clone(),
    })
  }

  pub fn applications_channel(&self) -> ChannelId { self.applications_channel }

  fn http(&self) -> &Http { &self.http }

  async fn role_named(&self, name: &str) -> Result<RoleId> {
    let roles = self.guild.roles(self.http()).await.map_err(map_err)?;
    roles
      .into_iter()
      .find_map(|(id, role)| (role.name == name).then_some(id))
      .ok_or_else(|| Error::NotFound(format!("role {name:?}")))
  }

  /// Post the vote message in `thread` and seed both reactions.
  async fn seed_vote(&self, thread: ChannelId, handle: &str) -> Result<MessageId> {
    let mention = match self.role_named(&self.reviewer_role).await {
      Ok(role) => format!("{} ", role.mention()),
      Err(e) => {
        tracing::warn!(role = %self.reviewer_role, error = %e, "reviewer role unavailable");
        String::new()
      }
    };

    let vote = thread
      .send_message(
        self.http(),
        CreateMessage::new().content(format!("{mention}New application for review by {handle}.")),
      )
      .await
      .map_err(map_err)?;

    for emoji in [APPROVE, DENY] {
      vote
        .react(self.http(), ReactionType::Unicode(emoji.to_owned()))
        .await
        .map_err(map_err)?;
    }

    Ok(vote.id)
  }

  /// The applicant's display handle, falling back to the raw ID.
  async fn handle(&self, applicant: ApplicantId) -> String {
    match user_id(applicant) {
      Ok(id) => match id.to_user(self.http()).await {
        Ok(user) => user.name,
        Err(e) => {
          tracing::warn!(applicant_id = %applicant, error = %e, "failed to look up applicant");
          applicant.to_string()
        }
      },
      Err(_) => applicant.to_string(),
    }
  }
}

// ─── Id conversion ───────────────────────────────────────────────────────────

fn non_zero(raw: u64, what: &str) -> Result<NonZeroU64> {
  NonZeroU64::new(raw).ok_or_else(|| Error::NotFound(format!("{what} 0")))
}

fn user_id(applicant: ApplicantId) -> Result<UserId> {
  non_zero(applicant.0, "user").map(UserId::from)
}

fn channel_id(id: Snowflake) -> Result<ChannelId> {
  non_zero(id.0, "channel").map(ChannelId::from)
}

fn message_id(id: Snowflake) -> Result<MessageId> {
  non_zero(id.0, "message").map(MessageId::from)
}

/// 404s become [`Error::NotFound`]; everything else is a generic failure.
fn map_err(e: serenity::Error) -> Error {
  if let serenity::Error::Http(http) = &e
    && http.status_code().map(|s| s.as_u16()) == Some(404)
  {
    return Error::NotFound(http.to_string());
  }
  Error::failed(e)
}

/// Pass `result` through, running `discard` first when it is an error.
/// A failed discard is logged; the caller still sees the original error.
async fn discard_on_err<T>(
  result: Result<T>,
  discard: impl Future<Output = Result<()>>,
) -> Result<T> {
  if let Err(e) = &result
    && let Err(cleanup) = discard.await
  {
    tracing::warn!(error = %cleanup, cause = %e, "failed to remove half-opened discussion");
  }
  result
}

/// Raw approve/deny counts from a message's reactions. Other emoji are
/// ignored.
pub fn tally_from_reactions<'a>(
  reactions: impl IntoIterator<Item = (&'a ReactionType, u64)>,
) -> Tally {
  let clamp = |n: u64| u32::try_from(n).unwrap_or(u32::MAX);
  let mut tally = Tally::default();
  for (kind, count) in reactions {
    if let ReactionType::Unicode(emoji) = kind {
      match emoji.as_str() {
        APPROVE => tally.up = tally.up.saturating_add(clamp(count)),
        DENY => tally.down = tally.down.saturating_add(clamp(count)),
        _ => {}
      }
    }
  }
  tally
}

impl ChatPlatform for DiscordPlatform {
  async fn open_discussion(&self, applicant: ApplicantId) -> Result<Discussion> {
    let handle = self.handle(applicant).await;

    let thread = self
      .applications_channel
      .create_thread(
        self.http(),
        CreateThread::new(format!("{handle} Application Discussion"))
          .kind(ChannelType::PublicThread),
      )
      .await
      .map_err(map_err)?;

    let seeded = self.seed_vote(thread.id, &handle).await;
    let vote = discard_on_err(seeded, async {
      thread.id.delete(self.http()).await.map(drop).map_err(map_err)
    })
    .await?;

    Ok(Discussion {
      thread:       Snowflake(thread.id.get()),
      vote_message: Snowflake(vote.get()),
    })
  }

  async fn fetch_tally(&self, thread: Snowflake, vote_message: Snowflake) -> Result<Tally> {
    let message = channel_id(thread)?
      .message(self.http(), message_id(vote_message)?)
      .await
      .map_err(map_err)?;

    Ok(tally_from_reactions(
      message.reactions.iter().map(|r| (&r.reaction_type, r.count)),
    ))
  }

  async fn direct_message(&self, applicant: ApplicantId, content: String) -> Result<()> {
    let user = user_id(applicant)?.to_user(self.http()).await.map_err(map_err)?;
    user
      .direct_message(self.http(), CreateMessage::new().content(content))
      .await
      .map_err(map_err)?;
    Ok(())
  }

  async fn grant_member_role(&self, applicant: ApplicantId) -> Result<()> {
    let role = self.role_named(&self.member_role).await?;
    let member = self.guild.member(self.http(), user_id(applicant)?).await.map_err(map_err)?;
    member.add_role(self.http(), role).await.map_err(map_err)
  }

  async fn delete_submission(&self, source_message: Snowflake) -> Result<()> {
    self
      .applications_channel
      .delete_message(self.http(), message_id(source_message)?)
      .await
      .map_err(map_err)
  }

  async fn delete_thread(&self, thread: Snowflake) -> Result<()> {
    channel_id(thread)?.delete(self.http()).await.map_err(map_err)?;
    Ok(())
  }

  async fn report_status(&self, line: String) -> Result<()> {
    self.status_channel.say(self.http(), line).await.map_err(map_err)?;
    Ok(())
  }
}
